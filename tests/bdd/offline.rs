// Runs every feature file against the in-process fake booking API.

use std::sync::Arc;

use booker_bdd::{bundled_paths, run_suite, Suite};
use booker_client::HarnessConfig;
use booker_test_utils::report::render_text;
use booker_test_utils::{FakeBooker, HarnessSession};

#[tokio::main]
async fn main() {
    booker_monitoring::logging::init_test_tracing();

    let server = FakeBooker::start().await.expect("fake booking API starts");
    let mut config = HarnessConfig::default().with_base_url(server.base_url());
    config.retry_count = 0;
    config.timeout_secs = 10;

    let paths = bundled_paths();
    let session = Arc::new(HarnessSession::new(config, paths.clone()).expect("harness session"));
    let summary = run_suite(Arc::clone(&session), Suite::All, &paths.features_dir).await;

    println!("{}", render_text("offline", &summary, &session.results().records()));
    server.stop().await.expect("fake booking API stops");

    assert!(summary.total_tests > 0, "no scenarios ran");
    assert_eq!(
        summary.failed, 0,
        "failed scenarios: {:#?}",
        summary.failed_tests
    );
    assert!(summary.performance_summary.is_some());
    assert!(summary.security_summary.is_some());
}
