//! Steps shared across features.

use booker_test_utils::assertions::{assert_response_time, assert_status, AssertionError};
use cucumber::{given, then};

use super::world::{state, BookingWorld};

/// Fail the step with the assertion's expected-vs-actual message
#[track_caller]
pub fn verify(result: Result<(), AssertionError>) {
    if let Err(e) = result {
        panic!("{e}");
    }
}

#[given("the API is available")]
async fn api_is_available(world: &mut BookingWorld) {
    let session = world.session();
    assert!(
        session.check_api_health().await,
        "booking API at {} is not healthy",
        session.config().base_url
    );
}

#[given("I have valid authentication token")]
async fn have_session_token(world: &mut BookingWorld) {
    world.token_headers().await;
}

#[then(expr = "the response status should be {int}")]
async fn response_status_is(world: &mut BookingWorld, expected: u16) {
    let response = state(&world.last_response, "last_response");
    verify(assert_status(response, expected));
}

#[then(expr = "the response should arrive within the {string} threshold")]
async fn response_within_threshold(world: &mut BookingWorld, operation: String) {
    let response = state(&world.last_response, "last_response");
    let limit = world.session().performance_threshold(&operation);
    verify(assert_response_time(&operation, response.elapsed_ms(), limit));
}
