use booker_client::config::AUTH_PATH;
use booker_client::{cookie_headers, ApiResponse, Credentials, Method, RequestBody};
use cucumber::{given, then, when};
use tracing::info;

use super::world::{state, BookingWorld};

/// Token carried by a `POST /auth` reply, if any
fn token_from(response: &ApiResponse) -> Option<String> {
    if response.status_code() != 200 {
        return None;
    }
    let body = response.json_value().ok()?;
    body.get("token").and_then(|token| token.as_str()).map(str::to_string)
}

#[given("I have valid admin credentials")]
async fn valid_admin_credentials(world: &mut BookingWorld) {
    let session = world.session();
    world.auth.username = Some(session.config().username.clone());
    world.auth.password = Some(session.config().password.clone());
}

#[given(expr = "I have invalid credentials with username {string} and password {string}")]
async fn invalid_credentials(world: &mut BookingWorld, username: String, password: String) {
    world.auth.username = Some(username);
    world.auth.password = Some(password);
}

#[given("I have empty credentials")]
async fn empty_credentials(world: &mut BookingWorld) {
    world.auth.username = Some(String::new());
    world.auth.password = Some(String::new());
}

#[given("I have a valid authentication token")]
async fn have_valid_token(world: &mut BookingWorld) {
    let token = world
        .session()
        .token()
        .await
        .unwrap_or_else(|e| panic!("{e}"))
        .to_string();
    world.auth.token = Some(token);
}

#[when("I request an authentication token")]
async fn request_token(world: &mut BookingWorld) {
    let session = world.session();
    let credentials = Credentials::new(
        state(&world.auth.username, "username").clone(),
        state(&world.auth.password, "password").clone(),
    );
    let body = RequestBody::json(&credentials).expect("credentials serialize");

    let (response, elapsed) = session
        .client()
        .timed_request(Method::POST, AUTH_PATH, None, Some(&body), None)
        .await
        .unwrap_or_else(|e| panic!("token request failed: {e}"));
    session.record_timing("auth", elapsed);

    world.auth.obtained = Some(token_from(&response));
    world.remember(response);
}

#[when("I use the token to access protected resources")]
async fn use_token(world: &mut BookingWorld) {
    let session = world.session();
    let token = state(&world.auth.token, "token");
    let headers = cookie_headers(token).unwrap_or_else(|e| panic!("{e}"));

    let response = session
        .client()
        .get("/booking/1", Some(&headers), None)
        .await
        .unwrap_or_else(|e| panic!("protected request failed: {e}"));
    world.auth.protected_response = Some(world.remember(response));
}

#[then("I should receive a valid token")]
async fn receive_valid_token(world: &mut BookingWorld) {
    let obtained = state(&world.auth.obtained, "obtained");
    assert!(obtained.is_some(), "expected a token, got none");
    info!("Authentication token obtained");
}

#[then("the token should be a non-empty string")]
async fn token_non_empty(world: &mut BookingWorld) {
    let token = state(&world.auth.obtained, "obtained")
        .as_deref()
        .unwrap_or_default();
    assert!(!token.trim().is_empty(), "expected a non-empty token, got {token:?}");
}

#[then("authentication should fail")]
async fn authentication_fails(world: &mut BookingWorld) {
    let obtained = state(&world.auth.obtained, "obtained");
    assert!(obtained.is_none(), "expected authentication to fail, got token {obtained:?}");
}

#[then("I should not receive a token")]
async fn no_token(world: &mut BookingWorld) {
    assert_eq!(state(&world.auth.obtained, "obtained"), &None);
}

#[then("I should receive an error response")]
async fn error_response(world: &mut BookingWorld) {
    let response = state(&world.last_response, "last_response");
    let rejected = response.status_code() >= 400
        || response
            .json_value()
            .map(|body| body.get("reason").is_some())
            .unwrap_or(false);
    assert!(
        rejected,
        "expected an error response, got {} with body {}",
        response.status_code(),
        response.text()
    );
}

#[then("the token should be accepted")]
async fn token_accepted(world: &mut BookingWorld) {
    let response = state(&world.auth.protected_response, "protected_response");
    assert_ne!(response.status_code(), 401, "token was rejected: {}", response.text());
}

#[then("I should be able to perform authorized operations")]
async fn authorized_operations(world: &mut BookingWorld) {
    let response = state(&world.auth.protected_response, "protected_response");
    assert!(
        [200, 404].contains(&response.status_code()),
        "expected 200 or 404, got {}",
        response.status_code()
    );
}
