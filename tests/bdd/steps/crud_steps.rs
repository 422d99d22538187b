use booker_client::{validate_schema, ApiResponse, Booking, BookingRecord};
use booker_monitoring::timed;
use booker_test_utils::assertions::{assert_core_fields_match, assert_partial_update, assert_status};
use cucumber::{given, then, when};
use serde_json::{json, Value};

use super::common::verify;
use super::world::{state, BookingWorld};

/// Create `booking`, time it and queue the new id for cleanup
pub(crate) async fn create_tracked(world: &mut BookingWorld, booking: &Booking) -> (ApiResponse, Option<u64>) {
    let session = world.session();
    let (result, elapsed) = timed(session.bookings().create(booking)).await;
    session.record_timing("create_booking", elapsed);
    let (response, id) = result.unwrap_or_else(|e| panic!("create request failed: {e}"));

    if let Some(id) = id {
        world.track(id);
    }
    (world.remember(response), id)
}

/// Read a booking, recording the timing under `get_booking`
pub(crate) async fn read_timed(world: &mut BookingWorld, id: u64) -> (ApiResponse, Option<BookingRecord>) {
    let session = world.session();
    let (result, elapsed) = timed(session.bookings().read(id)).await;
    session.record_timing("get_booking", elapsed);
    let (response, booking) = result.unwrap_or_else(|e| panic!("read request failed: {e}"));
    (world.remember(response), booking)
}

pub(crate) fn schema(world: &BookingWorld, name: &str) -> Value {
    world
        .session()
        .fixtures()
        .schema(name)
        .cloned()
        .unwrap_or_else(|| panic!("missing schema fixture: {name}"))
}

async fn replace_timed(world: &mut BookingWorld, data: &Booking) -> (ApiResponse, Option<BookingRecord>) {
    let session = world.session();
    let id = *state(&world.crud.booking_id, "booking_id");
    let headers = world.token_headers().await;

    let (result, elapsed) = timed(session.bookings().update(id, data, &headers, false)).await;
    session.record_timing("update_booking", elapsed);
    let (response, updated) = result.unwrap_or_else(|e| panic!("update request failed: {e}"));
    (world.remember(response), updated)
}

#[given("I have valid booking data")]
async fn valid_booking_data(world: &mut BookingWorld) {
    world.crud.booking = Some(world.factory.valid());
}

#[given(expr = "I have booking data from the {string} template")]
async fn template_booking_data(world: &mut BookingWorld, template: String) {
    let session = world.session();
    let value = session
        .fixtures()
        .booking_template(&template)
        .cloned()
        .unwrap_or_else(|| panic!("missing booking template: {template}"));
    let booking: Booking =
        serde_json::from_value(value).unwrap_or_else(|e| panic!("template {template} is not a booking: {e}"));
    world.crud.booking = Some(booking);
}

#[given("I have created a booking")]
async fn created_booking(world: &mut BookingWorld) {
    let booking = world.factory.valid();
    let (response, id) = create_tracked(world, &booking).await;
    verify(assert_status(&response, 200));

    world.crud.booking_id = Some(id.expect("created booking has an id"));
    world.crud.booking = Some(booking);
    world.crud.create_response = Some(response);
}

#[given("I have updated booking data")]
async fn updated_booking_data(world: &mut BookingWorld) {
    let mut booking = world.factory.valid();
    booking.firstname = "Updated".to_string();
    booking.lastname = Some("Booking".to_string());
    world.crud.update_data = Some(booking);
}

#[given("I have partial update data")]
async fn partial_update_data(world: &mut BookingWorld) {
    world.crud.patch_data = Some(json!({
        "firstname": "PartiallyUpdated",
        "totalprice": 300
    }));
}

#[when("I create a new booking")]
async fn create_new_booking(world: &mut BookingWorld) {
    let booking = state(&world.crud.booking, "booking").clone();
    let (response, id) = create_tracked(world, &booking).await;

    world.crud.operations.push(("create", response.status_code() == 200 && id.is_some()));
    world.crud.booking_id = id;
    world.crud.create_response = Some(response);
}

#[when("I retrieve the booking by its ID")]
async fn retrieve_booking(world: &mut BookingWorld) {
    let id = *state(&world.crud.booking_id, "booking_id");
    let (response, booking) = read_timed(world, id).await;

    world.crud.operations.push(("retrieve", response.status_code() == 200));
    world.crud.retrieved = booking;
    world.crud.retrieve_response = Some(response);
}

#[when("I update the entire booking using PUT")]
async fn update_with_put(world: &mut BookingWorld) {
    let data = state(&world.crud.update_data, "update_data").clone();
    let (response, updated) = replace_timed(world, &data).await;
    world.crud.updated = updated;
    world.crud.update_response = Some(response);
}

#[when("I update the booking")]
async fn update_booking(world: &mut BookingWorld) {
    let mut data = state(&world.crud.booking, "booking").clone();
    data.firstname = "Lifecycle".to_string();
    let price = data.totalprice.as_i64().unwrap_or_default();
    data.totalprice = (price + 50).into();

    let (response, updated) = replace_timed(world, &data).await;
    world.crud.operations.push(("update", response.status_code() == 200));
    world.crud.update_data = Some(data);
    world.crud.updated = updated;
    world.crud.update_response = Some(response);
}

#[when("I partially update the booking using PATCH")]
async fn update_with_patch(world: &mut BookingWorld) {
    let session = world.session();
    let id = *state(&world.crud.booking_id, "booking_id");
    let patch = state(&world.crud.patch_data, "patch_data").clone();
    let headers = world.token_headers().await;

    let (result, elapsed) = timed(session.bookings().update(id, &patch, &headers, true)).await;
    session.record_timing("update_booking", elapsed);
    let (response, updated) = result.unwrap_or_else(|e| panic!("patch request failed: {e}"));

    world.crud.updated = updated;
    world.crud.update_response = Some(world.remember(response));
}

#[when("I delete the booking")]
async fn delete_booking(world: &mut BookingWorld) {
    let session = world.session();
    let id = *state(&world.crud.booking_id, "booking_id");
    let headers = world.token_headers().await;

    let (result, elapsed) = timed(session.bookings().delete_with_response(id, &headers)).await;
    session.record_timing("delete_booking", elapsed);
    let response = result.unwrap_or_else(|e| panic!("delete request failed: {e}"));

    let deleted = matches!(response.status_code(), 200 | 201);
    if deleted {
        world.forget(id);
    }
    world.crud.operations.push(("delete", deleted));
    world.crud.deleted = Some(deleted);
    world.remember(response);
}

#[then("the booking should be created successfully")]
async fn created_successfully(world: &mut BookingWorld) {
    verify(assert_status(state(&world.crud.create_response, "create_response"), 200));
}

#[then("I should receive a booking ID")]
async fn receive_booking_id(world: &mut BookingWorld) {
    let id = *state(&world.crud.booking_id, "booking_id");
    assert!(id > 0, "expected a positive booking id, got {id}");
}

#[then("the response should match the booking creation schema")]
async fn matches_creation_schema(world: &mut BookingWorld) {
    let schema = schema(world, "booking_response_schema");
    let response = state(&world.crud.create_response, "create_response");
    assert!(
        validate_schema(response, &schema),
        "create response does not match the booking response schema: {}",
        response.text()
    );
}

#[then("I should get the booking details")]
async fn booking_details(world: &mut BookingWorld) {
    verify(assert_status(state(&world.crud.retrieve_response, "retrieve_response"), 200));
    assert!(world.crud.retrieved.is_some(), "retrieved booking could not be decoded");
}

#[then("the booking data should match what was created")]
async fn data_matches_created(world: &mut BookingWorld) {
    verify(assert_core_fields_match(
        state(&world.crud.booking, "booking"),
        state(&world.crud.retrieved, "retrieved"),
    ));
}

#[then("the response should match the booking detail schema")]
async fn matches_detail_schema(world: &mut BookingWorld) {
    let schema = schema(world, "booking_detail_schema");
    let response = state(&world.crud.retrieve_response, "retrieve_response");
    assert!(
        validate_schema(response, &schema),
        "booking does not match the detail schema: {}",
        response.text()
    );
}

#[then("the booking should be updated successfully")]
async fn updated_successfully(world: &mut BookingWorld) {
    verify(assert_status(state(&world.crud.update_response, "update_response"), 200));
    assert!(world.crud.updated.is_some(), "updated booking could not be decoded");
}

#[then("all fields should reflect the new values")]
async fn fields_reflect_new_values(world: &mut BookingWorld) {
    let expected = state(&world.crud.update_data, "update_data").clone();
    verify(assert_core_fields_match(&expected, state(&world.crud.updated, "updated")));

    let id = *state(&world.crud.booking_id, "booking_id");
    let (_, stored) = read_timed(world, id).await;
    verify(assert_core_fields_match(&expected, state(&stored, "stored booking")));
}

#[then("only the specified fields should be updated")]
async fn only_specified_fields_updated(world: &mut BookingWorld) {
    verify(assert_partial_update(
        state(&world.crud.booking, "booking"),
        state(&world.crud.patch_data, "patch_data"),
        state(&world.crud.updated, "updated"),
    ));
}

#[then("other fields should remain unchanged")]
async fn other_fields_unchanged(world: &mut BookingWorld) {
    let id = *state(&world.crud.booking_id, "booking_id");
    let (_, stored) = read_timed(world, id).await;
    verify(assert_partial_update(
        state(&world.crud.booking, "booking"),
        state(&world.crud.patch_data, "patch_data"),
        state(&stored, "stored booking"),
    ));
}

#[then("the booking should be deleted successfully")]
async fn deleted_successfully(world: &mut BookingWorld) {
    assert_eq!(state(&world.crud.deleted, "deleted"), &true, "booking was not deleted");
}

#[then("the booking should no longer be retrievable")]
async fn no_longer_retrievable(world: &mut BookingWorld) {
    let id = *state(&world.crud.booking_id, "booking_id");
    let (response, booking) = read_timed(world, id).await;
    verify(assert_status(&response, 404));
    assert!(booking.is_none());
}

#[then("all operations should complete successfully")]
async fn all_operations_succeed(world: &mut BookingWorld) {
    let operations = &world.crud.operations;
    assert!(!operations.is_empty(), "no operations were performed");
    let failed: Vec<&str> = operations
        .iter()
        .filter(|(_, ok)| !ok)
        .map(|(name, _)| *name)
        .collect();
    assert!(failed.is_empty(), "operations failed: {failed:?}");
}
