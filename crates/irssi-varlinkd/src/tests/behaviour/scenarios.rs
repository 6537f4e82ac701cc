//! Scenario bindings for the service feature files.

use std::cell::RefCell;

use rstest::fixture;
use rstest_bdd_macros::scenario;

use super::super::support::{self, ServiceWorld};

/// Fixture providing the shared BDD world.
#[fixture]
fn world() -> RefCell<ServiceWorld> {
    support::world()
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "GetInfo reports the vendor on every call")]
fn getinfo_reports_the_vendor_on_every_call(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "A call split across writes is answered once")]
fn a_call_split_across_writes_is_answered_once(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Calls packed into one write are answered in order")]
fn calls_packed_into_one_write_are_answered_in_order(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "The interface description lists WaitForEvent")]
fn the_interface_description_lists_waitforevent(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Unknown interfaces are reported")]
fn unknown_interfaces_are_reported(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Sending through an unknown server")]
fn sending_through_an_unknown_server(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Sending through a known server")]
fn sending_through_a_known_server(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Malformed input keeps the connection open")]
fn malformed_input_keeps_the_connection_open(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/varlink_calls.feature", name = "Unknown methods are reported")]
fn unknown_methods_are_reported(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "A single wait receives exactly one event")]
fn a_single_wait_receives_exactly_one_event(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "Waiting again re-arms a single wait")]
fn waiting_again_re_arms_a_single_wait(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "A streaming wait receives every event")]
fn a_streaming_wait_receives_every_event(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "Message text passes through unchanged")]
fn message_text_passes_through_unchanged(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "TestEvent reaches every waiting client")]
fn testevent_reaches_every_waiting_client(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/event_delivery.feature", name = "Idle clients receive no events")]
fn idle_clients_receive_no_events(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/event_delivery.feature",
    name = "A client hanging up while an event is queued is a quiet disconnect"
)]
fn a_client_hanging_up_while_an_event_is_queued(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "Shutdown notifies every client and closes the socket")]
fn shutdown_notifies_every_client_and_closes_the_socket(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "Shutdown runs only once")]
fn shutdown_runs_only_once(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "Rapid disconnects are handled quietly")]
fn rapid_disconnects_are_handled_quietly(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "A stale socket is replaced")]
fn a_stale_socket_is_replaced(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "A leftover regular file is replaced")]
fn a_leftover_regular_file_is_replaced(world: RefCell<ServiceWorld>) {
    drop(world);
}

#[scenario(path = "tests/features/service_lifecycle.feature", name = "A live socket is not taken over")]
fn a_live_socket_is_not_taken_over(world: RefCell<ServiceWorld>) {
    drop(world);
}
