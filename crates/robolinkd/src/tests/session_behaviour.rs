//! Behavioural tests for sessions served over live sockets.

use std::cell::RefCell;
use std::thread;
use std::time::Duration;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;

use robolink_config::WireProtocol;

use super::support::{self, TestWorld};

#[fixture]
fn world() -> RefCell<TestWorld> {
    support::world()
}

fn response(world: &RefCell<TestWorld>, index: usize) -> Value {
    let world = world.borrow();
    world
        .responses
        .get(index.saturating_sub(1))
        .cloned()
        .unwrap_or_else(|| panic!("response {index} missing: {:?}", world.responses))
}

#[given("a {protocol} daemon serving the sample inventory")]
fn given_daemon(world: &RefCell<TestWorld>, protocol: WireProtocol) {
    world.borrow_mut().use_tcp_daemon(protocol);
}

#[given("a connected client")]
fn given_client(world: &RefCell<TestWorld>) {
    world.borrow_mut().serve_and_connect();
}

#[when("the client requests the robot list")]
fn when_robot_list(world: &RefCell<TestWorld>) {
    world.borrow_mut().send(r#"{"requestid":"robots"}"#);
}

#[when("the client sends two concatenated requests")]
fn when_concatenated(world: &RefCell<TestWorld>) {
    world.borrow_mut().send(
        r#"{"requestid":"robot","robotid":"r1"}{"requestid":"robot_connections","robotid":"r1"}"#,
    );
}

#[when("the client sends a request split across two writes")]
fn when_split(world: &RefCell<TestWorld>) {
    world.borrow_mut().send(r#"{"requestid":"robot_dev"#);
    thread::sleep(Duration::from_millis(50));
    world.borrow_mut().send(r#"ices","robotid":"r1"}"#);
}

#[when("the client sends malformed JSON followed by a valid request")]
fn when_malformed(world: &RefCell<TestWorld>) {
    world
        .borrow_mut()
        .send(r#"{"requestid":}{"requestid":"robots"}"#);
}

#[when("the client sends an unknown request")]
fn when_unknown(world: &RefCell<TestWorld>) {
    world.borrow_mut().send(r#"{"requestid":"teleport"}"#);
}

#[when("the client asks for robot {robot}")]
fn when_robot(world: &RefCell<TestWorld>, robot: String) {
    let request = serde_json::json!({ "requestid": "robot", "robotid": robot });
    world.borrow_mut().send(&request.to_string());
}

#[when("the client tells the arm to grip")]
fn when_grip(world: &RefCell<TestWorld>) {
    world.borrow_mut().send(
        r#"{"requestid":"robot_device_command","robotid":"r1","deviceid":"arm","commandid":"grip","command_params":[true]}"#,
    );
}

#[when("the client finishes sending")]
fn when_finish(world: &RefCell<TestWorld>) {
    world.borrow_mut().finish();
}

#[then("the client receives {count} responses")]
fn then_receives_plural(world: &RefCell<TestWorld>, count: usize) {
    assert_receives(world, count);
}

#[then("the client receives {count} response")]
fn then_receives_singular(world: &RefCell<TestWorld>, count: usize) {
    assert_receives(world, count);
}

fn assert_receives(world: &RefCell<TestWorld>, count: usize) {
    world.borrow_mut().receive(count);
    let world = world.borrow();
    assert_eq!(
        world.responses.len(),
        count,
        "unexpected responses: {:?}",
        world.responses
    );
}

#[then("response {index} answers {request}")]
fn then_answers(world: &RefCell<TestWorld>, index: usize, request: String) {
    let envelope = response(world, index);
    assert_eq!(envelope["requestid"], Value::String(request), "{envelope}");
    assert!(envelope.get("result").is_some(), "{envelope}");
}

#[then("response {index} is the error {token}")]
fn then_error(world: &RefCell<TestWorld>, index: usize, token: String) {
    let envelope = response(world, index);
    assert_eq!(envelope["error"], Value::String(token), "{envelope}");
    assert!(envelope["message"].is_string(), "{envelope}");
}

#[then("response {index} lists robot {robot}")]
fn then_lists_robot(world: &RefCell<TestWorld>, index: usize, robot: String) {
    let envelope = response(world, index);
    let listed = envelope["result"]
        .as_array()
        .is_some_and(|robots| robots.iter().any(|entry| entry["id"] == robot.as_str()));
    assert!(listed, "robot {robot} missing from {envelope}");
}

#[then("response {index} acknowledges command {command}")]
fn then_acknowledges(world: &RefCell<TestWorld>, index: usize, command: String) {
    let envelope = response(world, index);
    assert_eq!(envelope["result"]["commandid"], Value::String(command), "{envelope}");
}

#[then("the daemon closes the connection")]
fn then_closed(world: &RefCell<TestWorld>) {
    assert!(
        world.borrow().closed_by_daemon,
        "daemon kept the connection open"
    );
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Raw clients list robots"
)]
fn raw_robot_list(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "WebSocket clients list robots"
)]
fn websocket_robot_list(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Concatenated requests are answered in order"
)]
fn concatenated_requests(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Requests may span several reads"
)]
fn split_requests(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Request errors keep the session open"
)]
fn request_errors(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Device commands are acknowledged over WebSocket"
)]
fn websocket_device_command(world: RefCell<TestWorld>) {
    drop(world);
}

#[scenario(
    path = "tests/features/daemon_session.feature",
    name = "Sessions end when the client disconnects"
)]
fn client_disconnect(world: RefCell<TestWorld>) {
    drop(world);
}
