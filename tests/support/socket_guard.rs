//! Skips socket-bound tests where localhost cannot be bound, unless
//! `WALLGET_REQUIRE_SOCKET_TESTS` asks for a hard failure.

use std::net::TcpListener;
use std::panic::Location;

use wiremock::MockServer;

#[track_caller]
#[must_use]
pub fn should_skip_socket_bound_test() -> bool {
    if TcpListener::bind("127.0.0.1:0").is_ok() {
        return false;
    }

    let location = Location::caller();
    let required = std::env::var("WALLGET_REQUIRE_SOCKET_TESTS").is_ok_and(|v| v == "1");
    assert!(
        !required,
        "cannot bind localhost socket at {}:{}",
        location.file(),
        location.line()
    );
    eprintln!(
        "skipping {}:{}: cannot bind localhost socket",
        location.file(),
        location.line()
    );
    true
}

pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if should_skip_socket_bound_test() {
        None
    } else {
        Some(MockServer::start().await)
    }
}
