//! Loopback-socket availability guard for mock-server tests.
//!
//! Some sandboxed build environments refuse to bind even 127.0.0.1.
//! Tests that need a wiremock server ask for one through
//! [`start_mock_server_or_skip`]; when no socket can be bound they skip
//! with a note, or panic when `TREEMIRROR_REQUIRE_SOCKET_TESTS` is set.

use std::net::TcpListener;

use wiremock::MockServer;

const REQUIRE_ENV: &str = "TREEMIRROR_REQUIRE_SOCKET_TESTS";

fn fail_fast_requested() -> bool {
    std::env::var(REQUIRE_ENV)
        .ok()
        .is_some_and(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
}

fn loopback_unavailable() -> bool {
    let Err(bind_error) = TcpListener::bind("127.0.0.1:0") else {
        return false;
    };

    let note = format!("cannot bind 127.0.0.1 ({bind_error}); mock-server test cannot run here");
    assert!(
        !fail_fast_requested(),
        "{note}. Unset {REQUIRE_ENV} to skip instead."
    );
    eprintln!("{note}. Skipping. Set {REQUIRE_ENV}=1 to fail instead.");
    true
}

/// Starts a wiremock server, or returns `None` when the environment
/// cannot bind a loopback socket and the test should skip.
pub async fn start_mock_server_or_skip() -> Option<MockServer> {
    if loopback_unavailable() {
        return None;
    }
    Some(MockServer::start().await)
}
