//! Timeout constants for the transfer client.

/// HTTP connect timeout applied to every request (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP read timeout; generous because archives can run to gigabytes
/// (5 minutes).
pub const READ_TIMEOUT_SECS: u64 = 300;
