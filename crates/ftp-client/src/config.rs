//! Configuration types for the FTP client.

use std::time::Duration;

/// Complete client configuration: timeouts plus keep-alive cadence.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct FtpConfig {
    /// Network timeout settings.
    pub timeouts: FtpTimeouts,
    /// Control channel idle time after which a `NOOP` is issued before the
    /// next command. Keep-alives are never interleaved with a command that
    /// is already in flight.
    pub keepalive_interval: Duration,
}

impl FtpConfig {
    /// Defaults tuned for LAN-connected label printers.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            timeouts: FtpTimeouts::default(),
            keepalive_interval: Duration::from_secs(60),
        }
    }
}

/// Timeout settings for the control and data channels.
///
/// Defaults:
/// - `connect`: 5s TCP connect
/// - `greeting`: 5s for the first line after connecting
/// - `reply`: 10s per command for its terminal reply
/// - `write`: 30s (downloads with embedded images can be large)
/// - `data_accept`: 10s for the printer to open the data connection back
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct FtpTimeouts {
    /// Maximum time for the TCP control connection to establish.
    pub connect: Duration,
    /// Maximum time to wait for the connection greeting.
    pub greeting: Duration,
    /// Maximum time to wait for a command's terminal reply.
    pub reply: Duration,
    /// Maximum time for a write to complete.
    pub write: Duration,
    /// Maximum time for the printer to connect back to the data listener.
    pub data_accept: Duration,
}

impl Default for FtpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            greeting: Duration::from_secs(5),
            reply: Duration::from_secs(10),
            write: Duration::from_secs(30),
            data_accept: Duration::from_secs(10),
        }
    }
}
