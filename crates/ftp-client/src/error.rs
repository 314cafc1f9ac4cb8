//! Typed error types for the FTP client.

use std::io;
use std::net::Ipv4Addr;
use std::time::Duration;

/// FTP client error conditions, categorized by type.
///
/// Protocol failures (an error status from the printer) leave the session
/// usable; transport failures tear the whole session down — the client
/// never reconnects on its own.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum FtpError {
    // -- Connection --
    /// The printer actively refused the control connection.
    #[error("connection refused: {addr}")]
    ConnectionRefused {
        /// The address that was attempted.
        addr: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// TCP connect timed out before the printer responded.
    #[error("connection timed out: {addr} ({timeout:?})")]
    ConnectionTimeout {
        /// The address that was attempted.
        addr: String,
        /// The configured timeout that elapsed.
        timeout: Duration,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// Connection failed for a reason other than refusal or timeout.
    #[error("connection failed: {addr}")]
    ConnectionFailed {
        /// The address that was attempted.
        addr: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// The control connection is gone (closed by the printer, or already
    /// reset by an earlier failure).
    #[error("control connection closed")]
    ConnectionClosed,

    // -- Address --
    /// The provided address string could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// DNS resolution found no addresses for the given hostname.
    #[error("no address found for hostname: {0}")]
    NoAddressFound(String),

    // -- I/O --
    /// Writing to the control or data channel failed.
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// Reading from the control channel failed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] io::Error),

    // -- Greeting / login --
    /// No greeting line arrived within the configured window.
    #[error("no greeting from printer within {timeout:?}")]
    GreetingTimeout {
        /// The configured greeting timeout.
        timeout: Duration,
    },

    /// The greeting itself was an error status; the printer refused us
    /// before any command was sent.
    #[error("printer rejected connection: {status} {message}")]
    Rejected {
        /// The greeting's status code.
        status: u16,
        /// The greeting's message text.
        message: String,
    },

    // -- Protocol --
    /// A command received a 4xx/5xx terminal reply.
    #[error("{command} failed: {status} {message}")]
    Protocol {
        /// The command that was rejected.
        command: String,
        /// The terminal reply's status code.
        status: u16,
        /// The terminal reply's message text.
        message: String,
    },

    /// A control-channel line did not look like `DDD message`.
    #[error("malformed reply line: {line:?}")]
    MalformedReply {
        /// The offending line.
        line: String,
    },

    /// The terminal reply for a command did not arrive in time.
    #[error("{command}: no reply within {timeout:?}")]
    ReplyTimeout {
        /// The command awaiting its reply.
        command: String,
        /// The configured reply timeout.
        timeout: Duration,
    },

    // -- Active-mode data channel --
    /// Active mode encodes an IPv4 address into `PORT`; the control
    /// connection is not IPv4.
    #[error("active mode requires an IPv4 control connection")]
    ActiveModeRequiresIpv4,

    /// No local interface shares a netmasked subnet with the printer, so
    /// there is no address it could connect back to.
    #[error("no local interface on the same subnet as {peer}")]
    NoSharedSubnet {
        /// The printer's control-channel address.
        peer: Ipv4Addr,
    },

    /// The host's network interfaces could not be enumerated.
    #[error("failed to enumerate network interfaces: {0}")]
    InterfaceEnumerationFailed(#[source] io::Error),

    /// The ephemeral data listener could not be created.
    #[error("failed to open data listener: {0}")]
    DataListenFailed(#[source] io::Error),

    /// The printer never connected back to the data listener.
    #[error("printer did not open the data connection within {timeout:?}")]
    DataConnectionTimeout {
        /// The configured accept timeout.
        timeout: Duration,
    },

    /// Accepting the printer's data connection failed.
    #[error("failed to accept data connection: {0}")]
    DataAcceptFailed(#[source] io::Error),

    // -- Local file --
    /// Reading the local payload file failed.
    #[error("failed to read {path}: {source}")]
    FileReadFailed {
        /// The path that could not be read.
        path: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_status_context() {
        let err = FtpError::Protocol {
            command: "STOR LOGO".into(),
            status: 550,
            message: "access denied".into(),
        };
        let text = err.to_string();
        assert!(text.contains("STOR LOGO"));
        assert!(text.contains("550"));
        assert!(text.contains("access denied"));
    }

    #[test]
    fn display_names_the_missing_subnet_peer() {
        let err = FtpError::NoSharedSubnet {
            peer: Ipv4Addr::new(10, 1, 2, 3),
        };
        assert!(err.to_string().contains("10.1.2.3"));
    }
}
