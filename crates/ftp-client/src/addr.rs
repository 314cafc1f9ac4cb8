//! Printer address resolution.
//!
//! Handles the formats users pass as printer addresses: `IP`, `IP:PORT`,
//! `hostname`, `hostname:PORT`. Defaults to the FTP control port.

use std::net::{IpAddr, SocketAddr, ToSocketAddrs};

use crate::FtpError;

/// Default FTP control port.
pub const DEFAULT_PORT: u16 = 21;

/// Resolve a user-provided printer address string to a `SocketAddr`.
///
/// Accepts `192.168.1.55:21`, `192.168.1.55`, `printer01.local:21`, and
/// `printer01.local`. The port defaults to 21 when omitted. For hostnames
/// that resolve to multiple addresses, the first result is used.
pub fn resolve_printer_addr(input: &str) -> Result<SocketAddr, FtpError> {
    // 1. Full socket address (e.g. "192.168.1.55:21")
    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }

    // 2. Bare IP without port
    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    // 3. host:port via DNS
    if let Ok(mut addrs) = input.to_socket_addrs()
        && let Some(addr) = addrs.next()
    {
        return Ok(addr);
    }

    // 4. bare hostname via DNS with the default port
    if let Ok(mut addrs) = (input, DEFAULT_PORT).to_socket_addrs()
        && let Some(addr) = addrs.next()
    {
        return Ok(addr);
    }

    Err(FtpError::NoAddressFound(input.to_string()))
}
