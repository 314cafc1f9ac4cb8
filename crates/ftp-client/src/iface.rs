//! Local interface selection for active-mode `PORT`.
//!
//! The `PORT` command hands the printer an address to connect back to, so
//! it must be an address the printer can actually reach: the local IPv4
//! interface whose netmasked subnet contains the printer's control-channel
//! address.

use std::net::Ipv4Addr;

use crate::FtpError;

/// Whether `addr` (with `mask`) and `peer` land in the same subnet.
pub fn same_subnet(addr: Ipv4Addr, mask: Ipv4Addr, peer: Ipv4Addr) -> bool {
    let mask = u32::from(mask);
    (u32::from(addr) & mask) == (u32::from(peer) & mask)
}

/// Pick the first candidate `(address, netmask)` sharing a subnet with `peer`.
pub fn shared_subnet_addr(
    candidates: &[(Ipv4Addr, Ipv4Addr)],
    peer: Ipv4Addr,
) -> Option<Ipv4Addr> {
    candidates
        .iter()
        .find(|(addr, mask)| same_subnet(*addr, *mask, peer))
        .map(|(addr, _)| *addr)
}

/// The local IPv4 address the printer at `peer` can connect back to.
///
/// Enumerates the host's interfaces and netmask-matches each against the
/// peer. Fails with [`FtpError::NoSharedSubnet`] when no interface shares a
/// subnet — active mode cannot work across routed segments this client has
/// no address on.
pub fn local_addr_on_peer_subnet(peer: Ipv4Addr) -> Result<Ipv4Addr, FtpError> {
    // A loopback peer is reached via loopback; interface enumeration would
    // find 127.0.0.1/8 anyway.
    if peer.is_loopback() {
        return Ok(Ipv4Addr::LOCALHOST);
    }

    let interfaces =
        if_addrs::get_if_addrs().map_err(FtpError::InterfaceEnumerationFailed)?;

    let candidates: Vec<(Ipv4Addr, Ipv4Addr)> = interfaces
        .into_iter()
        .filter_map(|iface| match iface.addr {
            if_addrs::IfAddr::V4(v4) => Some((v4.ip, v4.netmask)),
            if_addrs::IfAddr::V6(_) => None,
        })
        .collect();

    shared_subnet_addr(&candidates, peer).ok_or(FtpError::NoSharedSubnet { peer })
}

/// Encode an address and port as `PORT` arguments: four address octets and
/// two port bytes, comma-separated.
pub fn encode_port_args(addr: Ipv4Addr, port: u16) -> String {
    let [a, b, c, d] = addr.octets();
    let [hi, lo] = port.to_be_bytes();
    format!("{a},{b},{c},{d},{hi},{lo}")
}
