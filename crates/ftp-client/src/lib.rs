//! zpl-courier FTP client — deliver print jobs to a printer's control
//! listener over active-mode FTP.
//!
//! Zebra printers expose an FTP server whose `STOR` path feeds received
//! data straight to the label engine, which makes FTP a transport for both
//! label programs and `~DY` download objects. Only active mode is
//! implemented: the client opens an ephemeral listener, negotiates it with
//! `PORT`, and the printer connects back for the data transfer.
//!
//! The core API is synchronous (`std::net`); the only background thread is
//! the control-channel reader feeding the reply queue.

#![warn(missing_docs)]

mod addr;
mod client;
mod config;
mod error;
mod iface;
mod reply;

pub use addr::{DEFAULT_PORT, resolve_printer_addr};
pub use client::FtpClient;
pub use config::{FtpConfig, FtpTimeouts};
pub use error::FtpError;
pub use iface::{encode_port_args, local_addr_on_peer_subnet, same_subnet, shared_subnet_addr};
pub use reply::Reply;
