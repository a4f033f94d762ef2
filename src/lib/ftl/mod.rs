//! Client side of the Pi-hole FTL telnet API.
//!
//! Every exchange is a bare command token (`>version`, `>stats`) answered by free text
//! that ends with [`client::SENTINEL`].

pub mod client;
pub mod error;

pub use client::{Command, ConnectionHandle};
pub use error::{ConnectionError, ProtocolError};
