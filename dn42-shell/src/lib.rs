#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    clippy::arithmetic_side_effects,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

//! ## Usage
//!
//! ```
//! use dn42_shell::{registry::{Asn, SessionIdentity}, Exit, Shell, ShellConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> dn42_shell::Result<()> {
//! let shell = Shell::builtin(ShellConfig::new(&Asn::new("4242420263")));
//! let identity = SessionIdentity::new("foo", vec![Asn::new("4242420263")]);
//!
//! let mut output = Vec::new();
//! let exit = shell.run(&identity, &b"greet\rbye\r"[..], &mut output).await?;
//!
//! assert_eq!(exit, Exit::Command);
//! assert!(String::from_utf8_lossy(&output).contains("Hello there!\r\n"));
//! # Ok(())
//! # }
//! ```

mod command;
mod commands;
mod error;
mod line;
mod peering;
mod sanitize;
mod shell;
mod table;

pub use crate::{
    command::{Command, CommandTable, Context, Flow, Handler, Output},
    error::{Error, Result},
    line::{Line, LineEditor, ERASE},
    peering::{
        endpoint_ipv6, is_wireguard_key, PeerState, PeerStatus, Peering, StubPeering, WG_KEY_SIZE,
    },
    sanitize::{sanitize, CRLF},
    shell::{Exit, Shell, ShellConfig},
    table::{Justify, Table},
};
pub use registry;
