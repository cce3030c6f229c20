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
//! ```no_run
//! use dn42_registry::{Authorizer, Config};
//! # fn presented_key() -> dn42_registry::key::public::KeyData { unimplemented!() }
//!
//! let config = Config::from_env()?;
//! let authorizer = Authorizer::from_config(&config);
//!
//! match authorizer.authenticate("foo", &presented_key()) {
//!     Some(identity) => println!("{} maintains {:?}", identity.username(), identity.asns()),
//!     None => println!("access denied"),
//! }
//! # Ok::<(), dn42_registry::Error>(())
//! ```

mod asn;
mod authorized_key;
mod authorizer;
mod config;
mod error;
mod identity;
mod registry;

pub use crate::{
    asn::Asn,
    authorized_key::{AuthorizedKey, SSH_ED25519, SSH_RSA},
    authorizer::Authorizer,
    config::{
        Config, DEFAULT_ASN, DEFAULT_LISTEN_PORT, DEFAULT_SERVER_IDENTITY, ENV_ASN,
        ENV_LISTEN_PORT, ENV_MOTD_PATH, ENV_REGISTRY_ROOT, ENV_SERVER_IDENTITY,
    },
    error::{Error, Result},
    identity::SessionIdentity,
    registry::{maintainer_name, Registry, AUT_NUM_DIR, MNTNER_DIR, MNT_SUFFIX},
};
pub use key;
