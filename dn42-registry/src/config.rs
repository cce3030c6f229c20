//! Service configuration.
//!
//! Configuration is collected once at startup, validated, and then handed to
//! the component constructors. Nothing reads the environment after that.
//!
//! | field             | environment variable      | default              |
//! |-------------------|---------------------------|----------------------|
//! | `registry_root`   | `DN42_REGISTRY_DIRECTORY` | (required)           |
//! | `listen_port`     | `SSH_PORT`                | `8022`               |
//! | `asn`             | `ASN`                     | `4242420263`         |
//! | `server_identity` | `SERVER`                  | `nl-ams2.flap42.eu`  |
//! | `motd_path`       | `SSH_MOTD_PATH`           | none                 |

use crate::{registry, Asn, Error, Result};
use std::path::PathBuf;
use tracing::debug;

/// Default SSH listen port.
pub const DEFAULT_LISTEN_PORT: u16 = 8022;

/// Default local AS number.
pub const DEFAULT_ASN: &str = "4242420263";

/// Default server identity.
pub const DEFAULT_SERVER_IDENTITY: &str = "nl-ams2.flap42.eu";

/// Environment variable holding the registry checkout path.
pub const ENV_REGISTRY_ROOT: &str = "DN42_REGISTRY_DIRECTORY";

/// Environment variable holding the listen port.
pub const ENV_LISTEN_PORT: &str = "SSH_PORT";

/// Environment variable holding the local AS number.
pub const ENV_ASN: &str = "ASN";

/// Environment variable holding the server identity.
pub const ENV_SERVER_IDENTITY: &str = "SERVER";

/// Environment variable holding the MOTD path.
pub const ENV_MOTD_PATH: &str = "SSH_MOTD_PATH";

/// Peering service configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// Root of the DN42 registry checkout (contains `data/mntner` and
    /// `data/aut-num`).
    pub registry_root: PathBuf,

    /// TCP port the SSH transport listens on.
    pub listen_port: u16,

    /// Local AS number, without `AS` prefix.
    pub asn: Asn,

    /// Name of this peering server (e.g. `nl-ams2.flap42.eu`).
    pub server_identity: String,

    /// Message of the day shown by the transport, if any.
    pub motd_path: Option<PathBuf>,
}

impl Config {
    /// Create a configuration with defaults for everything except the
    /// registry root.
    ///
    /// The result is not validated; call [`Config::validate`].
    pub fn new(registry_root: impl Into<PathBuf>) -> Self {
        Self {
            registry_root: registry_root.into(),
            listen_port: DEFAULT_LISTEN_PORT,
            asn: Asn::new(DEFAULT_ASN),
            server_identity: DEFAULT_SERVER_IDENTITY.to_owned(),
            motd_path: None,
        }
    }

    /// Load and validate the configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load and validate the configuration from an arbitrary variable
    /// lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let registry_root = var(ENV_REGISTRY_ROOT).ok_or_else(|| {
            Error::config("registry_root", format!("{ENV_REGISTRY_ROOT} is not set"))
        })?;

        let mut config = Self::new(registry_root);

        if let Some(port) = var(ENV_LISTEN_PORT) {
            config.listen_port = port
                .trim()
                .parse()
                .map_err(|_| {
                    Error::config("listen_port", format!("{port:?} is not a port number"))
                })?;
        }

        if let Some(asn) = var(ENV_ASN) {
            config.asn = Asn::new(asn.trim());
        }

        if let Some(server_identity) = var(ENV_SERVER_IDENTITY) {
            config.server_identity = server_identity.trim().to_owned();
        }

        config.motd_path = var(ENV_MOTD_PATH).map(PathBuf::from);
        config.validate()?;

        debug!(
            registry_root = %config.registry_root.display(),
            listen_port = config.listen_port,
            asn = %config.asn,
            server = %config.server_identity,
            "configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.registry_root.is_dir() {
            return Err(Error::config(
                "registry_root",
                format!("{} is not a directory", self.registry_root.display()),
            ));
        }

        for subdir in [registry::MNTNER_DIR, registry::AUT_NUM_DIR] {
            let path = self.registry_root.join(subdir);

            if !path.is_dir() {
                return Err(Error::config(
                    "registry_root",
                    format!("missing registry directory {}", path.display()),
                ));
            }
        }

        if self.listen_port == 0 {
            return Err(Error::config("listen_port", "port must be non-zero"));
        }

        let asn = self.asn.as_str();

        if asn.is_empty() || !asn.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::config("asn", format!("{asn:?} is not a decimal AS number")));
        }

        if asn.parse::<u32>().is_err() {
            return Err(Error::config("asn", format!("{asn} does not fit in 32 bits")));
        }

        if self.server_identity.trim().is_empty() {
            return Err(Error::config("server_identity", "must not be empty"));
        }

        Ok(())
    }
}
