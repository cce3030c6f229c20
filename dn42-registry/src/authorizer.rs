//! Public key authorization against maintainer objects.

use crate::{Asn, Config, Registry, SessionIdentity};
use key::public::KeyData;
use subtle::Choice;
use tracing::info;

/// Decides whether a presented SSH public key may log in as a user.
///
/// A key is accepted when it equals one of the keys listed on the `auth:`
/// lines of the user's maintainer object. An unknown user and a wrong key
/// are indistinguishable to the caller.
#[derive(Clone, Debug)]
pub struct Authorizer {
    registry: Registry,
}

impl Authorizer {
    /// Create an authorizer over the given registry.
    pub fn new(registry: Registry) -> Self {
        Self { registry }
    }

    /// Create an authorizer over the registry named by a validated
    /// [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(Registry::from_config(config))
    }

    /// Get the registry this authorizer reads.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Is `presented` one of the keys authorized for `username`?
    ///
    /// Every authorized key is compared, whether or not an earlier one
    /// matched.
    pub fn authorize(&self, username: &str, presented: &KeyData) -> bool {
        let matched = self
            .registry
            .load_authorized_keys(username)
            .iter()
            .fold(Choice::from(0), |matched, key| {
                matched | key.ct_matches(presented)
            });

        let accepted = bool::from(matched);

        if accepted {
            info!(
                user = username,
                fingerprint = %presented.fingerprint(Default::default()),
                "public key accepted"
            );
        } else {
            info!(user = username, "public key rejected");
        }

        accepted
    }

    /// AS numbers maintained by `username`.
    pub fn resources_for(&self, username: &str) -> Vec<Asn> {
        self.registry.as_maintained_by(username)
    }

    /// Authorize `presented` for `username` and, on success, resolve the
    /// session identity.
    pub fn authenticate(&self, username: &str, presented: &KeyData) -> Option<SessionIdentity> {
        if !self.authorize(username, presented) {
            return None;
        }

        let asns = self.resources_for(username);
        info!(user = username, asns = asns.len(), "session identity resolved");
        Some(SessionIdentity::new(username, asns))
    }
}
