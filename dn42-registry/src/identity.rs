//! Authenticated session identity.

use crate::Asn;

/// Identity bound to an authenticated connection: the login name and the
/// AS numbers its maintainer object maintains.
///
/// Created once per successful authorization and owned by that session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionIdentity {
    username: String,
    asns: Vec<Asn>,
}

impl SessionIdentity {
    /// Create a new identity.
    pub fn new(username: impl Into<String>, asns: Vec<Asn>) -> Self {
        Self {
            username: username.into(),
            asns,
        }
    }

    /// Login name the session authenticated as.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// AS numbers resolved for this identity at authorization time.
    pub fn asns(&self) -> &[Asn] {
        &self.asns
    }

    /// Is `asn` maintained by this identity?
    pub fn owns(&self, asn: &Asn) -> bool {
        self.asns.contains(asn)
    }
}
