//! Public keys listed on maintainer `auth:` lines.
//!
//! These entries have the form:
//!
//! ```text
//! auth:               <algorithm id> <base64 key data> [<comment>]
//! ```
//!
//! where the key data is the binary SSH public key encoding described in
//! [RFC4253 § 6.6](https://datatracker.ietf.org/doc/html/rfc4253#section-6.6).
//!
//! ## Example
//!
//! ```text
//! auth:               ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIJJX1l1z7zPfzb5HR9qmGvrzIgstR32+5/Bly6e9UrEz foo@example
//! ```

use crate::{Error, Result};
use base64ct::{Base64, Encoding};
use core::fmt;
use key::{public::KeyData, Algorithm, Fingerprint, HashAlg, PublicKey};
use subtle::{Choice, ConstantTimeEq};

/// Ed25519 algorithm tag.
pub const SSH_ED25519: &str = "ssh-ed25519";

/// RSA algorithm tag.
pub const SSH_RSA: &str = "ssh-rsa";

/// Largest RSA modulus accepted, in bits. There is no lower bound: legacy
/// maintainer objects still list 1024-bit keys.
pub const RSA_MAX_SIZE: usize = 16384;

/// Public key accepted for a maintainer.
///
/// Only Ed25519 and RSA keys can be constructed.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AuthorizedKey {
    key_data: KeyData,
}

impl AuthorizedKey {
    /// Decode an authorized key from an `auth:` algorithm tag and its Base64
    /// payload.
    ///
    /// The algorithm encoded inside the payload must agree with `tag`, and
    /// the key material must form a valid public key for that algorithm.
    pub fn decode(tag: &str, payload: &str) -> Result<Self> {
        let expected = algorithm_for_tag(tag)?;
        let blob = Base64::decode_vec(payload)?;
        let public_key = PublicKey::from_bytes(&blob)?;

        if public_key.algorithm() != expected {
            return Err(Error::AlgorithmMismatch {
                tag: tag.to_owned(),
                found: public_key.algorithm(),
            });
        }

        Self::try_from(public_key.key_data().clone())
    }

    /// Get the [`Algorithm`] of this key.
    pub fn algorithm(&self) -> Algorithm {
        self.key_data.algorithm()
    }

    /// Get the underlying SSH public key data.
    pub fn key_data(&self) -> &KeyData {
        &self.key_data
    }

    /// Compute the SHA-256 fingerprint of this key.
    pub fn fingerprint(&self) -> Fingerprint {
        self.key_data.fingerprint(HashAlg::Sha256)
    }

    /// Does the presented key have the same algorithm and key material?
    ///
    /// Comparison runs over the encoded key in constant time.
    pub fn matches(&self, presented: &KeyData) -> bool {
        self.ct_matches(presented).into()
    }

    /// Constant-time comparison against the presented key.
    pub(crate) fn ct_matches(&self, presented: &KeyData) -> Choice {
        match (encode(&self.key_data), encode(presented)) {
            (Some(ours), Some(theirs)) => ours.ct_eq(&theirs),
            _ => Choice::from(0),
        }
    }
}

impl TryFrom<KeyData> for AuthorizedKey {
    type Error = Error;

    fn try_from(key_data: KeyData) -> Result<Self> {
        match &key_data {
            KeyData::Ed25519(key) => {
                ed25519_dalek::VerifyingKey::try_from(key).map_err(|_| Error::Crypto)?;
            }
            KeyData::Rsa(key) => {
                let n = rsa::BigUint::try_from(&key.n).map_err(|_| Error::Crypto)?;
                let e = rsa::BigUint::try_from(&key.e).map_err(|_| Error::Crypto)?;
                rsa::RsaPublicKey::new_with_max_size(n, e, RSA_MAX_SIZE)
                    .map_err(|_| Error::Crypto)?;
            }
            other => {
                return Err(Error::AlgorithmUnsupported {
                    tag: other.algorithm().to_string(),
                })
            }
        }

        Ok(Self { key_data })
    }
}

impl From<AuthorizedKey> for KeyData {
    fn from(key: AuthorizedKey) -> KeyData {
        key.key_data
    }
}

impl fmt::Display for AuthorizedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.algorithm(), self.fingerprint())
    }
}

/// Map an `auth:` algorithm tag to the key algorithm it introduces.
fn algorithm_for_tag(tag: &str) -> Result<Algorithm> {
    match tag {
        SSH_ED25519 => Ok(Algorithm::Ed25519),
        SSH_RSA => Ok(Algorithm::Rsa { hash: None }),
        _ => Err(Error::AlgorithmUnsupported {
            tag: tag.to_owned(),
        }),
    }
}

/// Binary SSH encoding of the key, including its algorithm identifier.
fn encode(key_data: &KeyData) -> Option<Vec<u8>> {
    PublicKey::from(key_data.clone()).to_bytes().ok()
}
