//! Autonomous system numbers.

use core::{fmt, str};

/// Prefix of `aut-num` object file names (`AS4242420263`).
pub(crate) const AS_PREFIX: &str = "AS";

/// Autonomous system number, as it appears after the `AS` prefix of an
/// `aut-num` object file name.
///
/// The number is kept as text: the registry is the source of truth and file
/// names are not required to be canonical decimal.
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Asn(String);

impl Asn {
    /// Create an [`Asn`] from the number text (without `AS` prefix).
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Derive the AS number from an `aut-num` object file name by dropping
    /// its two leading characters.
    ///
    /// Returns `None` for names which are too short to carry a number.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let mut chars = file_name.chars();
        chars.next()?;
        chars.next()?;

        match chars.as_str() {
            "" => None,
            number => Some(Self::new(number)),
        }
    }

    /// Parse user input, accepting the number with or without an `AS`
    /// prefix in any letter case.
    pub fn parse_user_input(input: &str) -> Option<Self> {
        let input = input.trim();
        let number = match input.get(..AS_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(AS_PREFIX) => &input[AS_PREFIX.len()..],
            _ => input,
        };

        if !number.is_empty() && number.bytes().all(|b| b.is_ascii_digit()) {
            Some(Self::new(number))
        } else {
            None
        }
    }

    /// Borrow the number text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Asn {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl str::FromStr for Asn {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse_user_input(s).ok_or_else(|| crate::Error::config("asn", "not an AS number"))
    }
}
