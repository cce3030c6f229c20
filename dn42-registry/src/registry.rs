//! DN42 registry checkout support.
//!
//! Only two object types are read:
//!
//! - `data/mntner/<NAME>-MNT`: maintainer objects, whose `auth:` lines carry
//!   the SSH public keys of the maintainer.
//! - `data/aut-num/AS<number>`: autonomous system objects, whose `mnt-by:`
//!   lines name the maintainers of the AS.
//!
//! Objects are re-read on every query. Failures are recovered per line, per
//! key entry and per file, so a single broken record never hides the rest of
//! the registry.

use crate::{authorized_key::AuthorizedKey, Asn, Config};
use std::{
    fs,
    path::{Path, PathBuf},
    str,
};
use tracing::{debug, warn};

/// Maintainer objects, relative to the registry root.
pub const MNTNER_DIR: &str = "data/mntner";

/// Autonomous system objects, relative to the registry root.
pub const AUT_NUM_DIR: &str = "data/aut-num";

/// Suffix of maintainer object names.
pub const MNT_SUFFIX: &str = "-MNT";

/// Attribute carrying maintainer credentials.
const AUTH_ATTR: &str = "auth:";

/// Attribute naming the maintainer of an object.
const MNT_BY_ATTR: &str = "mnt-by:";

/// Canonical maintainer object name for a login name: `<USER>-MNT`.
pub fn maintainer_name(user: &str) -> String {
    format!("{}{MNT_SUFFIX}", user.to_uppercase())
}

/// Read-only view of a DN42 registry checkout.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    /// Open a registry checkout rooted at `path`.
    ///
    /// Does not verify that the directory exists; use [`Config::validate`]
    /// for that. Attempts to canonicalize the path once opened.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            path: path.canonicalize().unwrap_or(path),
        }
    }

    /// Open the registry named by a validated [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::open(&config.registry_root)
    }

    /// Get the path to the registry root.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the path to the maintainer object directory.
    pub fn mntner_path(&self) -> PathBuf {
        self.path.join(MNTNER_DIR)
    }

    /// Get the path to the autonomous system object directory.
    pub fn aut_num_path(&self) -> PathBuf {
        self.path.join(AUT_NUM_DIR)
    }

    /// Get the path of the maintainer object for `user`.
    ///
    /// Returns `None` if the name could escape the maintainer directory.
    pub fn maintainer_path(&self, user: &str) -> Option<PathBuf> {
        if !is_plain_name(user) {
            return None;
        }

        Some(self.mntner_path().join(maintainer_name(user)))
    }

    /// Load every usable public key from the `auth:` lines of the maintainer
    /// object of `user`, in file order.
    ///
    /// A missing or unreadable maintainer object yields no keys. Lines which
    /// are not `auth:` entries, and entries whose key cannot be decoded, are
    /// skipped.
    pub fn load_authorized_keys(&self, user: &str) -> Vec<AuthorizedKey> {
        let Some(path) = self.maintainer_path(user) else {
            debug!(user, "refusing maintainer name");
            return Vec::new();
        };

        let contents = match fs::read(&path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(user, file = %path.display(), %err, "no maintainer object");
                return Vec::new();
            }
        };

        let maintainer = maintainer_name(user);

        lines(&contents)
            .filter_map(|(lineno, line)| {
                let (tag, payload) = parse_auth(line)?;

                match AuthorizedKey::decode(tag, payload) {
                    Ok(key) => Some(key),
                    Err(err) => {
                        debug!(%maintainer, line = lineno, %err, "skipping auth entry");
                        None
                    }
                }
            })
            .collect()
    }

    /// Find the AS numbers whose `aut-num` object is maintained by `user`.
    ///
    /// Every object is scanned; an object contributes its number for each
    /// line reading exactly `mnt-by: <USER>-MNT`. Objects which cannot be
    /// read are skipped. Results follow directory listing order.
    pub fn as_maintained_by(&self, user: &str) -> Vec<Asn> {
        let directory = self.aut_num_path();
        let maintainer = maintainer_name(user);

        let entries = match fs::read_dir(&directory) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(directory = %directory.display(), %err, "cannot list aut-num objects");
                return Vec::new();
            }
        };

        let mut asns = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(directory = %directory.display(), %err, "skipping directory entry");
                    continue;
                }
            };

            let Some(asn) = entry.file_name().to_str().and_then(Asn::from_file_name) else {
                debug!(file = ?entry.file_name(), "skipping aut-num object with unusable name");
                continue;
            };

            let contents = match fs::read(entry.path()) {
                Ok(contents) => contents,
                Err(err) => {
                    warn!(
                        file = %entry.path().display(),
                        %err,
                        "skipping unreadable aut-num object"
                    );
                    continue;
                }
            };

            let matches = lines(&contents)
                .filter(|(_, line)| is_mnt_by(line, &maintainer))
                .count();

            asns.extend(std::iter::repeat(asn).take(matches));
        }

        asns
    }
}

/// Iterate over the UTF-8 lines of a registry object with 1-based line
/// numbers, skipping lines which are not valid UTF-8.
///
/// Lines end at `\r\n`, `\r` or `\n`.
fn lines(contents: &[u8]) -> impl Iterator<Item = (usize, &str)> {
    let mut rest = contents;

    core::iter::from_fn(move || {
        let current = rest;

        if current.is_empty() {
            return None;
        }

        match current.iter().position(|&b| b == b'\r' || b == b'\n') {
            Some(end) => {
                let terminator = if current[end..].starts_with(b"\r\n") { 2 } else { 1 };
                rest = &current[end.saturating_add(terminator)..];
                Some(&current[..end])
            }
            None => {
                rest = &[];
                Some(current)
            }
        }
    })
    .enumerate()
    .filter_map(|(index, line)| match str::from_utf8(line) {
        Ok(line) => Some((index.saturating_add(1), line)),
        Err(_) => {
            debug!(line = index.saturating_add(1), "skipping non UTF-8 line");
            None
        }
    })
}

/// Parse an `auth: <algorithm> <payload> [...]` line.
fn parse_auth(line: &str) -> Option<(&str, &str)> {
    let mut fields = line.split_whitespace();

    match (fields.next(), fields.next(), fields.next()) {
        (Some(AUTH_ATTR), Some(tag), Some(payload)) => Some((tag, payload)),
        _ => None,
    }
}

/// Is this line exactly `mnt-by: <maintainer>`?
fn is_mnt_by(line: &str, maintainer: &str) -> bool {
    let mut fields = line.split_whitespace();

    matches!(
        (fields.next(), fields.next(), fields.next()),
        (Some(MNT_BY_ATTR), Some(name), None) if name == maintainer
    )
}

/// Is `user` usable as a single path component?
fn is_plain_name(user: &str) -> bool {
    !user.is_empty()
        && user != "."
        && !user.contains("..")
        && !user.contains(&['/', '\\', '\0'][..])
}

#[cfg(test)]
mod tests {
    use super::{is_mnt_by, is_plain_name, lines, maintainer_name, parse_auth};

    #[test]
    fn maintainer_name_is_uppercased() {
        assert_eq!(maintainer_name("foo"), "FOO-MNT");
        assert_eq!(maintainer_name("Foo-Bar"), "FOO-BAR-MNT");
    }

    #[test]
    fn line_endings() {
        let split: Vec<_> = lines(b"a\r\nb\rc\n\nd\xff\ne").collect();
        assert_eq!(split, [(1, "a"), (2, "b"), (3, "c"), (4, ""), (6, "e")]);
    }

    #[test]
    fn auth_lines() {
        assert_eq!(
            parse_auth("auth:    ssh-ed25519 AAAA foo@example"),
            Some(("ssh-ed25519", "AAAA"))
        );
        assert_eq!(parse_auth("auth: ssh-rsa AAAA"), Some(("ssh-rsa", "AAAA")));
        assert_eq!(parse_auth("  auth:\tssh-rsa\tAAAA\r"), Some(("ssh-rsa", "AAAA")));
        assert_eq!(parse_auth("auth: ssh-rsa"), None);
        assert_eq!(parse_auth("auth:"), None);
        assert_eq!(parse_auth("auth:ssh-rsa AAAA x"), None);
        assert_eq!(parse_auth("mnt-by: ssh-rsa AAAA"), None);
        assert_eq!(parse_auth(""), None);
    }

    #[test]
    fn mnt_by_lines() {
        assert!(is_mnt_by("mnt-by:             FOO-MNT", "FOO-MNT"));
        assert!(is_mnt_by("mnt-by: FOO-MNT\r", "FOO-MNT"));
        assert!(!is_mnt_by("mnt-by: FOO-MNT # primary", "FOO-MNT"));
        assert!(!is_mnt_by("mnt-by:FOO-MNT", "FOO-MNT"));
        assert!(!is_mnt_by("mnt-by: foo-mnt", "FOO-MNT"));
        assert!(!is_mnt_by("admin-c: FOO-MNT", "FOO-MNT"));
    }

    #[test]
    fn plain_names() {
        assert!(is_plain_name("foo"));
        assert!(is_plain_name("foo-bar_1"));
        assert!(!is_plain_name(""));
        assert!(!is_plain_name("."));
        assert!(!is_plain_name("../foo"));
        assert!(!is_plain_name("foo/bar"));
        assert!(!is_plain_name("foo\\bar"));
        assert!(!is_plain_name("foo\0"));
    }
}
