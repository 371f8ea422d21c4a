//! Structured Go version type and the version-specifier grammar.
//!
//! Version comparison is structural (ordered numeric components plus an
//! optional pre-release suffix) rather than string- or regex-based, so
//! `1.10` sorts above `1.9` and a pathological input can never make the
//! comparator backtrack.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Upper bound on the major component. Catalog entries and download URLs
/// interpolate version strings, so anything outside these bounds is treated
/// as a git ref instead of a release version.
const MAX_MAJOR: u64 = 9999;
/// Maximum digits per numeric component.
const MAX_COMPONENT_DIGITS: usize = 6;
/// Maximum length of a pre-release suffix like "rc1" or "beta2".
const MAX_SUFFIX_LEN: usize = 16;

/// A published Go release version: `major.minor[.patch][suffix]`.
///
/// `1.21`, `1.21.5` and `1.21rc1` are all valid. The ordering places a
/// suffixed (pre-release) version below the plain release with the same
/// numeric components, and `1.21` below `1.21.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GoVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: Option<u64>,
    pub suffix: Option<String>,
}

impl GoVersion {
    /// Parse a version string, with or without a leading `go`.
    ///
    /// Returns `None` for anything that does not fit the bounded
    /// `major.minor[.patch][suffix]` grammar; callers treat such input as a
    /// source-control ref.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.strip_prefix("go").unwrap_or(input);

        let (major_s, rest) = s.split_once('.')?;
        let major = parse_component(major_s)?;
        if !(1..=MAX_MAJOR).contains(&major) {
            return None;
        }

        // The minor component may run straight into a suffix ("21rc1").
        let (minor_part, patch_part) = match rest.split_once('.') {
            Some((m, p)) => (m, Some(p)),
            None => (rest, None),
        };
        let (minor, mut suffix) = split_numeric_suffix(minor_part)?;

        let mut patch = None;
        if let Some(p) = patch_part {
            // A suffix on the minor component leaves no room for a patch.
            if suffix.is_some() || p.contains('.') {
                return None;
            }
            let (num, sfx) = split_numeric_suffix(p)?;
            patch = Some(num);
            suffix = sfx;
        }

        if let Some(ref sfx) = suffix {
            if sfx.len() > MAX_SUFFIX_LEN
                || !sfx.starts_with(|c: char| c.is_ascii_alphabetic())
                || !sfx.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return None;
            }
        }

        Some(Self {
            major,
            minor,
            patch,
            suffix,
        })
    }

    /// Whether this version falls under a wildcard base such as `1.21`:
    /// either exactly the base, or the base followed by one more numeric
    /// component. Pre-release versions never match a wildcard.
    #[must_use]
    pub fn matches_prefix(&self, base: &str) -> bool {
        if self.suffix.is_some() {
            return false;
        }
        let s = self.to_string();
        if s == base {
            return true;
        }
        s.strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|tail| !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Parse a bounded numeric component.
fn parse_component(s: &str) -> Option<u64> {
    if s.is_empty() || s.len() > MAX_COMPONENT_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Split "21rc1" into (21, Some("rc1")); "21" into (21, None).
fn split_numeric_suffix(s: &str) -> Option<(u64, Option<String>)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    let num = parse_component(&s[..digits])?;
    let rest = &s[digits..];
    if rest.is_empty() {
        Some((num, None))
    } else {
        Some((num, Some(rest.to_string())))
    }
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            // Option's derived order (None < Some) puts `1.21` below `1.21.0`.
            .then(self.patch.cmp(&other.patch))
            .then_with(|| match (&self.suffix, &other.suffix) {
                (None, None) => Ordering::Equal,
                // A plain release outranks its own pre-releases.
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(patch) = self.patch {
            write!(f, ".{patch}")?;
        }
        if let Some(ref suffix) = self.suffix {
            f.write_str(suffix)?;
        }
        Ok(())
    }
}

impl FromStr for GoVersion {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| crate::Error::specifier(s))
    }
}

impl TryFrom<String> for GoVersion {
    type Error = crate::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<GoVersion> for String {
    fn from(v: GoVersion) -> Self {
        v.to_string()
    }
}

/// A parsed version specifier, immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The current stable release.
    Stable,
    /// One minor version behind stable.
    OldStable,
    /// The development tip, resolved through the checkout resolver.
    Tip,
    /// A numeric prefix such as `1.21` (written `1.21.x`); resolves to the
    /// highest matching catalog entry.
    Wildcard(String),
    /// An exact published version.
    Exact(GoVersion),
    /// Anything else: a branch, tag, commit, or revision expression.
    SourceRef(String),
}

impl VersionSpec {
    /// Parse a raw specifier string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Specifier`] only for empty input; any other
    /// string that is not a recognized version form is a `SourceRef`.
    pub fn parse(raw: &str) -> crate::Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(crate::Error::specifier(raw));
        }
        match raw {
            "stable" => return Ok(Self::Stable),
            "oldstable" | "old-stable" => return Ok(Self::OldStable),
            "tip" => return Ok(Self::Tip),
            _ => {}
        }
        if let Some(base) = raw.strip_suffix(".x").or_else(|| raw.strip_suffix(".X")) {
            if !base.is_empty() && base.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
                return Ok(Self::Wildcard(base.to_string()));
            }
        }
        if let Some(version) = GoVersion::parse(raw) {
            return Ok(Self::Exact(version));
        }
        Ok(Self::SourceRef(raw.to_string()))
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => f.write_str("stable"),
            Self::OldStable => f.write_str("oldstable"),
            Self::Tip => f.write_str("tip"),
            Self::Wildcard(base) => write!(f, "{base}.x"),
            Self::Exact(v) => write!(f, "{v}"),
            Self::SourceRef(r) => f.write_str(r),
        }
    }
}

/// The outcome of version resolution: a published release or a concrete
/// commit in the Go source repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedVersion {
    /// A version present in the published catalog.
    Release(GoVersion),
    /// A commit resolved from a source-control ref.
    Commit {
        /// Short hash (at least 6 hex characters).
        short_sha: String,
        /// The specifier that produced it, for reporting.
        spec: String,
    },
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release(v) => write!(f, "{v}"),
            Self::Commit { short_sha, .. } => f.write_str(short_sha),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> GoVersion {
        GoVersion::parse(s).unwrap()
    }

    #[test]
    fn parse_release_forms() {
        assert_eq!(
            v("1.21.5"),
            GoVersion {
                major: 1,
                minor: 21,
                patch: Some(5),
                suffix: None
            }
        );
        assert_eq!(v("1.21").patch, None);
        assert_eq!(v("go1.22.0").major, 1);
        assert_eq!(v("1.21rc1").suffix.as_deref(), Some("rc1"));
        assert_eq!(v("1.21.0rc1").patch, Some(0));
    }

    #[test]
    fn parse_rejects_out_of_bounds() {
        assert!(GoVersion::parse("0.9").is_none());
        assert!(GoVersion::parse("10000.1").is_none());
        assert!(GoVersion::parse("1.1234567").is_none());
        assert!(GoVersion::parse("1.2.3.4").is_none());
        assert!(GoVersion::parse("1.21.5-malicious/../path").is_none());
        assert!(GoVersion::parse("1.21.5aaaaaaaaaaaaaaaaaaaaaaaa").is_none());
        assert!(GoVersion::parse("1").is_none());
        assert!(GoVersion::parse("").is_none());
        assert!(GoVersion::parse("master").is_none());
    }

    #[test]
    fn numeric_not_lexical_ordering() {
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.21.10") > v("1.21.2"));
        assert!(v("1.9.7") < v("1.10.0"));
    }

    #[test]
    fn prerelease_sorts_below_release() {
        assert!(v("1.21rc1") < v("1.21"));
        assert!(v("1.21") < v("1.21.0"));
        assert!(v("1.21beta1") < v("1.21rc1"));
        assert!(v("1.21.0") < v("1.21.1"));
    }

    #[test]
    fn display_round_trip() {
        for s in ["1.21", "1.21.5", "1.21rc1", "1.21.0"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn wildcard_prefix_matching() {
        assert!(v("1.21").matches_prefix("1.21"));
        assert!(v("1.21.5").matches_prefix("1.21"));
        assert!(!v("1.21.5").matches_prefix("1.2"));
        assert!(!v("1.2.1").matches_prefix("1.21"));
        assert!(!v("1.21rc1").matches_prefix("1.21"));
        assert!(v("1.21.10").matches_prefix("1.21"));
    }

    #[test]
    fn spec_parse_symbolic() {
        assert_eq!(VersionSpec::parse("stable").unwrap(), VersionSpec::Stable);
        assert_eq!(
            VersionSpec::parse("oldstable").unwrap(),
            VersionSpec::OldStable
        );
        assert_eq!(VersionSpec::parse("tip").unwrap(), VersionSpec::Tip);
    }

    #[test]
    fn spec_parse_wildcard() {
        assert_eq!(
            VersionSpec::parse("1.21.x").unwrap(),
            VersionSpec::Wildcard("1.21".to_string())
        );
        assert_eq!(
            VersionSpec::parse("1.X").unwrap(),
            VersionSpec::Wildcard("1".to_string())
        );
        // Not a numeric base: falls through to a source ref.
        assert_eq!(
            VersionSpec::parse("release.x").unwrap(),
            VersionSpec::SourceRef("release.x".to_string())
        );
    }

    #[test]
    fn spec_parse_exact_vs_ref() {
        assert_eq!(
            VersionSpec::parse("1.21.5").unwrap(),
            VersionSpec::Exact(v("1.21.5"))
        );
        assert_eq!(
            VersionSpec::parse("release-branch.go1.20").unwrap(),
            VersionSpec::SourceRef("release-branch.go1.20".to_string())
        );
        assert_eq!(
            VersionSpec::parse("a1b2c3d4e5f6").unwrap(),
            VersionSpec::SourceRef("a1b2c3d4e5f6".to_string())
        );
        assert!(VersionSpec::parse("").is_err());
        assert!(VersionSpec::parse("   ").is_err());
    }
}
