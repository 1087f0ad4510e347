//! Ruby version string model
//!
//! Parses loosely structured version strings such as `2.4.1`, `ruby-2.3.4-clang`,
//! `jruby-9.0.0.0.pre1` or `1.8.7-p371` into a comparable key.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use regex::Regex;

/// Interpreter kind used when the string does not name one
pub const DEFAULT_KIND: &str = "ruby";

/// Prefix stripped from the stored string (`ruby-2.5.0` is stored as `2.5.0`)
const FAMILY_PREFIX: &str = "ruby-";

static VARIANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(clang|railsexpress)$").expect("valid variant regex"));
static KIND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^0-9\-]+)-?").expect("valid kind regex"));
static NUMERIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d+)*(?:-p\d+)?)(?:\.|-|$)").expect("valid numeric regex")
});
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// A parsed version
///
/// Every component is derived from the normalized string, so equal strings
/// always have equal components. Ordering compares
/// `(kind, numeric parts, release rank, variant)` and falls back to the
/// normalized string, so two differently spelled versions with the same
/// components are still distinct.
#[derive(Clone)]
pub struct VersionKey {
    raw: String,
    kind: String,
    numeric_parts: Option<Vec<u64>>,
    pre_release: Option<String>,
    variant: Option<String>,
}

impl VersionKey {
    /// Parse a version string. Never fails: unrecognized input yields a key
    /// without numeric parts, which is ineligible for updates.
    pub fn parse(input: &str) -> Self {
        let raw = input.strip_prefix(FAMILY_PREFIX).unwrap_or(input).to_string();
        let mut rest = raw.as_str();

        let variant = VARIANT_RE.captures(rest).map(|caps| {
            let whole = caps.get(0).map_or(0, |m| m.start());
            let name = caps[1].to_string();
            rest = &rest[..whole];
            name
        });

        let kind = match KIND_RE.captures(rest) {
            Some(caps) => {
                let end = caps.get(0).map_or(0, |m| m.end());
                let name = caps[1].to_string();
                rest = &rest[end..];
                name
            }
            None => DEFAULT_KIND.to_string(),
        };

        let numeric_parts = NUMERIC_RE.captures(rest).map(|caps| {
            let end = caps.get(0).map_or(0, |m| m.end());
            let parts = DIGITS_RE
                .find_iter(&caps[1])
                .filter_map(|m| m.as_str().parse::<u64>().ok())
                .collect();
            rest = &rest[end..];
            parts
        });

        let pre_release = (!rest.is_empty()).then(|| rest.to_string());

        Self {
            raw,
            kind,
            numeric_parts,
            pre_release,
            variant,
        }
    }

    /// Normalized string (family prefix removed)
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn numeric_parts(&self) -> Option<&[u64]> {
        self.numeric_parts.as_deref()
    }

    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// Check whether both versions agree on kind, variant and the first `n`
    /// numeric parts.
    ///
    /// Parts are truncated to `n` before comparing, so `1.7.7` and `1.7.7.1`
    /// match up to 3 parts but not at 4. Pre-release tags are ignored.
    pub fn matches(&self, other: &VersionKey, n: usize) -> bool {
        self.kind == other.kind
            && self.variant == other.variant
            && self.leading_parts(n) == other.leading_parts(n)
    }

    fn leading_parts(&self, n: usize) -> Option<&[u64]> {
        self.numeric_parts
            .as_deref()
            .map(|parts| &parts[..n.min(parts.len())])
    }

    fn release_rank(&self) -> (u8, &str) {
        match &self.pre_release {
            Some(pre) => (0, pre.as_str()),
            None => (1, ""),
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl fmt::Debug for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VersionKey({})", self.raw)
    }
}

impl From<&str> for VersionKey {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl PartialEq for VersionKey {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for VersionKey {}

impl Hash for VersionKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl PartialOrd for VersionKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let empty: &[u64] = &[];
        self.kind
            .cmp(&other.kind)
            .then_with(|| {
                let ours = self.numeric_parts.as_deref().unwrap_or(empty);
                let theirs = other.numeric_parts.as_deref().unwrap_or(empty);
                ours.cmp(theirs)
            })
            .then_with(|| self.release_rank().cmp(&other.release_rank()))
            .then_with(|| {
                let ours = self.variant.as_deref().unwrap_or("");
                let theirs = other.variant.as_deref().unwrap_or("");
                ours.cmp(theirs)
            })
            .then_with(|| self.raw.cmp(&other.raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> VersionKey {
        VersionKey::parse(s)
    }

    #[rstest]
    #[case("1.2.3-pre1", "1.2.3-pre1", "ruby", Some(vec![1, 2, 3]), Some("pre1"), None)]
    #[case("jruby", "jruby", "jruby", None, None, None)]
    #[case("ruby-2.3.4.5-clang", "2.3.4.5-clang", "ruby", Some(vec![2, 3, 4, 5]), None, Some("clang"))]
    #[case("xrb-1000", "xrb-1000", "xrb", Some(vec![1000]), None, None)]
    #[case("1.5", "1.5", "ruby", Some(vec![1, 5]), None, None)]
    #[case("1.8.4-p616", "1.8.4-p616", "ruby", Some(vec![1, 8, 4, 616]), None, None)]
    #[case("jruby-9.0.0.0.pre1", "jruby-9.0.0.0.pre1", "jruby", Some(vec![9, 0, 0, 0]), Some("pre1"), None)]
    #[case("2.4.0-preview1", "2.4.0-preview1", "ruby", Some(vec![2, 4, 0]), Some("preview1"), None)]
    #[case("ruby-head", "head", "head", None, None, None)]
    #[case("2.2.4-railsexpress", "2.2.4-railsexpress", "ruby", Some(vec![2, 2, 4]), None, Some("railsexpress"))]
    #[case("", "", "ruby", None, None, None)]
    fn parse_extracts_components(
        #[case] input: &str,
        #[case] raw: &str,
        #[case] kind: &str,
        #[case] numeric_parts: Option<Vec<u64>>,
        #[case] pre_release: Option<&str>,
        #[case] variant: Option<&str>,
    ) {
        let key = v(input);
        assert_eq!(key.as_str(), raw);
        assert_eq!(key.kind(), kind);
        assert_eq!(key.numeric_parts(), numeric_parts.as_deref());
        assert_eq!(key.pre_release(), pre_release);
        assert_eq!(key.variant(), variant);
    }

    #[test]
    fn equality_uses_normalized_string() {
        assert_ne!(v("1.8"), v("1.9"));
        assert_eq!(v("1.8"), v("1.8"));
        assert_eq!(v("1.8"), v("ruby-1.8"));
    }

    #[rstest]
    #[case("ruby-head", "head")]
    #[case("ruby-2.3.4-clang", "2.3.4-clang")]
    #[case("ruby-2.4.0-preview1", "2.4.0-preview1")]
    fn family_prefix_does_not_change_ordering(#[case] prefixed: &str, #[case] bare: &str) {
        let prefixed = v(prefixed);
        let bare = v(bare);

        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.cmp(&bare), Ordering::Equal);
        assert_eq!(prefixed.kind(), bare.kind());
        assert_eq!(prefixed.pre_release(), bare.pre_release());
    }

    #[test]
    fn same_components_with_different_spelling_are_distinct() {
        let patched = v("1.8.4-p616");
        let dotted = v("1.8.4.616");

        assert_eq!(patched.numeric_parts(), dotted.numeric_parts());
        assert_ne!(patched, dotted);
        assert_ne!(patched.cmp(&dotted), Ordering::Equal);
    }

    #[test]
    fn ordering_uses_all_components() {
        let ordered: Vec<VersionKey> = [
            "jruby-head",
            "jruby-1.7.7",
            "jruby-1.7.26",
            "jruby-9.0.0.0.pre1",
            "jruby-9.0.0.0.pre2",
            "jruby-9.0.0.0",
            "ruby-1.8.7",
            "ruby-1.8.7-p371",
            "ruby-2.0.0-p645",
            "ruby-2.0.0-p647",
            "ruby-2.0.0-p647-clang",
        ]
        .into_iter()
        .map(v)
        .collect();

        let mut shuffled = ordered.clone();
        shuffled.reverse();
        shuffled.sort();

        assert_eq!(shuffled, ordered);
    }

    #[test]
    fn stable_release_sorts_after_its_pre_release() {
        assert!(v("2.4.0-pre") < v("2.4.0"));
        assert!(v("2.4.0") < v("2.4.1"));
        assert!(v("2.4.1") < v("2.4.2-pre1"));
    }

    #[rstest]
    // same version matches at any granularity
    #[case("ruby-1.7.7", &[0, 1, 2, 3, 4], &[])]
    // different patch
    #[case("ruby-1.7.8", &[0, 1, 2], &[3, 4])]
    // different minor
    #[case("ruby-1.8.7", &[0, 1], &[2, 3, 4])]
    // different major
    #[case("ruby-2.7.7", &[0], &[1, 2, 3, 4])]
    // additional part
    #[case("ruby-1.7.7.1", &[0, 1, 2, 3], &[4])]
    // pre-release of the same version
    #[case("ruby-1.7.7-pre1", &[0, 1, 2, 3, 4], &[])]
    // different kind
    #[case("jruby-1.7.7", &[], &[0, 1, 2, 3, 4])]
    // different variant
    #[case("ruby-1.7.7-clang", &[], &[0, 1, 2, 3, 4])]
    // no numeric parts
    #[case("ruby", &[], &[0, 1, 2, 3, 4])]
    fn matches_compares_leading_parts(
        #[case] other: &str,
        #[case] matching: &[usize],
        #[case] not_matching: &[usize],
    ) {
        let subject = v("ruby-1.7.7");
        let other = v(other);

        for &n in matching {
            assert!(subject.matches(&other, n), "expected match at {n}");
        }
        for &n in not_matching {
            assert!(!subject.matches(&other, n), "expected no match at {n}");
        }
    }

    #[test]
    fn display_shows_normalized_string() {
        assert_eq!(v("ruby-2.5.0").to_string(), "2.5.0");
        assert_eq!(format!("{:?}", v("jruby")), "VersionKey(jruby)");
    }
}
