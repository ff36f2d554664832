//! Lenient dotted-numeric version ordering.
//!
//! Upstream data carries version strings that are not semantic versions
//! (`2.9.4-nightly-20150209`, `3.0.0-pre`, `14.0-rc3`). Canonical data already
//! published was generated under this ordering, so it must not be tightened:
//! `1.0-pre` sorts above `1.0` here, and that is intended.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Number(u64),
    Word(String),
}

impl Ord for Component {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Word(a), Self::Word(b)) => a.cmp(b),
            (Self::Number(_), Self::Word(_)) => Ordering::Greater,
            (Self::Word(_), Self::Number(_)) => Ordering::Less,
        }
    }
}

impl PartialOrd for Component {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A version split into numeric and alphabetic runs; every other character
/// is a separator.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RelaxedVersion {
    components: Vec<Component>,
}

impl RelaxedVersion {
    /// Returns `None` when the string does not start with a numeric run.
    pub fn parse(s: &str) -> Option<Self> {
        let mut components = Vec::new();
        let mut chars = s.chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_ascii_digit() {
                let mut run = String::new();
                while let Some(&d) = chars.peek().filter(|d| d.is_ascii_digit()) {
                    run.push(d);
                    chars.next();
                }
                components.push(Component::Number(run.parse().ok()?));
            } else if c.is_alphabetic() {
                let mut run = String::new();
                while let Some(&a) = chars.peek().filter(|a| a.is_alphabetic()) {
                    run.extend(a.to_lowercase());
                    chars.next();
                }
                components.push(Component::Word(run));
            } else {
                chars.next();
            }
        }

        match components.first() {
            Some(Component::Number(_)) => Some(Self { components }),
            _ => None,
        }
    }
}

/// Compare two version strings leniently.
///
/// Unparsable strings rank below every parsable one and equal to each other.
pub fn compare_relaxed(a: &str, b: &str) -> Ordering {
    match (RelaxedVersion::parse(a), RelaxedVersion::parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_components_compare_numerically() {
        assert_eq!(compare_relaxed("2.0", "1.5"), Ordering::Greater);
        assert_eq!(compare_relaxed("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_relaxed("17.0", "17.0"), Ordering::Equal);
        assert_eq!(compare_relaxed("1.2", "1.2.1"), Ordering::Less);
    }

    #[test]
    fn suffixes_are_lenient() {
        assert_eq!(
            compare_relaxed("2.9.4-nightly-20150209", "2.9.1"),
            Ordering::Greater
        );
        assert_eq!(compare_relaxed("1.0-pre", "1.0"), Ordering::Greater);
        assert_eq!(compare_relaxed("1.0-pre", "1.0.1"), Ordering::Less);
        assert_eq!(compare_relaxed("14.0-rc3", "14.0-rc2"), Ordering::Greater);
    }

    #[test]
    fn unparsable_ranks_lowest() {
        assert_eq!(compare_relaxed("nightly", "0.1"), Ordering::Less);
        assert_eq!(compare_relaxed("0.1", ""), Ordering::Greater);
        assert_eq!(compare_relaxed("abc", "xyz"), Ordering::Equal);
        assert!(RelaxedVersion::parse("${version}").is_none());
    }

    #[test]
    fn case_is_ignored_in_words() {
        assert_eq!(compare_relaxed("1.0-RC1", "1.0-rc1"), Ordering::Equal);
    }

    #[test]
    fn oversized_numbers_are_unparsable() {
        assert!(RelaxedVersion::parse("99999999999999999999999").is_none());
    }
}
