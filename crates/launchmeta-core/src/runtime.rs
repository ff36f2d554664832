//! Cross-vendor runtime recommendation.

use launchmeta_schema::{PackageType, RuntimeCandidate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct RuntimePolicy {
    /// Vendors in descending preference. Unlisted vendors rank below all of them.
    pub vendor_order: Vec<String>,
}

impl Default for RuntimePolicy {
    fn default() -> Self {
        Self {
            vendor_order: vec!["mojang".to_owned(), "eclipse".to_owned(), "azul".to_owned()],
        }
    }
}

impl RuntimePolicy {
    fn vendor_rank(&self, vendor: &str) -> usize {
        self.vendor_order
            .iter()
            .position(|v| v == vendor)
            .map_or(0, |i| self.vendor_order.len() - i)
    }

    fn package_rank(package: PackageType) -> u8 {
        match package {
            PackageType::Jre => 2,
            PackageType::Jdk => 1,
        }
    }

    /// Total preference order: `Greater` means `a` is the better candidate.
    ///
    /// Vendor, then package type, then version, then release time. Candidates
    /// equal on all of those are told apart by name, the lexically smaller
    /// name winning.
    pub fn compare(&self, a: &RuntimeCandidate, b: &RuntimeCandidate) -> Ordering {
        self.vendor_rank(&a.vendor)
            .cmp(&self.vendor_rank(&b.vendor))
            .then_with(|| {
                Self::package_rank(a.package_type).cmp(&Self::package_rank(b.package_type))
            })
            .then_with(|| a.version.cmp(&b.version))
            .then_with(|| a.release_time.cmp(&b.release_time))
            .then_with(|| b.name.cmp(&a.name))
    }

    /// Pick the recommended candidate of one comparison group.
    ///
    /// A group in which exactly one candidate is already flagged keeps that
    /// choice. The returned value has `recommended` set.
    pub fn select_recommended(&self, candidates: &[RuntimeCandidate]) -> Option<RuntimeCandidate> {
        let mut flagged = candidates.iter().filter(|c| c.recommended);
        let winner = match (flagged.next(), flagged.next()) {
            (Some(only), None) => only,
            _ => candidates.iter().fold(None, |best: Option<&RuntimeCandidate>, c| match best {
                Some(b) if self.compare(c, b) != Ordering::Greater => Some(b),
                _ => Some(c),
            })?,
        };
        Some(RuntimeCandidate {
            recommended: true,
            ..winner.clone()
        })
    }

    /// Return the group with exactly the selected candidate flagged.
    pub fn finalize_group(&self, candidates: &[RuntimeCandidate]) -> Vec<RuntimeCandidate> {
        let Some(winner) = self.select_recommended(candidates) else {
            return Vec::new();
        };
        let mut marked = false;
        candidates
            .iter()
            .map(|c| {
                let is_winner = !marked
                    && RuntimeCandidate {
                        recommended: true,
                        ..c.clone()
                    } == winner;
                marked |= is_winner;
                RuntimeCandidate {
                    recommended: is_winner,
                    ..c.clone()
                }
            })
            .collect()
    }

    /// Finalize every `(os, architecture, major)` group of a catalog.
    ///
    /// Groups come back in key order, candidates within a group in input order.
    pub fn recommend_catalog(&self, candidates: Vec<RuntimeCandidate>) -> Vec<RuntimeCandidate> {
        let mut groups: BTreeMap<(String, String, u32), Vec<RuntimeCandidate>> = BTreeMap::new();
        for c in candidates {
            groups.entry(c.group_key()).or_default().push(c);
        }
        groups
            .values()
            .flat_map(|group| self.finalize_group(group))
            .collect()
    }
}
