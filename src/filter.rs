//! Include/exclude filtering of named items like disks, interfaces or volumes.

use regex::Regex;

use crate::{Error, Result};

/// Decides which items are skipped. Patterns are unanchored regular expressions, so `eth` matches
/// every name containing `eth`. An exclude pattern wins over an include pattern.
#[derive(Clone, Debug, Default)]
pub struct ItemFilter {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl ItemFilter {
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        Ok(ItemFilter {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// True if either pattern is set.
    pub fn is_active(&self) -> bool {
        self.include.is_some() || self.exclude.is_some()
    }

    pub fn should_exclude(&self, name: &str) -> bool {
        if let Some(ref exclude) = self.exclude {
            exclude.is_match(name)
        } else if let Some(ref include) = self.include {
            !include.is_match(name)
        } else {
            false
        }
    }
}

fn compile(pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|source| Error::Pattern {
                pattern: p.to_owned(),
                source,
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude() {
        let filter = ItemFilter::new(None, Some("eth.*")).unwrap();
        assert!(filter.is_active());
        assert!(filter.should_exclude("eth0"));
        assert!(!filter.should_exclude("sas0"));
    }

    #[test]
    fn test_include() {
        let filter = ItemFilter::new(Some("eth.*"), None).unwrap();
        assert!(!filter.should_exclude("eth0"));
        assert!(filter.should_exclude("sas0"));
    }

    #[test]
    fn test_exclude_wins() {
        let filter = ItemFilter::new(Some("^e0"), Some("e0M")).unwrap();
        assert!(filter.should_exclude("e0M"));
        assert!(!filter.should_exclude("e0a"));
        // the include pattern is ignored once an exclude pattern is given
        assert!(!filter.should_exclude("a0a"));
    }

    #[test]
    fn test_unanchored() {
        let filter = ItemFilter::new(None, Some("root")).unwrap();
        assert!(filter.should_exclude("svm1_root"));
        assert!(filter.should_exclude("vol0_root_mirror"));
    }

    #[test]
    fn test_inactive() {
        let filter = ItemFilter::default();
        assert!(!filter.is_active());
        assert!(!filter.should_exclude("anything"));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ItemFilter::new(Some("(unclosed"), None).unwrap_err();
        assert!(matches!(err, Error::Pattern { ref pattern, .. } if pattern == "(unclosed"));
    }
}
