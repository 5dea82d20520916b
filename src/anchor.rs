//! A4: anchor-family set.
//!
//! A process-wide, read-only set of domain families whose DDS contribution is
//! boosted relative to the rest of the architecture. Membership is checked on
//! the family id with any version suffix stripped.

use std::collections::HashSet;
use std::io::BufRead;

use anyhow::Result;

use crate::domain_index::strip_version;

#[derive(Debug, Clone, Default)]
pub struct AnchorSet {
    families: HashSet<String>,
}

impl AnchorSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut families = HashSet::new();
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            families.insert(strip_version(trimmed).to_string());
        }
        Ok(Self { families })
    }

    /// `family_id` may carry a version suffix; it is stripped before lookup.
    pub fn contains(&self, family_id: &str) -> bool {
        self.families.contains(strip_version(family_id))
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
