//! C7: pair scheduler.
//!
//! Enumerates all unordered pairs of BGCs with at least one predicted
//! domain, dispatches the pair-distance kernel across a rayon thread pool,
//! and collects the results into a stable keyed map.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::anchor::AnchorSet;
use crate::config::{Config, Strategy};
use crate::corpus::Corpus;
use crate::domain_index::Bgc;
use crate::pair_kernel::{self, KernelOutput, Mode};

/// One resolved pairwise comparison, keyed by `(name_a, name_b)` with
/// `name_a < name_b` lexicographically. Carries the group/class annotation
/// alongside the kernel output so the emitter needs no further lookups.
#[derive(Debug, Clone)]
pub struct PairRecord {
    pub group_a: String,
    pub class_a: String,
    pub group_b: String,
    pub class_b: String,
    pub kernel: KernelOutput,
}

/// Results of one full scheduler run, keyed by `(name_a, name_b)` in
/// lexicographic pair order. A `BTreeMap` gives a stable iteration order for
/// free, matching SPEC_FULL.md §5's "stable keyed map" requirement.
pub type NetworkMatrix = BTreeMap<(String, String), PairRecord>;

/// Restricts pair enumeration to pairs whose endpoints share at least one
/// sample. `None` means "no restriction, compare every pair" (SPEC_FULL.md
/// §4.7).
pub struct SampleFilter<'a> {
    pub membership: &'a std::collections::HashMap<String, Vec<String>>,
}

impl SampleFilter<'_> {
    fn allows(&self, a: &str, b: &str) -> bool {
        let samples_a = self.membership.get(a);
        let samples_b = self.membership.get(b);
        match (samples_a, samples_b) {
            (Some(sa), Some(sb)) => sa.iter().any(|s| sb.contains(s)),
            _ => false,
        }
    }
}

pub fn run(corpus: &Corpus, config: &Config, sample_filter: Option<&SampleFilter>) -> NetworkMatrix {
    let weights = config.weights;
    let anchors = &corpus.anchors;
    let oracle = corpus.oracle();
    let mode = match config.strategy {
        Strategy::ArchitectureOnly => Mode::ArchitectureOnly,
        Strategy::PrecomputedMsa | Strategy::PairwiseOnTheFly => Mode::Sequence(oracle),
    };

    let pairs = enumerate_pairs(&corpus.bgcs, sample_filter);

    pairs
        .into_par_iter()
        .map(|(i, j)| {
            let a = &corpus.bgcs[i];
            let b = &corpus.bgcs[j];
            let kernel = pair_kernel::pair_distance(a, b, anchors, &mode, &weights, config.anchor_weight, config.nbhood);
            let key = pair_key(&a.name, &b.name);
            let record = PairRecord {
                group_a: a.group.clone(),
                class_a: a.class.clone(),
                group_b: b.group.clone(),
                class_b: b.class.clone(),
                kernel,
            };
            (key, record)
        })
        .collect::<Vec<_>>()
        .into_iter()
        .collect()
}

fn pair_key(name_a: &str, name_b: &str) -> (String, String) {
    if name_a <= name_b {
        (name_a.to_string(), name_b.to_string())
    } else {
        (name_b.to_string(), name_a.to_string())
    }
}

fn enumerate_pairs(bgcs: &[Bgc], sample_filter: Option<&SampleFilter>) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..bgcs.len() {
        for j in (i + 1)..bgcs.len() {
            if let Some(filter) = sample_filter {
                if !filter.allows(&bgcs[i].name, &bgcs[j].name) {
                    continue;
                }
            }
            pairs.push((i, j));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_index::{build_bgcs, AnnotationRow};
    use std::collections::HashMap;

    fn row(bgc: &str, family: &str) -> AnnotationRow {
        AnnotationRow {
            bgc_name: bgc.to_string(),
            family_id: family.to_string(),
            envelope_start_aa: 0,
            envelope_end_aa: 10,
            gene_id: "g1".to_string(),
            gene_nt_start: 0,
            gene_nt_end: 300,
            gene_strand: "+".to_string(),
        }
    }

    #[test]
    fn enumerates_all_unordered_pairs_without_self_pairs() {
        let rows = vec![row("A", "PF1"), row("B", "PF1"), row("C", "PF2")];
        let (bgcs, errors) = build_bgcs(rows, &HashMap::new());
        assert!(errors.is_empty());
        let pairs = enumerate_pairs(&bgcs, None);
        assert_eq!(pairs.len(), 3);
        assert!(pairs.iter().all(|&(i, j)| i != j));
    }

    #[test]
    fn sample_filter_restricts_to_shared_samples() {
        let rows = vec![row("A", "PF1"), row("B", "PF1"), row("C", "PF2")];
        let (bgcs, _) = build_bgcs(rows, &HashMap::new());
        let mut membership = HashMap::new();
        membership.insert("A".to_string(), vec!["s1".to_string()]);
        membership.insert("B".to_string(), vec!["s1".to_string()]);
        membership.insert("C".to_string(), vec!["s2".to_string()]);
        let filter = SampleFilter { membership: &membership };
        let pairs = enumerate_pairs(&bgcs, Some(&filter));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], (0, 1));
    }

    #[test]
    fn pair_key_is_lexicographically_ordered_regardless_of_call_order() {
        assert_eq!(pair_key("b", "a"), pair_key("a", "b"));
        assert_eq!(pair_key("a", "b"), ("a".to_string(), "b".to_string()));
    }
}
