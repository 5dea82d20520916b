//! C5 + C6: pair-distance kernel and Goodman-Kruskal adjacency.
//!
//! Composes the Jaccard, DDS (with anchor reweighting), and GK terms into
//! the composite distance for one pair of BGCs.

use std::collections::HashSet;

use log::debug;

use crate::anchor::AnchorSet;
use crate::assignment;
use crate::domain_index::Bgc;
use crate::similarity_oracle::SimilarityOracle;

/// Composite weights for the distance formula. The common case has them sum
/// to 1, but this is not enforced here (validated at configuration time).
#[derive(Debug, Clone, Copy)]
pub struct Weights {
    pub jaccard: f64,
    pub dds: f64,
    pub gk: f64,
}

/// Which similarity strategy the kernel should use for this pair.
pub enum Mode<'a> {
    Sequence(&'a dyn SimilarityOracle),
    ArchitectureOnly,
}

/// All fields of one pairwise comparison, mirroring the output network
/// columns (minus the two BGC names/groups, which the scheduler attaches).
#[derive(Debug, Clone, PartialEq)]
pub struct KernelOutput {
    pub distance: f64,
    pub jaccard: f64,
    pub dds: f64,
    pub gk: f64,
    pub dds_non_anchor: f64,
    pub dds_anchor: f64,
    pub s_non_anchor: f64,
    pub s_anchor: f64,
}

impl KernelOutput {
    pub fn squared_similarity(&self) -> f64 {
        (1.0 - self.distance).powi(2)
    }

    /// `+inf` when `distance == 0` ("identical"), else `-log2(distance)`.
    pub fn log2_similarity(&self) -> f64 {
        if self.distance == 0.0 {
            f64::INFINITY
        } else {
            -self.distance.log2()
        }
    }
}

fn clamp_distance(d: f64) -> f64 {
    if d < 0.0 {
        debug!("composite distance {d} rounded below zero, clamping");
        0.0
    } else {
        d
    }
}

pub fn pair_distance(a: &Bgc, b: &Bgc, anchors: &AnchorSet, mode: &Mode, weights: &Weights, anchor_weight: f64, nbhood: usize) -> KernelOutput {
    if a.domain_sequence.is_empty() || b.domain_sequence.is_empty() {
        return KernelOutput {
            distance: 1.0,
            jaccard: 0.0,
            dds: 0.0,
            gk: 0.0,
            dds_non_anchor: 0.0,
            dds_anchor: 0.0,
            s_non_anchor: 0.0,
            s_anchor: 0.0,
        };
    }

    match mode {
        Mode::ArchitectureOnly => architecture_only_distance(a, b, weights, nbhood),
        Mode::Sequence(oracle) => match sequence_distance(a, b, anchors, *oracle, weights, anchor_weight, nbhood) {
            Some(result) => result,
            None => architecture_only_distance(a, b, weights, nbhood),
        },
    }
}

fn family_sets<'a>(a: &'a Bgc, b: &'a Bgc) -> (HashSet<&'a str>, HashSet<&'a str>) {
    (a.family_set().into_iter().collect(), b.family_set().into_iter().collect())
}

fn sequence_distance(
    a: &Bgc,
    b: &Bgc,
    anchors: &AnchorSet,
    oracle: &dyn SimilarityOracle,
    weights: &Weights,
    anchor_weight: f64,
    nbhood: usize,
) -> Option<KernelOutput> {
    let (set_a, set_b) = family_sets(a, b);
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    let jaccard = if union == 0 { 0.0 } else { intersection as f64 / union as f64 };

    let mut diff_na = 0.0f64;
    let mut s_na = 0.0f64;
    let mut diff_a = 0.0f64;
    let mut s_a = 0.0f64;

    let mut all_families: Vec<&str> = set_a.union(&set_b).copied().collect();
    all_families.sort_unstable();

    for family in all_families {
        let a_count = a.count(family);
        let b_count = b.count(family);
        let is_anchor = anchors.contains(family);

        let (contribution, mass) = if a_count == 0 || b_count == 0 {
            let m = a_count.max(b_count) as f64;
            (m, m)
        } else {
            let occs_a = &a.domain_multiset[family];
            let occs_b = &b.domain_multiset[family];
            let mut cost = vec![vec![0.0f64; occs_b.len()]; occs_a.len()];
            for (i, oa) in occs_a.iter().enumerate() {
                for (j, ob) in occs_b.iter().enumerate() {
                    let (sim, _len) = oracle.similarity(family, &oa.occurrence_key, &ob.occurrence_key)?;
                    cost[i][j] = (1.0 - sim).clamp(0.0, 1.0);
                }
            }
            let matched = assignment::solve(&cost);
            let unmatched = (a_count as i64 - b_count as i64).unsigned_abs() as f64;
            (matched.total_cost + unmatched, a_count.max(b_count) as f64)
        };

        if is_anchor {
            diff_a += contribution;
            s_a += mass;
        } else {
            diff_na += contribution;
            s_na += mass;
        }
    }

    let dds_na = if s_na > 0.0 { diff_na / s_na } else { 0.0 };
    let dds_a = if s_a > 0.0 { diff_a / s_a } else { 0.0 };

    let dds_distance = if s_na > 0.0 && s_a > 0.0 {
        let p_na = s_na / (s_na + s_a);
        let p_a = s_a / (s_na + s_a);
        let w_na = p_na / (p_a * anchor_weight + p_na);
        let w_a = p_a * anchor_weight / (p_a * anchor_weight + p_na);
        w_na * dds_na + w_a * dds_a
    } else if s_na > 0.0 {
        dds_na
    } else if s_a > 0.0 {
        dds_a
    } else {
        0.0
    };
    let dds = 1.0 - dds_distance;

    let gk = compute_gk(&a.domain_sequence, &b.domain_sequence, intersection, nbhood);

    let distance = clamp_distance(1.0 - weights.jaccard * jaccard - weights.dds * dds - weights.gk * gk);

    Some(KernelOutput {
        distance,
        jaccard,
        dds,
        gk,
        dds_non_anchor: dds_na,
        dds_anchor: dds_a,
        s_non_anchor: s_na,
        s_anchor: s_a,
    })
}

fn architecture_only_distance(a: &Bgc, b: &Bgc, weights: &Weights, nbhood: usize) -> KernelOutput {
    let (set_a, set_b) = family_sets(a, b);
    let intersection = set_a.intersection(&set_b).count();
    let min_size = set_a.len().min(set_b.len());
    let denom = 2 * min_size - intersection;
    let jaccard = if denom == 0 { 0.0 } else { intersection as f64 / denom as f64 };

    let mut diff = 0.0f64;
    let mut s = 0.0f64;
    for family in set_a.union(&set_b) {
        let a_count = a.count(family);
        let b_count = b.count(family);
        diff += (a_count as i64 - b_count as i64).unsigned_abs() as f64;
        s += a_count.max(b_count) as f64;
    }
    let dds = (-diff / s).exp();

    let gk = compute_gk(&a.domain_sequence, &b.domain_sequence, intersection, nbhood);

    let distance = clamp_distance(1.0 - weights.jaccard * jaccard - weights.dds * dds - weights.gk * gk);

    KernelOutput {
        distance,
        jaccard,
        dds,
        gk,
        dds_non_anchor: dds,
        dds_anchor: 0.0,
        s_non_anchor: s,
        s_anchor: 0.0,
    }
}

/// C6: Goodman-Kruskal gamma over adjacency pairs within a sliding window,
/// tried both forward and with `a` reversed; the larger score wins.
fn compute_gk(a: &[String], b: &[String], shared_family_count: usize, nbhood: usize) -> f64 {
    if shared_family_count <= 1 {
        return 0.0;
    }
    let forward = gk_one_direction(a, b, nbhood);
    let reversed: Vec<String> = a.iter().rev().cloned().collect();
    let backward = gk_one_direction(&reversed, b, nbhood);
    forward.max(backward)
}

fn ordered_pairs(x: &[String], nbhood: usize) -> HashSet<(&str, &str)> {
    let mut pairs = HashSet::new();
    let n = x.len();
    for i in 0..n.saturating_sub(1) {
        let hi = (i + nbhood).min(n - 1);
        for j in (i + 1)..=hi {
            pairs.insert((x[i].as_str(), x[j].as_str()));
        }
    }
    pairs
}

fn gk_one_direction(a: &[String], b: &[String], nbhood: usize) -> f64 {
    let pairs_a = ordered_pairs(a, nbhood);
    let pairs_b = ordered_pairs(b, nbhood);

    let mut ns = 0usize;
    let mut nr = 0usize;
    for &(x, y) in &pairs_a {
        if pairs_b.contains(&(x, y)) {
            ns += 1;
        } else if pairs_b.contains(&(y, x)) {
            nr += 1;
        }
    }
    if ns + nr == 0 {
        return 0.0;
    }
    let gamma = (ns as f64 - nr as f64) / (ns + nr) as f64;
    (1.0 + gamma) / 2.0
}
