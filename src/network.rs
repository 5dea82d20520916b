//! C8: network emitter.
//!
//! Applies a similarity cutoff to a [`NetworkMatrix`] and serialises the
//! surviving edges as a fixed-column, tab-separated file (§6).

use std::collections::BTreeSet;
use std::io::Write;

use anyhow::{Context, Result};

use crate::scheduler::{NetworkMatrix, PairRecord};

pub const HEADER: &[&str] = &[
    "name_A",
    "name_B",
    "group_A",
    "class_A",
    "group_B",
    "class_B",
    "log2_sim",
    "raw_distance",
    "squared_similarity",
    "jaccard",
    "dds",
    "gk",
    "dds_non_anchor",
    "dds_anchor",
    "S",
    "S_anchor",
];

/// Writes one edge list to `writer`: every pair in `matrix` whose distance
/// satisfies `d <= 1 - cutoff` (similarity >= cutoff). `cutoff` must lie in
/// (0, 1]; the caller is responsible for that precondition (validated once
/// at startup in [`crate::config::Config`]).
pub fn write_network(writer: &mut impl Write, matrix: &NetworkMatrix, cutoff: f64, include_disconnected: bool) -> Result<()> {
    writeln!(writer, "{}", HEADER.join("\t")).context("writing network header")?;

    let max_distance = 1.0 - cutoff;
    let mut connected: BTreeSet<&str> = BTreeSet::new();

    for ((name_a, name_b), record) in matrix {
        if record.kernel.distance > max_distance {
            continue;
        }
        connected.insert(name_a.as_str());
        connected.insert(name_b.as_str());
        write_row(writer, name_a, name_b, record)?;
    }

    if include_disconnected {
        let all_names: BTreeSet<&str> = matrix
            .keys()
            .flat_map(|(a, b)| [a.as_str(), b.as_str()])
            .collect();
        for name in all_names.difference(&connected) {
            writeln!(writer, "{name}\t{name}\t\t\t\t\t\t\t\t\t\t\t\t\t\t").context("writing isolated node row")?;
        }
    }

    Ok(())
}

fn write_row(writer: &mut impl Write, name_a: &str, name_b: &str, record: &PairRecord) -> Result<()> {
    let k = &record.kernel;
    let log2_sim = k.log2_similarity();
    let log2_field = if log2_sim.is_infinite() { "inf".to_string() } else { format!("{log2_sim}") };
    writeln!(
        writer,
        "{name_a}\t{name_b}\t{}\t{}\t{}\t{}\t{log2_field}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
        record.group_a,
        record.class_a,
        record.group_b,
        record.class_b,
        k.distance,
        k.squared_similarity(),
        k.jaccard,
        k.dds,
        k.gk,
        k.dds_non_anchor,
        k.dds_anchor,
        k.s_non_anchor,
        k.s_anchor,
    )
    .context("writing network row")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pair_kernel::KernelOutput;

    fn record(distance: f64) -> PairRecord {
        PairRecord {
            group_a: "NRPS".to_string(),
            class_a: "Terpene".to_string(),
            group_b: "PKS".to_string(),
            class_b: "Alkaloid".to_string(),
            kernel: KernelOutput {
                distance,
                jaccard: 1.0 - distance,
                dds: 1.0 - distance,
                gk: 1.0 - distance,
                dds_non_anchor: 1.0 - distance,
                dds_anchor: 0.0,
                s_non_anchor: 2.0,
                s_anchor: 0.0,
            },
        }
    }

    #[test]
    fn cutoff_filters_edges_by_distance() {
        let mut matrix = NetworkMatrix::new();
        matrix.insert(("A".to_string(), "B".to_string()), record(0.1));
        matrix.insert(("A".to_string(), "C".to_string()), record(0.9));

        let mut buf = Vec::new();
        write_network(&mut buf, &matrix, 0.5, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2); // header + one surviving edge
        assert!(text.contains("A\tB"));
        assert!(!text.contains("A\tC"));
    }

    #[test]
    fn identical_pair_emits_infinite_log2_similarity() {
        let mut matrix = NetworkMatrix::new();
        matrix.insert(("A".to_string(), "B".to_string()), record(0.0));
        let mut buf = Vec::new();
        write_network(&mut buf, &matrix, 1.0, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\tinf\t"));
    }
}
