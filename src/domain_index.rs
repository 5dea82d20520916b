//! C1: domain index.
//!
//! Builds the per-BGC ordered domain sequence and per-family occurrence lists
//! from a tabular domain annotation stream (see [`crate::corpus::read_annotation_table`]).

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Strand of a parent gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    Reverse,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        })
    }
}

/// One row of the domain annotation table, as read from the input file.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationRow {
    pub bgc_name: String,
    pub family_id: String,
    pub envelope_start_aa: u32,
    pub envelope_end_aa: u32,
    pub gene_id: String,
    pub gene_nt_start: u64,
    pub gene_nt_end: u64,
    pub gene_strand: String,
}

/// One instance of a domain family in a specific gene of a specific BGC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub bgc_name: String,
    pub family_id: String,
    pub occurrence_key: String,
    pub gene_id: String,
    pub envelope_start: u32,
    pub envelope_end: u32,
    pub strand: Strand,
}

impl Occurrence {
    /// Build the canonical occurrence key: unique within a BGC by gene id and
    /// envelope coordinates, globally unique by also carrying the BGC name.
    fn make_key(bgc_name: &str, gene_id: &str, start: u32, end: u32) -> String {
        format!("{bgc_name}#{gene_id}#{start}-{end}")
    }
}

/// Family-id utilities. Version suffixes (`PF00550.7`) are stripped only when
/// checking anchor-set membership; domain-set equality uses the full id.
pub fn strip_version(family_id: &str) -> &str {
    match family_id.find('.') {
        Some(pos) => &family_id[..pos],
        None => family_id,
    }
}

/// An annotated genomic region: a unique name, an ordered domain sequence, and
/// the per-family occurrence lists, plus an opaque group label for edge
/// annotation.
#[derive(Debug, Clone)]
pub struct Bgc {
    pub name: String,
    pub group: String,
    pub class: String,
    pub domain_sequence: Vec<String>,
    pub domain_multiset: BTreeMap<String, Vec<Occurrence>>,
}

impl Bgc {
    pub fn family_set(&self) -> std::collections::BTreeSet<&str> {
        self.domain_multiset.keys().map(String::as_str).collect()
    }

    pub fn count(&self, family: &str) -> usize {
        self.domain_multiset.get(family).map_or(0, Vec::len)
    }

    pub fn has_domains(&self) -> bool {
        !self.domain_sequence.is_empty()
    }
}

/// Incrementally builds a [`Bgc`] from annotation rows sharing the same
/// `bgc_name`, then finalizes ordering on [`build`](GroupBuilder::build).
struct GroupBuilder {
    name: String,
    group: String,
    class: String,
    // (gene_nt_start, envelope_start) used as the ordering key; the envelope
    // coordinates are already expressed along the strand-corrected
    // translation, so gene strand does not otherwise affect ordering.
    entries: Vec<(u64, u32, Occurrence)>,
}

impl GroupBuilder {
    fn new(name: String) -> Self {
        Self {
            name,
            group: String::new(),
            class: String::new(),
            entries: Vec::new(),
        }
    }

    fn push(&mut self, row: &AnnotationRow) -> Result<(), String> {
        let strand = match row.gene_strand.as_str() {
            "+" => Strand::Forward,
            "-" => Strand::Reverse,
            other => return Err(format!("unrecognised gene_strand {other:?}")),
        };
        if row.envelope_end_aa < row.envelope_start_aa {
            return Err("envelope_end_aa before envelope_start_aa".to_string());
        }
        let occurrence_key = Occurrence::make_key(
            &self.name,
            &row.gene_id,
            row.envelope_start_aa,
            row.envelope_end_aa,
        );
        let occurrence = Occurrence {
            bgc_name: self.name.clone(),
            family_id: row.family_id.clone(),
            occurrence_key,
            gene_id: row.gene_id.clone(),
            envelope_start: row.envelope_start_aa,
            envelope_end: row.envelope_end_aa,
            strand,
        };
        self.entries
            .push((row.gene_nt_start, row.envelope_start_aa, occurrence));
        Ok(())
    }

    /// Attach group/class metadata. Rows do not (necessarily) carry it, so
    /// callers supply it out of band once per BGC; a no-op if never called.
    fn with_group(mut self, group: String, class: String) -> Self {
        self.group = group;
        self.class = class;
        self
    }

    fn build(mut self) -> Bgc {
        self.entries
            .sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut domain_sequence = Vec::with_capacity(self.entries.len());
        let mut domain_multiset: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for (_, _, occurrence) in self.entries {
            domain_sequence.push(occurrence.family_id.clone());
            domain_multiset
                .entry(occurrence.family_id.clone())
                .or_default()
                .push(occurrence);
        }

        Bgc {
            name: self.name,
            group: self.group,
            class: self.class,
            domain_sequence,
            domain_multiset,
        }
    }
}

/// Per-BGC group/class metadata, supplied separately from the domain
/// annotation table (e.g. from a samples sheet). Opaque to the distance
/// engine; used only for edge annotation.
#[derive(Debug, Clone, Default)]
pub struct GroupLabels {
    pub group: String,
    pub class: String,
}

/// Build one [`Bgc`] per distinct `bgc_name` seen in `rows`, in first-seen
/// order. BGCs with zero rows surviving are simply absent from the result;
/// callers are responsible for excluding them from the pair universe (done
/// automatically since they never appear here).
///
/// Malformed rows are always skipped rather than aborting the whole table;
/// the second element of the return value lists `(row index, reason)` for
/// each one. Whether too many malformed rows should be fatal is a policy
/// decision left to the caller (SPEC_FULL.md §7: "if more than a configured
/// fraction of rows fail, abort").
pub fn build_bgcs(
    rows: impl IntoIterator<Item = AnnotationRow>,
    labels: &std::collections::HashMap<String, GroupLabels>,
) -> (Vec<Bgc>, Vec<(usize, String)>) {
    let mut order: Vec<String> = Vec::new();
    let mut builders: std::collections::HashMap<String, GroupBuilder> = std::collections::HashMap::new();
    let mut errors = Vec::new();

    for (idx, row) in rows.into_iter().enumerate() {
        let builder = builders.entry(row.bgc_name.clone()).or_insert_with(|| {
            order.push(row.bgc_name.clone());
            GroupBuilder::new(row.bgc_name.clone())
        });
        if let Err(reason) = builder.push(&row) {
            errors.push((idx, reason));
        }
    }

    let bgcs = order
        .into_iter()
        .map(|name| {
            let labels = labels.get(&name).cloned().unwrap_or_default();
            builders
                .remove(&name)
                .expect("name was just pushed to order")
                .with_group(labels.group, labels.class)
                .build()
        })
        .collect();

    (bgcs, errors)
}
