//! Ingest phase: reads the external inputs (§6) and assembles the immutable,
//! read-only bundle (C1+C2+C3, plus the anchor set) that every pair-kernel
//! worker shares (SPEC_FULL.md §3 "Ownership").

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::anchor::AnchorSet;
use crate::config::{Config, Strategy};
use crate::domain_index::{build_bgcs, AnnotationRow, Bgc, GroupLabels};
use crate::fasta::read_genes;
use crate::sequence_store::SequenceStore;
use crate::similarity_oracle::{PrecomputedOracle, SimilarityOracle, UnavailableOracle};

/// The corpus owns everything a pair-kernel call needs to read: the BGCs
/// surviving the domain-annotation ingest, the sequence store backing the
/// pairwise oracle, the anchor set, and the chosen similarity strategy.
pub struct Corpus {
    pub bgcs: Vec<Bgc>,
    pub anchors: AnchorSet,
    oracle: Box<dyn SimilarityOracle>,
}

impl Corpus {
    pub fn oracle(&self) -> &dyn SimilarityOracle {
        self.oracle.as_ref()
    }

    pub fn load(config: &Config) -> Result<Self> {
        let rows = read_annotation_table(&config.domains)?;
        let row_count = rows.len();

        let labels = match &config.labels {
            Some(path) => read_labels(path)?,
            None => HashMap::new(),
        };

        let (bgcs, errors) = build_bgcs(rows, &labels);
        if !errors.is_empty() {
            for (idx, reason) in &errors {
                warn!("domain annotation row {idx}: {reason}");
            }
            let fraction = errors.len() as f64 / row_count.max(1) as f64;
            if fraction > config.max_malformed_fraction {
                bail!(
                    "{} of {} annotation rows malformed ({:.1}%), exceeds --max-malformed-fraction {:.1}%",
                    errors.len(),
                    row_count,
                    fraction * 100.0,
                    config.max_malformed_fraction * 100.0
                );
            }
        }

        let total_bgcs = bgcs.len();
        let with_domains: Vec<Bgc> = bgcs.into_iter().filter(Bgc::has_domains).collect();
        let dropped = total_bgcs - with_domains.len();
        if dropped > 0 {
            info!("{dropped} BGC(s) excluded from the pair universe (no predicted domains)");
        }
        if with_domains.is_empty() {
            bail!("no BGCs with predicted domains in corpus");
        }
        if with_domains.len() == 1 {
            bail!("corpus has exactly one BGC with predicted domains, no pairs to compute");
        }

        let anchors = match &config.anchors {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("opening anchor file {}", path.display()))?;
                AnchorSet::from_reader(BufReader::new(file))?
            }
            None => AnchorSet::empty(),
        };

        let oracle: Box<dyn SimilarityOracle> = match config.strategy {
            Strategy::ArchitectureOnly => Box::new(UnavailableOracle),
            Strategy::PrecomputedMsa => {
                let path = config
                    .similarity_table
                    .as_ref()
                    .expect("Config::from_args enforces similarity_table for precomputed-msa");
                Box::new(read_similarity_table(path)?)
            }
            Strategy::PairwiseOnTheFly => {
                let file = File::open(&config.genes).with_context(|| format!("opening gene FASTA {}", config.genes.display()))?;
                let (genes, malformed_headers) = read_genes(BufReader::new(file))?;
                if malformed_headers > 0 {
                    warn!("{malformed_headers} FASTA header(s) could not be parsed and were skipped");
                }
                let occurrences = with_domains.iter().flat_map(|b| b.domain_multiset.values().flatten());
                let store = SequenceStore::build(&genes, occurrences);
                Box::new(crate::similarity_oracle::PairwiseOracle::new(std::sync::Arc::new(store)))
            }
        };

        Ok(Corpus {
            bgcs: with_domains,
            anchors,
            oracle,
        })
    }
}

/// Reads the tabular domain annotation file (§6). Tab-separated, header row
/// required, column names matching [`AnnotationRow`]'s field names.
pub fn read_annotation_table(path: &Path) -> Result<Vec<AnnotationRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .with_context(|| format!("opening domain annotation table {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: AnnotationRow = record.with_context(|| format!("parsing row in {}", path.display()))?;
        rows.push(row);
    }
    Ok(rows)
}

fn read_labels(path: &Path) -> Result<HashMap<String, GroupLabels>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening label table {}", path.display()))?;
    let mut labels = HashMap::new();
    for record in reader.records() {
        let record = record?;
        if record.len() < 3 {
            continue;
        }
        labels.insert(
            record[0].to_string(),
            GroupLabels {
                group: record[1].to_string(),
                class: record[2].to_string(),
            },
        );
    }
    Ok(labels)
}

fn read_similarity_table(path: &Path) -> Result<PrecomputedOracle> {
    let file = File::open(path).with_context(|| format!("opening similarity table {}", path.display()))?;
    let mut oracle = PrecomputedOracle::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = trimmed.split('\t').collect();
        if fields.len() != 4 {
            warn!("skipping malformed similarity table row: {trimmed:?}");
            continue;
        }
        let sim: f64 = fields[2].parse().with_context(|| format!("bad similarity in row {trimmed:?}"))?;
        let length: usize = fields[3].parse().with_context(|| format!("bad length in row {trimmed:?}"))?;
        oracle.insert(fields[0], fields[1], sim, length);
    }
    Ok(oracle)
}
