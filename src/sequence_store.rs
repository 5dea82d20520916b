//! C2: sequence store.
//!
//! Holds, for every domain occurrence, the amino-acid substring spanning its
//! HMM envelope within the parent gene's translated sequence.

use std::collections::HashMap;

use log::warn;

use crate::domain_index::Occurrence;
use crate::fasta::GeneRecord;

/// Maps occurrence_key -> amino-acid substring.
#[derive(Debug, Default)]
pub struct SequenceStore {
    sequences: HashMap<String, String>,
}

impl SequenceStore {
    /// Build the store from parsed gene records and the occurrences that need
    /// slicing out of them. Occurrences whose parent gene is missing from
    /// `genes`, or whose envelope falls outside the gene's translated
    /// sequence, are skipped with a warning (they simply remain absent from
    /// the store; the oracle treats a missing key as "undefined").
    pub fn build<'a>(genes: &[GeneRecord], occurrences: impl IntoIterator<Item = &'a Occurrence>) -> Self {
        let mut by_gene: HashMap<(&str, &str), &GeneRecord> = HashMap::new();
        for gene in genes {
            by_gene.insert((gene.bgc_name.as_str(), gene.gene_id.as_str()), gene);
        }

        let mut sequences = HashMap::new();
        for occ in occurrences {
            let Some(gene) = by_gene.get(&(occ.bgc_name.as_str(), occ.gene_id.as_str())) else {
                warn!(
                    "sequence store: no FASTA record for gene {} in BGC {}, occurrence {} is sequence-less",
                    occ.gene_id, occ.bgc_name, occ.occurrence_key
                );
                continue;
            };
            let start = occ.envelope_start as usize;
            let end = occ.envelope_end as usize;
            if end > gene.sequence.len() || start > end {
                warn!(
                    "sequence store: envelope [{start}, {end}) out of range for gene {} (len {}), occurrence {}",
                    occ.gene_id,
                    gene.sequence.len(),
                    occ.occurrence_key
                );
                continue;
            }
            sequences.insert(occ.occurrence_key.clone(), gene.sequence[start..end].to_string());
        }

        Self { sequences }
    }

    pub fn get(&self, occurrence_key: &str) -> Option<&str> {
        self.sequences.get(occurrence_key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
