//! A3: minimal reader for the translated-gene FASTA format documented in
//! SPEC_FULL.md §6.
//!
//! This is deliberately not a general-purpose FASTA library: it understands
//! exactly one header convention
//! (`<bgc>_ORF<k>:gid:<gene>:pid:<protein>:loc:<start>:<end>:strand:<+/->`)
//! and hands back normalised amino-acid sequences keyed by gene. Anything
//! fancier (GenBank, multi-format detection) is out of scope per §1.

use std::io::BufRead;

use anyhow::{bail, Context, Result};

/// One translated gene record parsed from a FASTA entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRecord {
    pub bgc_name: String,
    pub gene_id: String,
    pub protein_id: String,
    pub start: u32,
    pub end: u32,
    pub reverse_strand: bool,
    pub sequence: String,
}

/// Normalise one amino acid residue: anything outside the 20 standard codes
/// becomes `X`, except selenocysteine (`U`) which is folded to `C`.
fn normalise_residue(c: char) -> char {
    const STANDARD: &str = "ACDEFGHIKLMNPQRSTVWY";
    let upper = c.to_ascii_uppercase();
    if upper == 'U' {
        'C'
    } else if STANDARD.contains(upper) {
        upper
    } else {
        'X'
    }
}

fn normalise_sequence(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).map(normalise_residue).collect()
}

fn parse_header(header: &str) -> Result<(String, String, String, u32, u32, bool)> {
    let fields: Vec<&str> = header.split(':').collect();
    if fields.len() != 10 || fields[1] != "gid" || fields[3] != "pid" || fields[5] != "loc" || fields[8] != "strand" {
        bail!("malformed FASTA header: {header:?}");
    }
    let bgc_name = fields[0]
        .rfind("_ORF")
        .map(|pos| fields[0][..pos].to_string())
        .with_context(|| format!("header {header:?} missing _ORF<k> suffix"))?;
    let gene_id = fields[2].to_string();
    let protein_id = fields[4].to_string();
    let start: u32 = fields[6].parse().with_context(|| format!("bad start in {header:?}"))?;
    let end: u32 = fields[7].parse().with_context(|| format!("bad end in {header:?}"))?;
    let reverse_strand = match fields[9] {
        "+" => false,
        "-" => true,
        other => bail!("unrecognised strand {other:?} in {header:?}"),
    };
    Ok((bgc_name, gene_id, protein_id, start, end, reverse_strand))
}

/// Read all gene records from a translated-gene FASTA stream.
///
/// Malformed headers are skipped with a warning; the caller decides whether
/// the overall malformed-row budget (§7) has been exceeded.
pub fn read_genes(reader: impl BufRead) -> Result<(Vec<GeneRecord>, usize)> {
    let mut records = Vec::new();
    let mut malformed = 0usize;
    let mut current: Option<(String, String, String, u32, u32, bool)> = None;
    let mut seq = String::new();

    let flush = |current: &mut Option<(String, String, String, u32, u32, bool)>,
                 seq: &mut String,
                 records: &mut Vec<GeneRecord>| {
        if let Some((bgc_name, gene_id, protein_id, start, end, reverse_strand)) = current.take() {
            records.push(GeneRecord {
                bgc_name,
                gene_id,
                protein_id,
                start,
                end,
                reverse_strand,
                sequence: normalise_sequence(seq),
            });
        }
        seq.clear();
    };

    for line in reader.lines() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            flush(&mut current, &mut seq, &mut records);
            match parse_header(header.trim()) {
                Ok(parsed) => current = Some(parsed),
                Err(_) => {
                    malformed += 1;
                    current = None;
                }
            }
        } else if current.is_some() {
            seq.push_str(line.trim());
        }
    }
    flush(&mut current, &mut seq, &mut records);

    Ok((records, malformed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_well_formed_header() {
        let fasta = ">BGC001_ORF3:gid:geneA:pid:proteinA:loc:120:450:strand:+\nMKT*xACDE\n";
        let (records, malformed) = read_genes(Cursor::new(fasta)).unwrap();
        assert_eq!(malformed, 0);
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.bgc_name, "BGC001");
        assert_eq!(rec.gene_id, "geneA");
        assert_eq!(rec.start, 120);
        assert_eq!(rec.end, 450);
        assert!(!rec.reverse_strand);
        assert_eq!(rec.sequence, "MKTXXACDE");
    }

    #[test]
    fn reverse_strand_parsed() {
        let fasta = ">BGC002_ORF1:gid:geneB:pid:proteinB:loc:0:9:strand:-\nACDEFGHIK\n";
        let (records, _) = read_genes(Cursor::new(fasta)).unwrap();
        assert!(records[0].reverse_strand);
    }

    #[test]
    fn malformed_header_skipped_not_fatal() {
        let fasta = ">not-a-valid-header\nACDE\n>BGC003_ORF1:gid:geneC:pid:p:loc:0:4:strand:+\nACDE\n";
        let (records, malformed) = read_genes(Cursor::new(fasta)).unwrap();
        assert_eq!(malformed, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn selenocysteine_folds_to_cysteine() {
        let fasta = ">BGC004_ORF1:gid:geneD:pid:p:loc:0:3:strand:+\nACU\n";
        let (records, _) = read_genes(Cursor::new(fasta)).unwrap();
        assert_eq!(records[0].sequence, "ACC");
    }
}
