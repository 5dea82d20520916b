//! A1: CLI surface and validated run configuration.
//!
//! [`Args`] is the raw `clap` surface; [`Config`] is what the rest of the
//! crate actually consumes, produced by [`Config::from_args`] once the
//! fatal-at-startup checks in SPEC_FULL.md §7 have passed.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use ordered_float::OrderedFloat;

use crate::pair_kernel::Weights;

/// bgc-netdist - all-pairs distance engine for biosynthetic gene cluster
/// similarity networks.
///
/// Reads a domain annotation table and a translated-gene FASTA, computes a
/// composite pairwise distance for every pair of annotated regions, and
/// writes one thresholded network file per similarity cutoff.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Tabular domain annotation file (family_id, envelope coordinates, gene
    /// coordinates, strand)
    #[clap(long = "domains", value_name = "FILE", help_heading = "Input")]
    pub domains: PathBuf,

    /// Translated-gene FASTA matching the domain annotation table
    #[clap(long = "genes", value_name = "FILE", help_heading = "Input")]
    pub genes: PathBuf,

    /// Optional per-BGC group/class labels (TSV: bgc_name, group, class)
    #[clap(long = "labels", value_name = "FILE", help_heading = "Input")]
    pub labels: Option<PathBuf>,

    /// Newline-separated anchor domain family list
    #[clap(long = "anchors", value_name = "FILE", help_heading = "Input")]
    pub anchors: Option<PathBuf>,

    /// Precomputed pairwise similarity table (TSV: key_a, key_b, similarity,
    /// length), required when --strategy=precomputed-msa
    #[clap(long = "similarity-table", value_name = "FILE", help_heading = "Input")]
    pub similarity_table: Option<PathBuf>,

    /// Similarity strategy for the DDS term
    #[clap(
        long = "strategy",
        default_value = "pairwise-on-the-fly",
        value_parser = ["precomputed-msa", "pairwise-on-the-fly", "architecture-only"],
        help_heading = "Distance model"
    )]
    pub strategy: String,

    /// Jaccard term weight
    #[clap(long = "weight-jaccard", default_value = "0.2", help_heading = "Distance model")]
    pub weight_jaccard: f64,

    /// DDS term weight
    #[clap(long = "weight-dds", default_value = "0.75", help_heading = "Distance model")]
    pub weight_dds: f64,

    /// Goodman-Kruskal adjacency term weight
    #[clap(long = "weight-gk", default_value = "0.05", help_heading = "Distance model")]
    pub weight_gk: f64,

    /// Anchor-family DDS boost, must be >= 1
    #[clap(long = "anchor-weight", default_value = "2.0", help_heading = "Distance model")]
    pub anchor_weight: f64,

    /// Goodman-Kruskal adjacency window
    #[clap(long = "nbhood", default_value = "4", help_heading = "Distance model")]
    pub nbhood: usize,

    /// Similarity cutoffs for network emission (0,1]; 1.0 is always included
    #[clap(long = "cutoffs", value_delimiter = ',', default_value = "0.3,0.5,0.7", help_heading = "Output")]
    pub cutoffs: Vec<f64>,

    /// Include disconnected (isolated) nodes in each network file
    #[clap(long = "include-disconnected", help_heading = "Output")]
    pub include_disconnected: bool,

    /// Output directory for network-*.tsv files
    #[clap(long = "out-dir", default_value = ".", value_name = "DIR", help_heading = "Output")]
    pub out_dir: PathBuf,

    /// Worker threads (0 = number of logical cores)
    #[clap(short = 't', long = "cores", default_value = "0", help_heading = "General")]
    pub cores: usize,

    /// Maximum fraction of malformed annotation rows tolerated before abort
    #[clap(long = "max-malformed-fraction", default_value = "0.05", help_heading = "General")]
    pub max_malformed_fraction: f64,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet", help_heading = "General")]
    pub quiet: bool,

    /// Verbose mode (debug-level logging)
    #[clap(short = 'v', long = "verbose", help_heading = "General")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PrecomputedMsa,
    PairwiseOnTheFly,
    ArchitectureOnly,
}

/// Validated, immutable configuration shared by every worker (SPEC_FULL.md §3
/// "Ownership"). Construction is the only place fatal configuration errors
/// (§7) are raised.
#[derive(Debug, Clone)]
pub struct Config {
    pub domains: PathBuf,
    pub genes: PathBuf,
    pub labels: Option<PathBuf>,
    pub anchors: Option<PathBuf>,
    pub similarity_table: Option<PathBuf>,
    pub strategy: Strategy,
    pub weights: Weights,
    pub anchor_weight: f64,
    pub nbhood: usize,
    pub cutoffs: Vec<f64>,
    pub include_disconnected: bool,
    pub out_dir: PathBuf,
    pub cores: usize,
    pub max_malformed_fraction: f64,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        if args.anchor_weight < 1.0 {
            bail!("anchor-weight must be >= 1, got {}", args.anchor_weight);
        }
        if args.weight_jaccard < 0.0 || args.weight_dds < 0.0 || args.weight_gk < 0.0 {
            bail!("composite weights must be non-negative");
        }
        if args.cutoffs.iter().any(|&c| !(0.0..=1.0).contains(&c) || c == 0.0) {
            bail!("cutoffs must lie in (0, 1]");
        }
        if !(0.0..=1.0).contains(&args.max_malformed_fraction) {
            bail!("max-malformed-fraction must lie in [0, 1]");
        }

        let strategy = match args.strategy.as_str() {
            "precomputed-msa" => {
                if args.similarity_table.is_none() {
                    bail!("--strategy=precomputed-msa requires --similarity-table");
                }
                Strategy::PrecomputedMsa
            }
            "pairwise-on-the-fly" => Strategy::PairwiseOnTheFly,
            "architecture-only" => Strategy::ArchitectureOnly,
            other => bail!("unrecognised strategy {other:?}"),
        };

        let mut cutoffs = args.cutoffs.clone();
        if !cutoffs.iter().any(|&c| (c - 1.0).abs() < 1e-12) {
            cutoffs.push(1.0);
        }
        cutoffs.sort_by_key(|&c| OrderedFloat(c));
        cutoffs.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

        let cores = if args.cores == 0 { num_cpus::get() } else { args.cores };

        Ok(Config {
            domains: args.domains,
            genes: args.genes,
            labels: args.labels,
            anchors: args.anchors,
            similarity_table: args.similarity_table,
            strategy,
            weights: Weights {
                jaccard: args.weight_jaccard,
                dds: args.weight_dds,
                gk: args.weight_gk,
            },
            anchor_weight: args.anchor_weight,
            nbhood: args.nbhood,
            cutoffs,
            include_disconnected: args.include_disconnected,
            out_dir: args.out_dir,
            cores,
            max_malformed_fraction: args.max_malformed_fraction,
        })
    }
}
