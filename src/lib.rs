//! Distance engine for biosynthetic gene cluster (BGC) similarity networks.
//!
//! Given a corpus of annotated genomic regions, computes an all-pairs composite
//! distance (Jaccard + domain-duplication/sequence + Goodman-Kruskal adjacency)
//! and emits thresholded similarity networks.

pub mod anchor;
pub mod assignment;
pub mod config;
pub mod corpus;
pub mod domain_index;
pub mod fasta;
pub mod network;
pub mod pair_kernel;
pub mod pam250;
pub mod scheduler;
pub mod sequence_store;
pub mod similarity_oracle;

pub use config::Config;
pub use corpus::Corpus;
