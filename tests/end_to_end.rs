//! Integration tests driving the full ingest -> scheduler -> emitter pipeline
//! through real files, reproducing the concrete scenarios from SPEC_FULL.md
//! §8 end to end rather than against in-memory fixtures.

use std::fs;
use std::io::Write;

use bgc_netdist::config::{Args, Config};
use bgc_netdist::corpus::Corpus;
use bgc_netdist::{network, scheduler};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn base_args(domains: &std::path::Path, genes: &std::path::Path, dir: &std::path::Path) -> Args {
    Args {
        domains: domains.to_path_buf(),
        genes: genes.to_path_buf(),
        labels: None,
        anchors: None,
        similarity_table: None,
        strategy: "architecture-only".to_string(),
        weight_jaccard: 0.2,
        weight_dds: 0.75,
        weight_gk: 0.05,
        anchor_weight: 2.0,
        nbhood: 4,
        cutoffs: vec![0.3, 0.5, 0.7],
        include_disconnected: true,
        out_dir: dir.to_path_buf(),
        cores: 1,
        max_malformed_fraction: 0.05,
        quiet: true,
        verbose: false,
    }
}

fn write_annotation(path: &std::path::Path, rows: &[&str]) {
    let mut file = fs::File::create(path).unwrap();
    writeln!(
        file,
        "bgc_name\tfamily_id\tenvelope_start_aa\tenvelope_end_aa\tgene_id\tgene_nt_start\tgene_nt_end\tgene_strand"
    )
    .unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
}

/// S1 + S6: an identical-pair BGC plus a third, domain-less BGC. The
/// domain-less BGC must never appear in the pair universe (no self-pair, no
/// cross pair), and the identical pair's network row carries `inf` similarity.
#[test]
fn architecture_only_pipeline_excludes_empty_bgc_and_flags_identical_pair() {
    let dir = TempDir::new().unwrap();
    let domains_path = dir.path().join("domains.tsv");
    let genes_path = dir.path().join("genes.faa");
    fs::write(&genes_path, "").unwrap();

    write_annotation(
        &domains_path,
        &[
            "A\tPF1\t0\t10\tgA\t0\t300\t+",
            "A\tPF2\t0\t10\tgB\t400\t700\t+",
            "B\tPF1\t0\t10\tgA\t0\t300\t+",
            "B\tPF2\t0\t10\tgB\t400\t700\t+",
            // BGC "empty" deliberately has no rows; it simply never appears.
        ],
    );

    let out_dir = dir.path().join("networks");
    let config = Config::from_args(base_args(&domains_path, &genes_path, &out_dir)).unwrap();
    let corpus = Corpus::load(&config).unwrap();
    assert_eq!(corpus.bgcs.len(), 2);

    let matrix = scheduler::run(&corpus, &config, None);
    assert_eq!(matrix.len(), 1);
    let record = matrix.values().next().unwrap();
    assert_eq!(record.kernel.distance, 0.0);
    assert_eq!(record.kernel.log2_similarity(), f64::INFINITY);

    fs::create_dir_all(&out_dir).unwrap();
    let mut buf = Vec::new();
    network::write_network(&mut buf, &matrix, 1.0, true).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("A\tB"));
    assert!(text.contains("\tinf\t"));
}

/// A corpus with exactly one domain-bearing BGC is a fatal configuration
/// error (SPEC_FULL.md §7): there are no pairs to compute.
#[test]
fn single_bgc_corpus_is_fatal() {
    let dir = TempDir::new().unwrap();
    let domains_path = dir.path().join("domains.tsv");
    let genes_path = dir.path().join("genes.faa");
    fs::write(&genes_path, "").unwrap();
    write_annotation(&domains_path, &["A\tPF1\t0\t10\tgA\t0\t300\t+"]);

    let config = Config::from_args(base_args(&domains_path, &genes_path, dir.path())).unwrap();
    assert!(Corpus::load(&config).is_err());
}

/// Running the scheduler twice on the same corpus produces byte-identical
/// network output (SPEC_FULL.md §8 "Round-trips").
#[test]
fn repeated_runs_are_byte_identical() {
    let dir = TempDir::new().unwrap();
    let domains_path = dir.path().join("domains.tsv");
    let genes_path = dir.path().join("genes.faa");
    fs::write(&genes_path, "").unwrap();
    write_annotation(
        &domains_path,
        &[
            "A\tPF1\t0\t10\tgA\t0\t300\t+",
            "A\tPF2\t0\t10\tgB\t400\t700\t+",
            "B\tPF1\t0\t10\tgA\t0\t300\t+",
            "C\tPF3\t0\t10\tgC\t0\t300\t+",
            "C\tPF2\t0\t10\tgD\t400\t700\t+",
        ],
    );

    let config = Config::from_args(base_args(&domains_path, &genes_path, dir.path())).unwrap();
    let corpus = Corpus::load(&config).unwrap();

    let first = scheduler::run(&corpus, &config, None);
    let second = scheduler::run(&corpus, &config, None);

    let mut buf_a = Vec::new();
    let mut buf_b = Vec::new();
    network::write_network(&mut buf_a, &first, 0.3, false).unwrap();
    network::write_network(&mut buf_b, &second, 0.3, false).unwrap();
    assert_eq!(buf_a, buf_b);
}

/// The pairwise-on-the-fly strategy, run through the full FASTA + annotation
/// ingest path, must agree with the architecture-only distance's family
/// bookkeeping (same Jaccard/GK; DDS differs since it now sees sequences).
#[test]
fn pairwise_on_the_fly_pipeline_runs_through_real_fasta() {
    let dir = TempDir::new().unwrap();
    let domains_path = dir.path().join("domains.tsv");
    let genes_path = dir.path().join("genes.faa");

    write_annotation(
        &domains_path,
        &[
            "A\tPF1\t0\t4\tgA\t0\t300\t+",
            "B\tPF1\t0\t4\tgA\t0\t300\t+",
        ],
    );
    let mut genes_file = fs::File::create(&genes_path).unwrap();
    writeln!(genes_file, ">A_ORF1:gid:gA:pid:pA:loc:0:300:strand:+\nACDEFGHIK").unwrap();
    writeln!(genes_file, ">B_ORF1:gid:gA:pid:pB:loc:0:300:strand:+\nACDEFGHIK").unwrap();

    let mut args = base_args(&domains_path, &genes_path, dir.path());
    args.strategy = "pairwise-on-the-fly".to_string();
    let config = Config::from_args(args).unwrap();
    let corpus = Corpus::load(&config).unwrap();

    let matrix = scheduler::run(&corpus, &config, None);
    let record = matrix.values().next().unwrap();
    assert!((record.kernel.jaccard - 1.0).abs() < 1e-9);
    assert!((record.kernel.dds - 1.0).abs() < 1e-9, "identical sequences should be fully similar");
}
