use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use bgc_netdist::config::{Args, Config};
use bgc_netdist::corpus::Corpus;
use bgc_netdist::{network, scheduler};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        log::LevelFilter::Warn
    } else if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).init();

    let config = Config::from_args(args)?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.cores)
        .build_global()
        .context("initialising worker pool")?;

    info!("loading corpus: domains={}, genes={}", config.domains.display(), config.genes.display());
    let corpus = Corpus::load(&config)?;
    info!("corpus ready: {} BGCs with predicted domains", corpus.bgcs.len());

    let matrix = scheduler::run(&corpus, &config, None);
    info!("computed {} pairwise distances", matrix.len());

    std::fs::create_dir_all(&config.out_dir).with_context(|| format!("creating output directory {}", config.out_dir.display()))?;

    for &cutoff in &config.cutoffs {
        let path = config.out_dir.join(format!("network-{cutoff:.2}.tsv"));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        network::write_network(&mut writer, &matrix, cutoff, config.include_disconnected)?;
        info!("wrote {}", path.display());
    }

    Ok(())
}
