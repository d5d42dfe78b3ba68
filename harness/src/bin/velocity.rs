//! velocity: encrypted evaluation of final = initial + acceleration * time.
//!
//! Generates the three input vectors, runs them through the selected scheme
//! and prints the vectors with the time spent in each phase.

use std::path::PathBuf;

use clap::Parser;
use eyre::{Result, WrapErr, bail};
use tracing_subscriber::EnvFilter;

use harness::report::render_timings;
use harness::{Config, RunReport};
use schemes::{SchemeKind, SecurityLevel};

#[derive(Parser)]
#[command(name = "velocity")]
#[command(about = "Benchmark homomorphic evaluation of v + a*t across BFV, BGV and CKKS")]
#[command(version)]
struct Args {
    /// exact_batched (bfv), modulus_chain (bgv), approximate_real (ckks) or approximate_real_extended
    #[arg(long)]
    scheme: Option<SchemeKind>,

    /// JSON configuration; the preset of the scheme when absent
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of elements per vector
    #[arg(long)]
    elements: Option<usize>,

    /// Seed of the input and encryption randomness
    #[arg(long)]
    seed: Option<u64>,

    /// not_set, classic128, classic192 or classic256
    #[arg(long)]
    security: Option<SecurityLevel>,

    /// Multiplicative depth
    #[arg(long)]
    depth: Option<usize>,

    /// Ring degree, a power of two
    #[arg(long)]
    ring_degree: Option<usize>,

    /// Encode a single value per plaintext
    #[arg(long)]
    no_batching: bool,

    /// Rotation steps to apply to the result, e.g. 1,-2
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    rotations: Option<Vec<i64>>,

    /// Leading elements shown per vector
    #[arg(long)]
    head: Option<usize>,

    /// Trailing elements shown per vector
    #[arg(long)]
    tail: Option<usize>,
}

impl Args {
    fn config(&self) -> Result<Config> {
        let mut config: Config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::preset(self.scheme.unwrap_or(SchemeKind::ExactBatched)),
        };
        if let Some(scheme) = self.scheme {
            config.scheme = scheme;
        }
        if let Some(n) = self.elements {
            config.element_count = Some(n);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(security) = self.security {
            config.security_level = security;
        }
        if let Some(depth) = self.depth {
            config.multiplicative_depth = depth;
        }
        if self.ring_degree.is_some() {
            config.ring_degree = self.ring_degree;
        }
        if self.no_batching {
            config.batching_enabled = false;
        }
        if let Some(rotations) = &self.rotations {
            config.rotations = rotations.clone();
        }
        if let Some(head) = self.head {
            config.head_count = head;
        }
        if let Some(tail) = self.tail {
            config.tail_count = tail;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args: Args = Args::parse();
    let config: Config = args.config().wrap_err("cannot build the run configuration")?;

    let report: RunReport = match harness::run(&config) {
        Ok(report) => report,
        Err(err) => {
            print!("{}", render_timings(&err.timings));
            return Err(err).wrap_err_with(|| format!("{} run aborted", config.scheme));
        }
    };

    print!("{}", report.render(config.head_count, config.tail_count));

    if !report.verification().passed() {
        bail!(
            "{} results differ from the plaintext evaluation in {} of {} values",
            report.scheme(),
            report.verification().mismatches,
            report.verification().checked
        );
    }
    Ok(())
}
