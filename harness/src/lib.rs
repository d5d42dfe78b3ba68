pub mod config;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod report;
pub mod timing;

pub use config::{Config, ValueBounds};
pub use error::{ConfigError, PipelineError};
pub use generator::{Inputs, Sample, VectorGenerator};
pub use pipeline::{Outcome, Pipeline, Rotated, State, Verification, Workload};
pub use timing::{Phase, PhaseTimer, PhaseTiming, Timings};

use schemes::{Bfv, Bgv, Ckks, Scheme, SchemeKind};
use tracing::info;

/// Outcome of a run, typed by the value domain of the scheme.
#[derive(Clone, Debug)]
pub enum RunReport {
    Exact(Outcome<u64>),
    Approximate(Outcome<f64>),
}

impl RunReport {
    pub fn scheme(&self) -> SchemeKind {
        match self {
            RunReport::Exact(o) => o.scheme,
            RunReport::Approximate(o) => o.scheme,
        }
    }

    pub fn timings(&self) -> &Timings {
        match self {
            RunReport::Exact(o) => &o.timings,
            RunReport::Approximate(o) => &o.timings,
        }
    }

    pub fn verification(&self) -> &Verification {
        match self {
            RunReport::Exact(o) => &o.verification,
            RunReport::Approximate(o) => &o.verification,
        }
    }

    pub fn render(&self, head: usize, tail: usize) -> String {
        match self {
            RunReport::Exact(o) => report::render_outcome(o, head, tail),
            RunReport::Approximate(o) => report::render_outcome(o, head, tail),
        }
    }
}

/// Runs backend S on workload with the parameters and seed of config.
pub fn run_with<S: Scheme>(
    config: &Config,
    workload: &Workload<S::Value>,
) -> Result<Outcome<S::Value>, PipelineError>
where
    S::Value: Sample,
{
    config.validate().map_err(PipelineError::before_setup)?;
    let mut pipeline: Pipeline = Pipeline::new(
        config.parameters(config.element_count.unwrap_or(1)),
        VectorGenerator::new(config.seed),
    );
    info!(scheme = %config.scheme, seed = ?config.seed, "starting run");
    pipeline.run::<S>(workload)
}

/// Runs the scheme selected by config on generated inputs.
pub fn run(config: &Config) -> Result<RunReport, PipelineError> {
    let element_count: Option<usize> = config.element_count;
    let bounds: ValueBounds = config.value_bounds;
    match config.scheme {
        SchemeKind::ExactBatched => run_with::<Bfv>(
            config,
            &Workload::Generated {
                element_count,
                bounds,
            },
        )
        .map(RunReport::Exact),
        SchemeKind::ModulusChain => run_with::<Bgv>(
            config,
            &Workload::Generated {
                element_count,
                bounds,
            },
        )
        .map(RunReport::Exact),
        SchemeKind::ApproximateReal | SchemeKind::ApproximateRealExtended => run_with::<Ckks>(
            config,
            &Workload::Generated {
                element_count,
                bounds,
            },
        )
        .map(RunReport::Approximate),
    }
}
