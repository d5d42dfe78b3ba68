use std::time::{Duration, Instant};

use harness::report::render_vector;
use harness::{
    Config, Inputs, Outcome, Phase, Pipeline, PipelineError, RunReport, State, VectorGenerator,
    Workload,
};
use schemes::{Bfv, Bgv, Ckks, Error, Scheme, SchemeKind, SecurityLevel};

const ACCELERATION: [u64; 8] = [1, 2, 3, 2, 1, 2, 1, 2];
const VELOCITY: [u64; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const TIME: [u64; 8] = [10, 14, 24, 23, 18, 9, 13, 7];
const FINAL: [u64; 8] = [11, 30, 75, 50, 23, 24, 20, 22];

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

/// Preset of scheme on a toy ring, for fast runs.
fn small(scheme: SchemeKind) -> Config {
    Config {
        security_level: SecurityLevel::NotSet,
        ring_degree: Some(64),
        element_count: None,
        seed: Some(0),
        ..Config::preset(scheme)
    }
}

fn fixed_inputs() -> Workload<u64> {
    Workload::Fixed(Inputs::new(
        ACCELERATION.to_vec(),
        VELOCITY.to_vec(),
        TIME.to_vec(),
    ))
}

fn assert_phases(timings: &harness::Timings, phases: &[Phase]) {
    let recorded: Vec<Phase> = timings.iter().map(|t| t.phase).collect();
    assert_eq!(recorded, phases);
}

#[test]
fn exact_formula() {
    sub_test("test_exact_formula::<Bfv>", || {
        test_exact_formula::<Bfv>(SchemeKind::ExactBatched)
    });
    sub_test("test_exact_formula::<Bgv>", || {
        test_exact_formula::<Bgv>(SchemeKind::ModulusChain)
    });
}

fn test_exact_formula<S: Scheme<Value = u64>>(kind: SchemeKind) {
    let outcome: Outcome<u64> =
        harness::run_with::<S>(&small(kind), &fixed_inputs()).expect("run");
    assert_eq!(outcome.scheme, kind);
    assert_eq!(outcome.output, FINAL);
    assert_eq!(outcome.reference, FINAL);
    assert!(outcome.verification.passed());
    assert_eq!(outcome.verification.checked, 8);
    assert_phases(&outcome.timings, &Phase::ALL);
}

#[test]
fn exact_formula_default_parameters() {
    let config: Config = Config {
        seed: Some(3),
        ..Config::exact_batched()
    };
    let outcome: Outcome<u64> = harness::run_with::<Bfv>(&config, &fixed_inputs()).expect("run");
    assert_eq!(outcome.output, FINAL);
    assert!(outcome.capabilities.ring_degree >= 1024);
}

#[test]
fn approximate_real_elements() {
    let config: Config = Config {
        seed: Some(11),
        ..Config::approximate_real()
    };
    let report: RunReport = harness::run(&config).expect("run");
    let RunReport::Approximate(outcome) = report else {
        panic!("approximate_real must produce real values");
    };
    assert_eq!(outcome.output.len(), 2760);
    assert!(outcome.capabilities.slot_count >= 2760);
    assert!(outcome.inputs.acceleration.iter().all(|x| (0.0..25.0).contains(x)));
    assert!(outcome.inputs.initial_velocity.iter().all(|x| (0.0..50.0).contains(x)));
    assert!(outcome.inputs.time.iter().all(|x| (0.0..30.0).contains(x)));
    outcome
        .output
        .iter()
        .zip(outcome.reference.iter())
        .for_each(|(got, want)| {
            assert!(
                (got - want).abs() < 1e-4 * want.abs().max(1.0),
                "got {} want {}",
                got,
                want
            )
        });
    assert!(outcome.verification.passed());
}

#[test]
fn generated_runs_fill_every_slot() {
    sub_test("modulus_chain", || {
        let report: RunReport = harness::run(&small(SchemeKind::ModulusChain)).expect("run");
        let RunReport::Exact(outcome) = report else {
            panic!("modulus_chain must produce integers");
        };
        assert_eq!(outcome.output.len(), outcome.capabilities.slot_count);
        assert_eq!(outcome.output, outcome.reference);
    });
    sub_test("approximate_real", || {
        let report: RunReport = harness::run(&small(SchemeKind::ApproximateReal)).expect("run");
        assert_eq!(report.scheme(), SchemeKind::ApproximateReal);
        assert!(report.verification().passed());
        assert_eq!(report.verification().checked, 32);
    });
}

#[test]
fn rotations_are_verified() {
    let config: Config = Config {
        rotations: vec![1, -3],
        ..small(SchemeKind::ExactBatched)
    };
    let outcome: Outcome<u64> = harness::run_with::<Bfv>(&config, &fixed_inputs()).expect("run");
    assert_eq!(outcome.rotated.len(), 2);
    assert_eq!(outcome.rotated[0].steps, 1);
    assert_eq!(outcome.rotated[0].values[..7], FINAL[1..]);
    assert_eq!(outcome.rotated[1].values[3..], FINAL[..5]);
    assert!(outcome.verification.passed());
    assert_eq!(outcome.verification.checked, 24);

    let config: Config = Config {
        rotations: vec![2],
        ..small(SchemeKind::ApproximateReal)
    };
    let report: RunReport = harness::run(&config).expect("run");
    assert!(report.verification().passed());
}

#[test]
fn approximate_rotations_at_default_parameters() {
    let config: Config = Config {
        seed: Some(11),
        rotations: vec![1],
        ..Config::approximate_real()
    };
    let report: RunReport = harness::run(&config).expect("run");
    let RunReport::Approximate(outcome) = report else {
        panic!("approximate_real must produce real values");
    };
    assert_eq!(outcome.capabilities.ring_degree, 8192);
    assert_eq!(outcome.rotated.len(), 1);
    assert!((outcome.rotated[0].values[0] - outcome.reference[1]).abs() < 1e-3);
    assert!(outcome.verification.passed());
    assert_eq!(outcome.verification.checked, 2 * 2760);
}

#[test]
#[cfg(not(feature = "extended-precision"))]
fn extended_backend_is_unavailable() {
    let err: PipelineError =
        harness::run(&Config::preset(SchemeKind::ApproximateRealExtended)).expect_err("unavailable");
    assert!(matches!(err.source, Error::BackendUnavailable { .. }));
    assert_eq!(err.phase, Phase::ParameterGeneration);
    assert_eq!(err.state, State::Uninitialized);
    assert_phases(&err.timings, &[Phase::ParameterGeneration]);
}

#[test]
#[cfg(feature = "extended-precision")]
fn extended_backend_runs() {
    let report: RunReport = harness::run(&small(SchemeKind::ApproximateRealExtended)).expect("run");
    assert!(report.verification().passed());
}

#[test]
fn mismatched_lengths_fail_before_encryption() {
    let workload: Workload<u64> = Workload::Fixed(Inputs::new(
        ACCELERATION.to_vec(),
        VELOCITY.to_vec(),
        TIME[..7].to_vec(),
    ));
    let config: Config = small(SchemeKind::ExactBatched);
    let mut pipeline: Pipeline = Pipeline::new(config.parameters(8), VectorGenerator::new(Some(0)));
    let err: PipelineError = pipeline.run::<Bfv>(&workload).expect_err("shape");
    assert_eq!(err.source, Error::shape("time", 8, 7));
    assert_eq!(err.phase, Phase::Encryption);
    assert_eq!(err.state, State::KeysReady);
    assert_eq!(pipeline.state(), State::KeysReady);
    assert_phases(
        &err.timings,
        &[Phase::ParameterGeneration, Phase::KeyGeneration, Phase::Encryption],
    );
}

#[test]
fn unencodable_values_fail_in_encryption() {
    [1e30, f64::NAN].iter().for_each(|huge| {
        sub_test(&format!("velocity={}", huge), || {
            let workload: Workload<f64> = Workload::Fixed(Inputs::new(
                vec![1.5, 2.0],
                vec![0.25, *huge],
                vec![2.0, 0.5],
            ));
            let config: Config = small(SchemeKind::ApproximateReal);
            let mut pipeline: Pipeline =
                Pipeline::new(config.parameters(2), VectorGenerator::new(Some(0)));
            let err: PipelineError = pipeline.run::<Ckks>(&workload).expect_err("precision");
            assert!(matches!(err.source, Error::Precision { .. }));
            assert_eq!(err.phase, Phase::Encryption);
            assert_eq!(err.state, State::KeysReady);
            assert_eq!(pipeline.state(), State::KeysReady);
            assert_phases(
                &err.timings,
                &[Phase::ParameterGeneration, Phase::KeyGeneration, Phase::Encryption],
            );
        });
    });
}

#[test]
fn parameter_failures_abort_setup() {
    sub_test("zero_bound", || {
        let mut config: Config = small(SchemeKind::ModulusChain);
        config.value_bounds.acceleration = 0;
        let err: PipelineError = harness::run(&config).expect_err("bounds");
        assert!(matches!(err.source, Error::Parameter { parameter: "value_bounds", .. }));
        assert!(err.timings.is_empty());
    });
    sub_test("too_many_elements", || {
        let config: Config = Config {
            element_count: Some(65),
            ..small(SchemeKind::ExactBatched)
        };
        let err: PipelineError = harness::run(&config).expect_err("slots");
        assert!(matches!(err.source, Error::Parameter { parameter: "element_count", .. }));
        assert_eq!(err.state, State::Uninitialized);
    });
    sub_test("depth_exhausted", || {
        let config: Config = Config {
            multiplicative_depth: 0,
            ..small(SchemeKind::ApproximateReal)
        };
        let err: PipelineError = harness::run(&config).expect_err("depth");
        assert!(matches!(err.source, Error::Parameter { parameter: "depth", .. }));
    });
}

#[test]
fn timings_are_monotonic() {
    let wall: Instant = Instant::now();
    let outcome: Outcome<f64> = harness::run_with::<Ckks>(
        &small(SchemeKind::ApproximateReal),
        &Workload::Fixed(Inputs::new(vec![1.5, 2.0], vec![0.25, 4.0], vec![2.0, 0.5])),
    )
    .expect("run");
    let elapsed: Duration = wall.elapsed();
    assert_phases(&outcome.timings, &Phase::ALL);
    assert!(outcome.timings.iter().all(|t| t.seconds() >= 0.0));
    assert!(outcome.timings.total() <= elapsed);
    assert!((outcome.output[0] - 3.25).abs() < 1e-4);
    assert!((outcome.output[1] - 5.0).abs() < 1e-4);
}

#[test]
fn reports_are_reproducible() {
    let config: Config = small(SchemeKind::ExactBatched);
    let a: RunReport = harness::run(&config).expect("run");
    let b: RunReport = harness::run(&config).expect("run");
    let (RunReport::Exact(a), RunReport::Exact(b)) = (&a, &b) else {
        panic!("exact_batched must produce integers");
    };
    assert_eq!(a.inputs, b.inputs);
    assert_eq!(a.output, b.output);
    assert_eq!(
        render_vector(&a.output, 20, 2, 3),
        render_vector(&b.output, 20, 2, 3)
    );

    let rendered: String = RunReport::Exact(a.clone()).render(20, 2);
    assert!(rendered.starts_with("Starting the velocity calculator with 64 instances."));
    ["Acceleration:", "Initial Velocity:", "Time:", "Final Velocity:", "Times:"]
        .iter()
        .for_each(|title| assert!(rendered.contains(title), "missing {}", title));
    assert_eq!(rendered.matches(" ...,").count(), 4);
    assert_eq!(rendered, RunReport::Exact(a.clone()).render(20, 2));
}
