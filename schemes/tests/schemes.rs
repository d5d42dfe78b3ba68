use schemes::{
    Bfv, Bgv, Ciphertext, Ckks, Error, KeyMaterial, Parameters, Result, Scheme, SchemeKind,
    SecurityLevel,
};
use sampling::source::Source;

const ACCELERATION: [u64; 8] = [1, 2, 3, 2, 1, 2, 1, 2];
const VELOCITY: [u64; 8] = [1, 2, 3, 4, 5, 6, 7, 8];
const TIME: [u64; 8] = [10, 14, 24, 23, 18, 9, 13, 7];
const FINAL: [u64; 8] = [11, 30, 75, 50, 23, 24, 20, 22];

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn small(scheme: SchemeKind, n: usize) -> Parameters {
    Parameters::new(scheme)
        .with_security(SecurityLevel::NotSet)
        .with_ring_degree(n)
        .with_element_count(8)
}

fn encrypt<S: Scheme>(
    scheme: &S,
    keys: &KeyMaterial,
    values: &[S::Value],
    source: &mut Source,
) -> Result<Ciphertext> {
    scheme.encrypt(&keys.public, &scheme.encode(values)?, source)
}

/// Evaluates v + a*t and returns the decoded result.
fn evaluate<S: Scheme>(
    scheme: &S,
    keys: &KeyMaterial,
    a: &[S::Value],
    v: &[S::Value],
    t: &[S::Value],
    source: &mut Source,
) -> Result<Vec<S::Value>> {
    let ct_a: Ciphertext = encrypt(scheme, keys, a, source)?;
    let ct_v: Ciphertext = encrypt(scheme, keys, v, source)?;
    let ct_t: Ciphertext = encrypt(scheme, keys, t, source)?;
    let product: Ciphertext = scheme.multiply(&keys.evaluation, &ct_a, &ct_t)?;
    let (product, ct_v) = scheme.align(product, ct_v)?;
    let sum: Ciphertext = scheme.add(&product, &ct_v)?;
    scheme.decode(&scheme.decrypt(keys, &sum)?)
}

fn assert_close(got: &[f64], want: &[f64]) {
    assert_eq!(got.len(), want.len());
    got.iter().zip(want.iter()).for_each(|(x, y)| {
        assert!(
            (x - y).abs() < 1e-4 * y.abs().max(1.0),
            "got {} want {}",
            x,
            y
        )
    });
}

#[test]
fn exact_schemes() {
    sub_test("test_formula::<Bfv>", || {
        let bfv: Bfv = Bfv::setup(&small(SchemeKind::ExactBatched, 64)).expect("setup");
        test_formula(&bfv)
    });
    sub_test("test_formula::<Bgv>", || {
        let bgv: Bgv = Bgv::setup(&small(SchemeKind::ModulusChain, 64)).expect("setup");
        test_formula(&bgv)
    });
    sub_test("test_formula_depth_two::<Bgv>", || {
        let bgv: Bgv = Bgv::setup(&small(SchemeKind::ModulusChain, 64).with_depth(2)).expect("setup");
        test_formula(&bgv)
    });
    sub_test("test_scalar_encoding::<Bfv>", || {
        test_scalar_encoding::<Bfv>(SchemeKind::ExactBatched)
    });
    sub_test("test_scalar_encoding::<Bgv>", || {
        test_scalar_encoding::<Bgv>(SchemeKind::ModulusChain)
    });
    sub_test("test_rotation::<Bfv>", || {
        test_integer_rotation::<Bfv>(SchemeKind::ExactBatched)
    });
    sub_test("test_rotation::<Bgv>", || {
        test_integer_rotation::<Bgv>(SchemeKind::ModulusChain)
    });
}

fn test_formula<S: Scheme<Value = u64>>(scheme: &S) {
    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = scheme.keygen(&mut source).expect("keygen");
    let got: Vec<u64> = evaluate(scheme, &keys, &ACCELERATION, &VELOCITY, &TIME, &mut source)
        .expect("evaluate");
    assert_eq!(got, FINAL);
}

fn test_scalar_encoding<S: Scheme<Value = u64>>(kind: SchemeKind) {
    let params: Parameters = small(kind, 64).with_batching(false).with_element_count(1);
    let scheme: S = S::setup(&params).expect("setup");
    assert_eq!(scheme.capabilities().slot_count, 1);

    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = scheme.keygen(&mut source).expect("keygen");
    let got: Vec<u64> = evaluate(&scheme, &keys, &[3], &[4], &[24], &mut source).expect("evaluate");
    assert_eq!(got, vec![76]);

    assert!(matches!(scheme.encode(&[1, 2]), Err(Error::Shape { .. })));
}

fn test_integer_rotation<S: Scheme<Value = u64>>(kind: SchemeKind) {
    let n: usize = 64;
    let row: usize = n / 2;
    let params: Parameters = small(kind, n)
        .with_element_count(n)
        .with_rotations(vec![1, -3]);
    let scheme: S = S::setup(&params).expect("setup");
    assert_eq!(scheme.capabilities().row_len(), row);

    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = scheme.keygen(&mut source).expect("keygen");
    assert_eq!(keys.evaluation.galois.len(), 2);

    let values: Vec<u64> = (0..n as u64).collect();
    let ct: Ciphertext = encrypt(&scheme, &keys, &values, &mut source).expect("encrypt");

    [1i64, -3].iter().for_each(|steps| {
        let rotated: Ciphertext = scheme
            .rotate(&keys.evaluation, &ct, *steps)
            .expect("rotate");
        let got: Vec<u64> = scheme
            .decode(&scheme.decrypt(&keys, &rotated).expect("decrypt"))
            .expect("decode");
        let want: Vec<u64> = (0..n)
            .map(|i| {
                let (r, c) = (i / row, i % row);
                (r * row + (c as i64 + steps).rem_euclid(row as i64) as usize) as u64
            })
            .collect();
        assert_eq!(got, want, "steps={}", steps);
    });

    assert!(matches!(
        scheme.rotate(&keys.evaluation, &ct, 2),
        Err(Error::Parameter {
            parameter: "rotations",
            ..
        })
    ));
    let same: Ciphertext = scheme.rotate(&keys.evaluation, &ct, 0).expect("rotate");
    assert_eq!(same.parts, ct.parts);
}

#[test]
fn approximate_scheme() {
    let a: Vec<f64> = vec![1.25, 2.0, 24.5, 0.0, 13.75, 7.1, 0.001, 19.9];
    let v: Vec<f64> = vec![1.0, 49.9, 3.3, 12.0, 0.5, 6.25, 7.0, 25.0];
    let t: Vec<f64> = vec![10.0, 14.5, 29.99, 23.0, 0.18, 9.0, 13.0, 7.75];
    let want: Vec<f64> = (0..8).map(|i| v[i] + a[i] * t[i]).collect();

    sub_test("test_formula::<Ckks>", || {
        let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64)).expect("setup");
        let mut source: Source = Source::new([0u8; 32]);
        let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
        let got: Vec<f64> = evaluate(&ckks, &keys, &a, &v, &t, &mut source).expect("evaluate");
        assert_close(&got, &want);
    });

    sub_test("test_formula_depth_three::<Ckks>", || {
        let ckks: Ckks =
            Ckks::setup(&small(SchemeKind::ApproximateReal, 64).with_depth(3)).expect("setup");
        let mut source: Source = Source::new([1u8; 32]);
        let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
        let got: Vec<f64> = evaluate(&ckks, &keys, &a, &v, &t, &mut source).expect("evaluate");
        assert_close(&got, &want);
    });

    sub_test("test_scalar_encoding::<Ckks>", || {
        let params: Parameters = small(SchemeKind::ApproximateReal, 64)
            .with_batching(false)
            .with_element_count(1);
        let ckks: Ckks = Ckks::setup(&params).expect("setup");
        let mut source: Source = Source::new([0u8; 32]);
        let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
        let got: Vec<f64> =
            evaluate(&ckks, &keys, &[2.5], &[-1.0], &[4.0], &mut source).expect("evaluate");
        assert_close(&got, &[9.0]);
    });

    sub_test("test_rotation::<Ckks>", || {
        let slots: usize = 32;
        let params: Parameters = small(SchemeKind::ApproximateReal, 64)
            .with_element_count(slots)
            .with_rotations(vec![1]);
        let ckks: Ckks = Ckks::setup(&params).expect("setup");
        let mut source: Source = Source::new([0u8; 32]);
        let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");

        let values: Vec<f64> = (0..slots).map(|i| i as f64 * 0.75).collect();
        let ct: Ciphertext = encrypt(&ckks, &keys, &values, &mut source).expect("encrypt");
        let rotated: Ciphertext = ckks.rotate(&keys.evaluation, &ct, 1).expect("rotate");
        let got: Vec<f64> = ckks
            .decode(&ckks.decrypt(&keys, &rotated).expect("decrypt"))
            .expect("decode");
        let want: Vec<f64> = (0..slots).map(|i| values[(i + 1) % slots]).collect();
        assert_close(&got, &want);
    });
}

#[test]
fn fresh_encryptions_decrypt() {
    sub_test("test_round_trip::<Bfv>", || {
        let bfv: Bfv = Bfv::setup(&small(SchemeKind::ExactBatched, 64)).expect("setup");
        test_round_trip(&bfv, &FINAL, |got, want| assert_eq!(got, want))
    });
    sub_test("test_round_trip::<Bgv>", || {
        let bgv: Bgv = Bgv::setup(&small(SchemeKind::ModulusChain, 64)).expect("setup");
        test_round_trip(&bgv, &FINAL, |got, want| assert_eq!(got, want))
    });
    sub_test("test_round_trip::<Ckks>", || {
        let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64)).expect("setup");
        test_round_trip(&ckks, &[0.5, 49.9, 24.0, 0.0, 3.25], assert_close)
    });
}

/// Decrypting a fresh public-key encryption gives back the encoded values.
fn test_round_trip<S: Scheme>(
    scheme: &S,
    values: &[S::Value],
    check: impl Fn(&[S::Value], &[S::Value]),
) {
    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = scheme.keygen(&mut source).expect("keygen");
    let ct: Ciphertext = encrypt(scheme, &keys, values, &mut source).expect("encrypt");
    let got: Vec<S::Value> = scheme
        .decode(&scheme.decrypt(&keys, &ct).expect("decrypt"))
        .expect("decode");
    check(&got, values);
}

#[test]
fn approximate_rotation_at_default_degree() {
    let params: Parameters = Parameters::new(SchemeKind::ApproximateReal)
        .with_element_count(2760)
        .with_rotations(vec![1, -2]);
    let ckks: Ckks = Ckks::setup(&params).expect("setup");
    assert_eq!(ckks.capabilities().ring_degree, 8192);

    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
    let slots: usize = ckks.capabilities().slot_count;
    let values: Vec<f64> = (0..slots).map(|i| (i % 50) as f64 * 0.5).collect();
    let ct: Ciphertext = encrypt(&ckks, &keys, &values, &mut source).expect("encrypt");

    [1i64, -2].iter().for_each(|steps| {
        let rotated: Ciphertext = ckks.rotate(&keys.evaluation, &ct, *steps).expect("rotate");
        let got: Vec<f64> = ckks
            .decode(&ckks.decrypt(&keys, &rotated).expect("decrypt"))
            .expect("decode");
        let want: Vec<f64> = (0..slots)
            .map(|i| values[(i as i64 + steps).rem_euclid(slots as i64) as usize])
            .collect();
        assert_close(&got, &want);
    });
}

#[test]
fn encode_decode_keeps_length() {
    let bfv: Bfv = Bfv::setup(&small(SchemeKind::ExactBatched, 64).with_element_count(64))
        .expect("setup");
    let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64).with_element_count(32))
        .expect("setup");

    [0usize, 1, 7, 31, 64].iter().for_each(|len| {
        let values: Vec<u64> = (0..*len as u64).map(|i| i * 3).collect();
        let pt = bfv.encode(&values).expect("encode");
        assert_eq!(bfv.decode(&pt).expect("decode"), values);
    });

    [1usize, 5, 32].iter().for_each(|len| {
        let values: Vec<f64> = (0..*len).map(|i| i as f64 - 0.5).collect();
        let pt = ckks.encode(&values).expect("encode");
        assert_close(&ckks.decode(&pt).expect("decode"), &values);
    });

    assert!(matches!(
        bfv.encode(&vec![1; 65]),
        Err(Error::Shape {
            expected: 64,
            found: 65,
            ..
        })
    ));
    assert!(matches!(ckks.encode(&vec![1.0; 33]), Err(Error::Shape { .. })));
}

#[test]
fn precision_failures() {
    sub_test("test_chain_exhausted::<Bgv>", || {
        let bgv: Bgv = Bgv::setup(&small(SchemeKind::ModulusChain, 64)).expect("setup");
        test_chain_exhausted(&bgv, &ACCELERATION)
    });
    sub_test("test_chain_exhausted::<Bfv>", || {
        let bfv: Bfv = Bfv::setup(&small(SchemeKind::ExactBatched, 64)).expect("setup");
        test_chain_exhausted(&bfv, &ACCELERATION)
    });
    sub_test("test_chain_exhausted::<Ckks>", || {
        let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64)).expect("setup");
        test_chain_exhausted(&ckks, &[1.0, 2.0])
    });
    sub_test("test_unaligned_operands::<Ckks>", || {
        let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64)).expect("setup");
        let mut source: Source = Source::new([0u8; 32]);
        let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
        let x: Ciphertext = encrypt(&ckks, &keys, &[1.0, 2.0], &mut source).expect("encrypt");
        let product: Ciphertext = ckks.multiply(&keys.evaluation, &x, &x).expect("multiply");
        assert_eq!(product.level(), x.level() - 1);
        assert!(matches!(ckks.add(&product, &x), Err(Error::Precision { .. })));

        let mut scaled: Ciphertext = x.clone();
        scaled.scale *= 2.0;
        assert!(matches!(ckks.add(&scaled, &x), Err(Error::Precision { .. })));
        assert!(matches!(ckks.align(scaled, x), Err(Error::Precision { .. })));
    });
    sub_test("test_value_too_large::<Ckks>", || {
        let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateReal, 64)).expect("setup");
        assert!(matches!(ckks.encode(&[1e12]), Err(Error::Precision { .. })));
        assert!(matches!(ckks.encode(&[f64::NAN]), Err(Error::Precision { .. })));
    });
}

/// A depth-1 context accepts one multiplication and rejects the second.
fn test_chain_exhausted<S: Scheme>(scheme: &S, values: &[S::Value]) {
    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = scheme.keygen(&mut source).expect("keygen");
    let x: Ciphertext = encrypt(scheme, &keys, values, &mut source).expect("encrypt");
    let y: Ciphertext = scheme.multiply(&keys.evaluation, &x, &x).expect("multiply");
    let (y, x) = scheme.align(y, x).expect("align");
    assert_eq!(y.depth, 1);
    assert!(matches!(
        scheme.multiply(&keys.evaluation, &y, &x),
        Err(Error::Precision { .. })
    ));
}

#[test]
fn shape_and_parameter_failures() {
    let bgv: Bgv = Bgv::setup(&small(SchemeKind::ModulusChain, 64)).expect("setup");
    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = bgv.keygen(&mut source).expect("keygen");
    let a: Ciphertext = encrypt(&bgv, &keys, &[1, 2, 3], &mut source).expect("encrypt");
    let b: Ciphertext = encrypt(&bgv, &keys, &[1, 2], &mut source).expect("encrypt");
    assert_eq!(
        bgv.add(&a, &b).map(|_| ()),
        Err(Error::shape("add", 3, 2))
    );
    assert!(matches!(
        bgv.multiply(&keys.evaluation, &a, &b),
        Err(Error::Shape { .. })
    ));

    assert!(matches!(
        Bfv::setup(&Parameters::new(SchemeKind::ApproximateReal)),
        Err(Error::Parameter {
            parameter: "scheme",
            ..
        })
    ));
    assert!(matches!(
        Ckks::setup(&Parameters::new(SchemeKind::ModulusChain)),
        Err(Error::Parameter {
            parameter: "scheme",
            ..
        })
    ));

    let unbatched: Bfv = Bfv::setup(
        &small(SchemeKind::ExactBatched, 64)
            .with_batching(false)
            .with_element_count(1),
    )
    .expect("setup");
    let keys: KeyMaterial = unbatched.keygen(&mut source).expect("keygen");
    let ct: Ciphertext = encrypt(&unbatched, &keys, &[5], &mut source).expect("encrypt");
    assert!(matches!(
        unbatched.rotate(&keys.evaluation, &ct, 1),
        Err(Error::Parameter {
            parameter: "batching",
            ..
        })
    ));
}

#[cfg(not(feature = "extended-precision"))]
#[test]
fn extended_backend_is_unavailable() {
    let err: Error = Ckks::setup(&Parameters::new(SchemeKind::ApproximateRealExtended))
        .expect_err("extended backend without its feature");
    assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[cfg(feature = "extended-precision")]
#[test]
fn extended_backend() {
    let ckks: Ckks = Ckks::setup(&small(SchemeKind::ApproximateRealExtended, 64)).expect("setup");
    let mut source: Source = Source::new([0u8; 32]);
    let keys: KeyMaterial = ckks.keygen(&mut source).expect("keygen");
    let a: Vec<f64> = ACCELERATION.iter().map(|x| *x as f64).collect();
    let v: Vec<f64> = VELOCITY.iter().map(|x| *x as f64).collect();
    let t: Vec<f64> = TIME.iter().map(|x| *x as f64).collect();
    let want: Vec<f64> = FINAL.iter().map(|x| *x as f64).collect();
    let got: Vec<f64> = evaluate(&ckks, &keys, &a, &v, &t, &mut source).expect("evaluate");
    assert_close(&got, &want);
}
