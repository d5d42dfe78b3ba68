use num_bigint::BigInt;
use num_integer::Integer;
use rns::num_bigint::Div;
use rns::poly::PolyRNS;
use rns::ring::RingRNS;
use sampling::source::Source;

#[test]
fn rescaling_rns_u64() {
    let n: usize = 1 << 10;
    let moduli: Vec<u64> = vec![
        0x1fffffffffe00001u64,
        0x1fffffffffc80001u64,
        0x1fffffffffb40001,
        0x1fffffffff500001,
    ];
    let ring_rns: RingRNS<u64> = RingRNS::new(n, &moduli);

    sub_test("test_div_by_last_modulus::<ROUND:false>", || {
        test_div_by_last_modulus::<false>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus::<ROUND:true>", || {
        test_div_by_last_modulus::<true>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus_inplace::<ROUND:false>", || {
        test_div_by_last_modulus_inplace::<false>(&ring_rns)
    });
    sub_test("test_div_by_last_modulus_inplace::<ROUND:true>", || {
        test_div_by_last_modulus_inplace::<true>(&ring_rns)
    });
    sub_test("test_div_by_last_moduli::<ROUND:false>", || {
        test_div_by_last_moduli(&ring_rns)
    });
    sub_test("test_div_by_last_modulus_mod_t_inplace", || {
        test_div_by_last_modulus_mod_t_inplace(n)
    });
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn to_bigint(ring_rns: &RingRNS<u64>, a: &PolyRNS<u64>) -> Vec<BigInt> {
    let mut coeffs: Vec<BigInt> = vec![BigInt::from(0); a.n()];
    ring_rns.at_level(a.level()).to_bigint_inplace(a, 1, &mut coeffs);
    coeffs
}

fn divide<const ROUND: bool>(coeffs: &mut [BigInt], scalar: &BigInt) {
    coeffs.iter_mut().for_each(|a| {
        if ROUND {
            *a = a.div_round(scalar);
        } else {
            *a = Div::div_floor(a, scalar);
        }
    });
}

fn assert_congruent(a: &[BigInt], b: &[BigInt], modulus: &BigInt) {
    a.iter()
        .zip(b.iter())
        .for_each(|(a, b)| assert_eq!(a.mod_floor(modulus), b.mod_floor(modulus)));
}

fn test_div_by_last_modulus<const ROUND: bool>(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([0u8; 32]);

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    let mut c: PolyRNS<u64> = ring_rns.at_level(ring_rns.level() - 1).new_polyrns();

    ring_rns.fill_uniform(&mut source, &mut a);
    let mut coeffs_a: Vec<BigInt> = to_bigint(ring_rns, &a);

    ring_rns.div_by_last_modulus::<ROUND>(&a, &mut c);

    let coeffs_c: Vec<BigInt> = to_bigint(ring_rns, &c);
    let scalar_big: BigInt = BigInt::from(ring_rns.0[ring_rns.level()].modulus.q);
    divide::<ROUND>(&mut coeffs_a, &scalar_big);

    assert_congruent(&coeffs_a, &coeffs_c, &ring_rns.at_level(c.level()).modulus());
}

fn test_div_by_last_modulus_inplace<const ROUND: bool>(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([1u8; 32]);

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.fill_uniform(&mut source, &mut a);
    let mut coeffs_a: Vec<BigInt> = to_bigint(ring_rns, &a);

    ring_rns.div_by_last_modulus_inplace::<ROUND>(&mut a);
    assert_eq!(a.level(), ring_rns.level() - 1);

    let coeffs_c: Vec<BigInt> = to_bigint(ring_rns, &a);
    let scalar_big: BigInt = BigInt::from(ring_rns.0[ring_rns.level()].modulus.q);
    divide::<ROUND>(&mut coeffs_a, &scalar_big);

    assert_congruent(&coeffs_a, &coeffs_c, &ring_rns.at_level(a.level()).modulus());
}

fn test_div_by_last_moduli(ring_rns: &RingRNS<u64>) {
    let mut source: Source = Source::new([2u8; 32]);
    let nb_moduli: usize = ring_rns.level();

    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    let mut c: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.fill_uniform(&mut source, &mut a);
    let mut coeffs_a: Vec<BigInt> = to_bigint(ring_rns, &a);

    ring_rns.div_by_last_moduli::<false>(nb_moduli, &a, &mut c);
    assert_eq!(c.level(), 0);

    let coeffs_c: Vec<BigInt> = to_bigint(ring_rns, &c);
    let scalar_big: BigInt = ring_rns.modulus() / ring_rns.at_level(0).modulus();
    divide::<false>(&mut coeffs_a, &scalar_big);

    assert_congruent(&coeffs_a, &coeffs_c, &ring_rns.at_level(0).modulus());
}

fn test_div_by_last_modulus_mod_t_inplace(n: usize) {
    let t: u64 = 65537;
    let step: u64 = 2 * n as u64 * t;
    let mut generator = rns::modulus::prime::NTTFriendlyPrimesGenerator::<u64>::new(55, step);
    let moduli: Vec<u64> = generator
        .next_alternating_primes(3)
        .expect("primes = 1 mod 2nt");
    let ring_rns: RingRNS<u64> = RingRNS::new(n, &moduli);

    // small values m + t*e
    let coeffs: Vec<i128> = (0..n as i128)
        .map(|i| (i % t as i128) + t as i128 * (i % 7 - 3))
        .collect();
    let mut a: PolyRNS<u64> = ring_rns.new_polyrns();
    ring_rns.from_signed_inplace(&coeffs, &mut a);

    // q_last = 1 mod t, so the division leaves the residues mod t unchanged
    ring_rns.div_by_last_modulus_mod_t_inplace(t, &mut a);

    let out: Vec<BigInt> = to_bigint(&ring_rns, &a);
    let t_big: BigInt = BigInt::from(t);
    coeffs.iter().zip(out.iter()).for_each(|(c, o)| {
        assert_eq!(BigInt::from(*c).mod_floor(&t_big), o.mod_floor(&t_big));
    });
}
