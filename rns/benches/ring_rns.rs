use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rns::modulus::ONCE;
use rns::modulus::prime::NTTFriendlyPrimesGenerator;
use rns::poly::{Poly, PolyRNS};
use rns::ring::RingRNS;
use sampling::source::Source;

const N: usize = 8192;
const PLAIN_MODULUS: u64 = 65537;

/// Ciphertext primes followed by the key switching prime, as resolved at
/// depth 1 for each scheme.
fn chains() -> Vec<(&'static str, RingRNS<u64>)> {
    let two_n: u64 = 2 * N as u64;
    let exact: Vec<u64> = NTTFriendlyPrimesGenerator::<u64>::new(60, two_n)
        .next_alternating_primes(3)
        .expect("60-bit primes");
    let chain: Vec<u64> = NTTFriendlyPrimesGenerator::<u64>::new(60, two_n * PLAIN_MODULUS)
        .next_alternating_primes(3)
        .expect("60-bit primes = 1 mod 2N*t");
    let mut approximate: Vec<u64> = NTTFriendlyPrimesGenerator::<u64>::new(60, two_n)
        .next_alternating_primes(2)
        .expect("60-bit primes");
    approximate.insert(
        1,
        NTTFriendlyPrimesGenerator::<u64>::new(40, two_n)
            .next_alternating_prime()
            .expect("40-bit prime"),
    );
    vec![
        ("exact_batched", RingRNS::new(N, &exact)),
        ("modulus_chain", RingRNS::new(N, &chain)),
        ("approximate_real", RingRNS::new(N, &approximate)),
    ]
}

fn uniform(r: &RingRNS<u64>, seed: u8) -> PolyRNS<u64> {
    let mut source: Source = Source::new([seed; 32]);
    let mut a: PolyRNS<u64> = r.new_polyrns();
    r.fill_uniform(&mut source, &mut a);
    a
}

fn ntt_round_trip(c: &mut Criterion) {
    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("ntt_round_trip");
    for (name, r) in chains() {
        let mut a: PolyRNS<u64> = uniform(&r, 0);
        let id: BenchmarkId = BenchmarkId::new(name, format!("n={}/level={}", N, r.level()));
        b.bench_function(id, |b| {
            b.iter(|| {
                r.ntt_inplace::<false>(&mut a);
                r.intt_inplace::<false>(&mut a);
            })
        });
    }
}

fn mul_montgomery(c: &mut Criterion) {
    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("mul_montgomery");
    for (name, r) in chains() {
        let a: PolyRNS<u64> = uniform(&r, 1);
        let mut k: PolyRNS<u64> = uniform(&r, 2);
        r.a_prepare_montgomery_into_a::<ONCE>(&mut k);
        let mut acc: PolyRNS<u64> = r.new_polyrns();
        let id: BenchmarkId = BenchmarkId::new(name, format!("n={}/level={}", N, r.level()));
        b.bench_function(id, |b| {
            b.iter(|| r.a_mul_b_montgomery_add_c_into_c::<ONCE, ONCE>(&a, &k, &mut acc))
        });
    }
}

/// Base 2^20 digits of every residue, as taken by one key switch.
fn gadget_digits(c: &mut Criterion) {
    let base_log: usize = 20;
    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("gadget_digits");
    for (name, r) in chains() {
        let a: PolyRNS<u64> = uniform(&r, 3);
        let mut digit: Poly<u64> = r.new_poly();
        b.bench_function(BenchmarkId::new(name, format!("n={}", N)), |b| {
            b.iter(|| {
                r.0.iter().enumerate().for_each(|(i, r_i)| {
                    (0..r_i.modulus.q.ilog2().div_ceil(base_log as u32) as usize).for_each(|j| {
                        r_i.a_ith_digit_unsigned_base_scalar_b_into_c(j, a.at(i), &base_log, &mut digit)
                    })
                })
            })
        });
    }
}

/// Division by the key switching prime: rounded, or kept modulo t.
fn div_by_last_modulus(c: &mut Criterion) {
    let mut b: criterion::BenchmarkGroup<'_, criterion::measurement::WallTime> =
        c.benchmark_group("div_by_last_modulus");
    for (name, r) in chains() {
        let a: PolyRNS<u64> = uniform(&r, 4);
        let id: BenchmarkId = BenchmarkId::new(name, format!("n={}/level={}", N, r.level()));
        if name == "modulus_chain" {
            b.bench_function(id, |b| {
                b.iter(|| {
                    let mut x: PolyRNS<u64> = a.clone();
                    r.div_by_last_modulus_mod_t_inplace(PLAIN_MODULUS, &mut x);
                })
            });
        } else {
            let mut out: PolyRNS<u64> = r.at_level(r.level() - 1).new_polyrns();
            b.bench_function(id, |b| b.iter(|| r.div_by_last_modulus::<true>(&a, &mut out)));
        }
    }
}

criterion_group!(
    benches,
    ntt_round_trip,
    mul_montgomery,
    gadget_digits,
    div_by_last_modulus
);
criterion_main!(benches);
