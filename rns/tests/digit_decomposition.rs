use itertools::izip;
use rns::modulus::{ONCE, WordOps};
use rns::poly::Poly;
use rns::ring::Ring;
use sampling::source::Source;

#[test]
fn digit_decomposition() {
    let n: usize = 1 << 4;
    let ring_small: Ring<u64> = Ring::new(n, 65537);
    let ring_large: Ring<u64> = Ring::new(n, 0x1fffffffffe00001);

    sub_test("test_unsigned_digit_decomposition::<base=8, q=65537>", || {
        test_unsigned_digit_decomposition(&ring_small, 8)
    });

    sub_test("test_unsigned_digit_decomposition::<base=20, q=2^61-2^21+1>", || {
        test_unsigned_digit_decomposition(&ring_large, 20)
    });
}

fn sub_test<F: FnOnce()>(name: &str, f: F) {
    println!("Running {}", name);
    f();
}

fn test_unsigned_digit_decomposition(ring: &Ring<u64>, base: usize) {
    let mut a: Poly<u64> = ring.new_poly();
    let mut b: Poly<u64> = ring.new_poly();
    let mut c: Poly<u64> = ring.new_poly();

    let mut source: Source = Source::new([0u8; 32]);
    ring.fill_uniform(&mut source, &mut a);

    let log_q: usize = ring.modulus.q.log2();
    let d: usize = log_q.div_ceil(base);

    (0..d).for_each(|i| {
        ring.a_ith_digit_unsigned_base_scalar_b_into_c(i, &a, &base, &mut b);
        b.0.iter().for_each(|x| assert!(*x < 1 << base));
        ring.a_mul_b_scalar_into_a::<ONCE>(&(1 << (i * base)), &mut b);
        ring.a_add_b_into_b::<ONCE>(&b, &mut c);
    });

    izip!(a.0, c.0).for_each(|(a, c)| assert_eq!(a, c));
}
