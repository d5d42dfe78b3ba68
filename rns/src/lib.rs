pub mod dft;
pub mod modulus;
pub mod num_bigint;
pub mod poly;
pub mod ring;
