pub mod batch;
pub mod canonical;
#[cfg(feature = "extended-precision")]
pub mod extended;
