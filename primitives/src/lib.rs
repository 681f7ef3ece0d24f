//! BN254 scalar-field primitives backing the EigenDA dispersal pipeline.
//!
//! The data pipeline goes:
//! > user data -> [blob::Blob] ->
//! > [polynomial::PolynomialCoeffForm]/[polynomial::PolynomialEvalForm] ->
//! > erasure-coded evaluations
//!
//! - User Data: bytes array, meaningful to users (typically a rollup batch)
//! - Blob: bn254 field elements array, obtained from user data by inserting
//!   zeroes every 31 bytes so that every 32-byte word is a canonical element
//! - Polynomial: bn254 field elements array, interpreted as coefficients or
//!   evaluations over a subgroup of roots of unity
//!
//! The interesting machinery lives in [fft::FftSettings] (the transform
//! engine), [zero_poly] (vanishing polynomials over missing evaluation
//! indices) and [recover] (reconstruction of a full evaluation vector from a
//! partial one). The erasure property the pipeline relies on: a polynomial of
//! degree below `width / 2` can be recovered from any `width / 2` of its
//! `width` evaluations.

pub mod arith;
pub mod blob;
pub mod consts;
pub mod errors;
pub mod fft;
pub mod helpers;
pub mod polynomial;
pub mod recover;
pub mod zero_poly;
