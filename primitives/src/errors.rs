use thiserror::Error;

use crate::consts::MAX_ORDER;

/// Errors arising from scalar-field arithmetic.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FieldError {
    /// The zero element has no multiplicative inverse.
    #[error("cannot invert the zero field element")]
    ZeroInverse,
}

/// Errors related to Fast Fourier Transform (FFT) operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum FftError {
    #[error("scale {0} exceeds the maximum supported two-adic order {MAX_ORDER}")]
    ScaleTooLarge(usize),

    #[error("input length {0} is not a power of two")]
    LengthNotPowerOfTwo(usize),

    #[error("input length {length} exceeds the transform width {max_width}")]
    LengthTooLarge { length: usize, max_width: usize },

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors related to zero-polynomial construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ZeroPolyError {
    #[error("missing index {index} is outside the evaluation domain of width {max_width}")]
    IndexOutOfRange { index: usize, max_width: usize },

    #[error("{missing} missing indices cannot be vanished over a domain of width {max_width}")]
    TooManyMissingIndices { missing: usize, max_width: usize },

    /// The divide-and-conquer product came out with an unexpected degree.
    #[error("zero polynomial has {got} coefficients, expected {expected}")]
    WrongDegree { got: usize, expected: usize },

    #[error(transparent)]
    Fft(#[from] FftError),
}

/// Errors related to recovering a polynomial from partial evaluations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum RecoveryError {
    #[error("got {got} samples, the evaluation domain has width {expected}")]
    SampleCountMismatch { got: usize, expected: usize },

    #[error("{missing} of {width} samples are missing, at most {max_missing} are recoverable")]
    TooManyMissingSamples {
        missing: usize,
        width: usize,
        max_missing: usize,
    },

    /// The recovered vector disagrees with a known sample.
    #[error("recovered evaluation at index {0} disagrees with the known sample")]
    InconsistentRecovery(usize),

    #[error(transparent)]
    ZeroPoly(#[from] ZeroPolyError),

    #[error(transparent)]
    Fft(#[from] FftError),

    #[error(transparent)]
    Field(#[from] FieldError),
}

/// Errors related to Blob operations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BlobError {
    #[error("blob length {0} is not a multiple of 32")]
    InvalidLength(usize),

    #[error("bytes of element {0} exceed the field modulus")]
    NonCanonicalElement(usize),
}

/// Errors related to polynomial form conversions.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PolynomialError {
    #[error("polynomial has no elements")]
    Empty,

    #[error(transparent)]
    Fft(#[from] FftError),
}
