use ark_bn254::Fr;
use ark_std::Zero;

use crate::consts::BYTES_PER_FIELD_ELEMENT;
use crate::errors::PolynomialError;
use crate::fft::FftSettings;
use crate::helpers;

/// A polynomial in evaluation form over the subgroup of its padded length.
///
/// Evaluations are padded with zeros to the next power of two. Note that
/// padding an evaluation vector changes the underlying polynomial;
/// polynomials, not blobs, are the objects the encoder commits to.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialEvalForm {
    evaluations: Vec<Fr>,
    /// Number of bytes in the blob the polynomial was built from, carried
    /// through form conversions so the blob can be reconstructed with the
    /// same length.
    len_underlying_blob_bytes: usize,
}

impl PolynomialEvalForm {
    pub fn new(evals: Vec<Fr>) -> Result<Self, PolynomialError> {
        if evals.is_empty() {
            return Err(PolynomialError::Empty);
        }
        let len_underlying_blob_bytes = evals.len() * BYTES_PER_FIELD_ELEMENT;
        let mut padded = evals;
        let next_power_of_two = padded.len().next_power_of_two();
        padded.resize(next_power_of_two, Fr::zero());
        Ok(Self {
            evaluations: padded,
            len_underlying_blob_bytes,
        })
    }

    pub fn evaluations(&self) -> &[Fr] {
        &self.evaluations
    }

    /// Length of the padded evaluation vector, always a power of two.
    pub fn len(&self) -> usize {
        self.evaluations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluations.is_empty()
    }

    pub fn len_underlying_blob_bytes(&self) -> usize {
        self.len_underlying_blob_bytes
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        helpers::to_byte_array(&self.evaluations, self.len_underlying_blob_bytes)
    }

    /// Interpolates the evaluations into coefficient form.
    pub fn to_coeff_form(&self) -> Result<PolynomialCoeffForm, PolynomialError> {
        let fs = FftSettings::from_width(self.evaluations.len())?;
        let coeffs = fs.fft(&self.evaluations, true)?;
        Ok(PolynomialCoeffForm {
            coeffs,
            len_underlying_blob_bytes: self.len_underlying_blob_bytes,
        })
    }
}

/// A polynomial in coefficient form, lowest degree first, padded with zeros
/// to the next power of two.
#[derive(Clone, Debug, PartialEq)]
pub struct PolynomialCoeffForm {
    coeffs: Vec<Fr>,
    len_underlying_blob_bytes: usize,
}

impl PolynomialCoeffForm {
    pub fn new(coeffs: Vec<Fr>) -> Result<Self, PolynomialError> {
        if coeffs.is_empty() {
            return Err(PolynomialError::Empty);
        }
        let len_underlying_blob_bytes = coeffs.len() * BYTES_PER_FIELD_ELEMENT;
        let mut padded = coeffs;
        let next_power_of_two = padded.len().next_power_of_two();
        padded.resize(next_power_of_two, Fr::zero());
        Ok(Self {
            coeffs: padded,
            len_underlying_blob_bytes,
        })
    }

    pub fn coeffs(&self) -> &[Fr] {
        &self.coeffs
    }

    /// Length of the padded coefficient vector, always a power of two.
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn len_underlying_blob_bytes(&self) -> usize {
        self.len_underlying_blob_bytes
    }

    pub fn to_bytes_be(&self) -> Vec<u8> {
        helpers::to_byte_array(&self.coeffs, self.len_underlying_blob_bytes)
    }

    /// Evaluates the coefficients over the subgroup of the padded length.
    pub fn to_eval_form(&self) -> Result<PolynomialEvalForm, PolynomialError> {
        let fs = FftSettings::from_width(self.coeffs.len())?;
        let evaluations = fs.fft(&self.coeffs, false)?;
        Ok(PolynomialEvalForm {
            evaluations,
            len_underlying_blob_bytes: self.len_underlying_blob_bytes,
        })
    }
}
