use serde::{Deserialize, Serialize};

use crate::errors::{BlobError, PolynomialError};
use crate::helpers;
use crate::polynomial::{PolynomialCoeffForm, PolynomialEvalForm};

/// A blob aligned with the EigenDA data format: a byte string in which
/// every 32-byte word is a canonical bn254 field element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    blob_data: Vec<u8>,
}

impl Blob {
    /// Creates a new `Blob` from data that is already in padded form.
    /// Validates that the input is a whole number of 32-byte words and that
    /// each word is below the field modulus. For raw client payloads use
    /// [`Blob::from_raw_data`] instead.
    pub fn new(blob_data: &[u8]) -> Result<Self, BlobError> {
        helpers::validate_blob_data_as_canonical_field_elements(blob_data)?;
        Ok(Blob {
            blob_data: blob_data.to_vec(),
        })
    }

    /// Creates a new `Blob` from a raw payload, inserting the padding byte
    /// every 31 bytes so each word is a canonical field element.
    pub fn from_raw_data(data: &[u8]) -> Self {
        Blob {
            blob_data: helpers::convert_by_padding_empty_byte(data),
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.blob_data
    }

    /// Strips the padding bytes, recovering the raw payload.
    pub fn to_raw_data(&self) -> Vec<u8> {
        helpers::remove_empty_byte_from_padded_bytes_unchecked(&self.blob_data)
    }

    pub fn len(&self) -> usize {
        self.blob_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob_data.is_empty()
    }

    /// Interprets the blob words as polynomial coefficients.
    pub fn to_polynomial_coeff_form(&self) -> Result<PolynomialCoeffForm, PolynomialError> {
        PolynomialCoeffForm::new(helpers::to_fr_array(&self.blob_data))
    }

    /// Interprets the blob words as evaluations over the padded subgroup.
    pub fn to_polynomial_eval_form(&self) -> Result<PolynomialEvalForm, PolynomialError> {
        PolynomialEvalForm::new(helpers::to_fr_array(&self.blob_data))
    }
}
