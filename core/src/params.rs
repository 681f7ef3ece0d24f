use serde::{Deserialize, Serialize};

use eigenda_primitives::consts::BYTES_PER_FIELD_ELEMENT;

use crate::errors::ParamsError;

/// Payload bytes carried per field-element symbol: one byte of every
/// 32-byte word is the padding byte that keeps the word canonical.
const BYTES_PER_SYMBOL: u64 = (BYTES_PER_FIELD_ELEMENT - 1) as u64;

/// Number of field-element symbols needed to carry a raw payload.
pub fn blob_length_symbols(blob_size_bytes: u64) -> u64 {
    blob_size_bytes.div_ceil(BYTES_PER_SYMBOL)
}

/// Shape of one encoding request: `num_chunks` chunks of `chunk_length`
/// evaluations each. Both sides are powers of two and their product is the
/// padded evaluation-domain width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingParams {
    pub chunk_length: u64,
    pub num_chunks: u64,
}

impl EncodingParams {
    /// Rounds the requested minimums up to powers of two.
    pub fn from_mins(min_chunk_length: u64, min_num_chunks: u64) -> Result<Self, ParamsError> {
        let chunk_length = min_chunk_length
            .max(1)
            .checked_next_power_of_two()
            .ok_or(ParamsError::ParameterOverflow)?;
        let num_chunks = min_num_chunks
            .max(1)
            .checked_next_power_of_two()
            .ok_or(ParamsError::ParameterOverflow)?;
        Ok(EncodingParams {
            chunk_length,
            num_chunks,
        })
    }

    /// Width of the padded evaluation domain.
    pub fn num_evaluations(&self) -> u64 {
        self.chunk_length * self.num_chunks
    }

    /// Checks the parameters against the blob and the SRS the encoder
    /// holds. The evaluation domain must fit below the SRS order and leave
    /// room to extend the degree-`blob_length` data polynomial.
    pub fn validate(&self, blob_length_symbols: u64, srs_order: u64) -> Result<(), ParamsError> {
        if !self.chunk_length.is_power_of_two() || !self.num_chunks.is_power_of_two() {
            return Err(ParamsError::NotPowerOfTwo {
                chunk_length: self.chunk_length,
                num_chunks: self.num_chunks,
            });
        }
        let num_evaluations = self.num_evaluations();
        if num_evaluations >= srs_order {
            return Err(ParamsError::ExceedsSrsOrder {
                num_evaluations,
                srs_order,
            });
        }
        if num_evaluations < 2 * blob_length_symbols {
            return Err(ParamsError::InsufficientEvaluations {
                num_evaluations,
                blob_length: blob_length_symbols,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blob_length_rounds_up_to_whole_symbols() {
        assert_eq!(blob_length_symbols(0), 0);
        assert_eq!(blob_length_symbols(31), 1);
        assert_eq!(blob_length_symbols(32), 2);
        assert_eq!(blob_length_symbols(62), 2);
    }

    #[test]
    fn mins_round_up_to_powers_of_two() {
        let params = EncodingParams::from_mins(3, 17).unwrap();
        assert_eq!(params.chunk_length, 4);
        assert_eq!(params.num_chunks, 32);

        let trivial = EncodingParams::from_mins(0, 0).unwrap();
        assert_eq!(trivial.chunk_length, 1);
        assert_eq!(trivial.num_chunks, 1);
    }

    #[test]
    fn validation_enforces_srs_and_coverage() {
        let params = EncodingParams::from_mins(8, 16).unwrap();
        assert!(params.validate(32, 8192).is_ok());

        assert_eq!(
            params.validate(32, 128),
            Err(ParamsError::ExceedsSrsOrder {
                num_evaluations: 128,
                srs_order: 128
            })
        );

        assert_eq!(
            params.validate(100, 8192),
            Err(ParamsError::InsufficientEvaluations {
                num_evaluations: 128,
                blob_length: 100
            })
        );
    }
}
