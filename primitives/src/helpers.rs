use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_std::Zero;
use std::cmp;

use crate::consts::BYTES_PER_FIELD_ELEMENT;
use crate::errors::BlobError;

/// Reserves one zero byte per 32-byte word so that every word of the result
/// is a canonical field element. The output length is a multiple of 32
/// except possibly for a partial trailing word.
pub fn convert_by_padding_empty_byte(data: &[u8]) -> Vec<u8> {
    let parse_size = BYTES_PER_FIELD_ELEMENT - 1;
    let data_len = data.len().div_ceil(parse_size);

    let mut valid_data = vec![0u8; data_len * BYTES_PER_FIELD_ELEMENT];
    let mut valid_end = valid_data.len();

    for i in 0..data_len {
        let start = i * parse_size;
        let mut end = (i + 1) * parse_size;
        if end > data.len() {
            end = data.len();
            valid_end = end - start + 1 + i * BYTES_PER_FIELD_ELEMENT;
        }

        // first byte of each word stays zero
        valid_data[i * BYTES_PER_FIELD_ELEMENT + 1
            ..i * BYTES_PER_FIELD_ELEMENT + 1 + end - start]
            .copy_from_slice(&data[start..end]);
    }

    valid_data.truncate(valid_end);
    valid_data
}

/// Strips the padding byte inserted by [convert_by_padding_empty_byte].
/// Assumes the input is in padded form; no validation is performed.
pub fn remove_empty_byte_from_padded_bytes_unchecked(data: &[u8]) -> Vec<u8> {
    let parse_size = BYTES_PER_FIELD_ELEMENT;
    let data_len = data.len().div_ceil(parse_size);

    let put_size = BYTES_PER_FIELD_ELEMENT - 1;
    let mut valid_data = vec![0u8; data_len * put_size];
    let mut valid_len = valid_data.len();

    for i in 0..data_len {
        let start = i * parse_size + 1; // skip the padding byte
        let mut end = (i + 1) * parse_size;

        if end > data.len() {
            end = data.len();
            valid_len = i * put_size + end - start;
        }

        valid_data[i * put_size..i * put_size + end - start].copy_from_slice(&data[start..end]);
    }

    valid_data.truncate(valid_len);
    valid_data
}

pub fn get_num_element(data_len: usize, symbol_size: usize) -> usize {
    data_len.div_ceil(symbol_size)
}

/// Interprets a big-endian 32-byte word as a field element, reducing
/// modulo the field order.
pub fn set_bytes_canonical(data: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(data)
}

/// Packs the bytes into 32-byte big-endian field elements, zero-padding the
/// final partial word.
pub fn to_fr_array(data: &[u8]) -> Vec<Fr> {
    let num_ele = get_num_element(data.len(), BYTES_PER_FIELD_ELEMENT);
    let mut elements = vec![Fr::zero(); num_ele];

    for (i, element) in elements.iter_mut().enumerate() {
        let start = i * BYTES_PER_FIELD_ELEMENT;
        let end = (i + 1) * BYTES_PER_FIELD_ELEMENT;
        if end > data.len() {
            let mut padded = [0u8; BYTES_PER_FIELD_ELEMENT];
            padded[..data.len() - start].copy_from_slice(&data[start..]);
            *element = set_bytes_canonical(&padded);
        } else {
            *element = set_bytes_canonical(&data[start..end]);
        }
    }
    elements
}

/// Serializes field elements back into big-endian bytes, truncated to
/// `max_data_size`.
pub fn to_byte_array(data_fr: &[Fr], max_data_size: usize) -> Vec<u8> {
    let n = data_fr.len();
    let data_size = cmp::min(n * BYTES_PER_FIELD_ELEMENT, max_data_size);
    let mut data = vec![0u8; data_size];

    for (i, element) in data_fr.iter().enumerate() {
        let bytes = element.into_bigint().to_bytes_be();

        let start = i * BYTES_PER_FIELD_ELEMENT;
        let end = (i + 1) * BYTES_PER_FIELD_ELEMENT;

        if end > max_data_size {
            let slice_end = cmp::min(bytes.len(), max_data_size - start);
            data[start..start + slice_end].copy_from_slice(&bytes[..slice_end]);
            break;
        }

        let actual_end = cmp::min(end, data_size);
        data[start..actual_end].copy_from_slice(&bytes[..actual_end - start]);
    }

    data
}

/// Checks that the data is a whole number of 32-byte words and that every
/// word is strictly below the field modulus.
pub fn validate_blob_data_as_canonical_field_elements(data: &[u8]) -> Result<(), BlobError> {
    if data.len() % BYTES_PER_FIELD_ELEMENT != 0 {
        return Err(BlobError::InvalidLength(data.len()));
    }
    let modulus_bytes = <Fr as PrimeField>::MODULUS.to_bytes_be();
    for (i, word) in data.chunks(BYTES_PER_FIELD_ELEMENT).enumerate() {
        if word >= modulus_bytes.as_slice() {
            return Err(BlobError::NonCanonicalElement(i));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_round_trips() {
        let data: Vec<u8> = (0u8..=200).collect();
        let padded = convert_by_padding_empty_byte(&data);
        for word in padded.chunks(BYTES_PER_FIELD_ELEMENT) {
            assert_eq!(word[0], 0);
        }
        let unpadded = remove_empty_byte_from_padded_bytes_unchecked(&padded);
        assert_eq!(unpadded, data);
    }

    #[test]
    fn fr_array_round_trips_through_bytes() {
        let data: Vec<u8> = convert_by_padding_empty_byte(b"hello eigenda batcher");
        let elements = to_fr_array(&data);
        let bytes = to_byte_array(&elements, data.len());
        assert_eq!(bytes, data);
    }

    #[test]
    fn non_canonical_word_is_rejected() {
        let word = [0xffu8; BYTES_PER_FIELD_ELEMENT];
        assert_eq!(
            validate_blob_data_as_canonical_field_elements(&word),
            Err(BlobError::NonCanonicalElement(0))
        );
    }

    #[test]
    fn ragged_length_is_rejected() {
        let data = [0u8; 33];
        assert_eq!(
            validate_blob_data_as_canonical_field_elements(&data),
            Err(BlobError::InvalidLength(33))
        );
    }
}
