use eigenda_primitives::blob::Blob;
use eigenda_primitives::consts::BYTES_PER_FIELD_ELEMENT;
use eigenda_primitives::errors::BlobError;

const PAYLOAD: &[u8] = b"The dispersal batcher pulls pending blobs, erasure-codes each one per \
quorum against the operator set at a fixed reference block, and assembles a batch once enough \
encoded bytes accumulate or the timer fires.";

#[test]
fn raw_data_round_trips_through_padding() {
    let blob = Blob::from_raw_data(PAYLOAD);
    assert!(blob.len() > PAYLOAD.len());
    assert_eq!(blob.to_raw_data(), PAYLOAD);
}

#[test]
fn padded_words_are_canonical() {
    let blob = Blob::from_raw_data(PAYLOAD);
    let whole_words = blob.len() / BYTES_PER_FIELD_ELEMENT * BYTES_PER_FIELD_ELEMENT;
    assert!(Blob::new(&blob.data()[..whole_words]).is_ok());
}

#[test]
fn new_rejects_oversized_words() {
    let word = [0xffu8; BYTES_PER_FIELD_ELEMENT];
    assert_eq!(Blob::new(&word), Err(BlobError::NonCanonicalElement(0)));
}

#[test]
fn polynomial_forms_round_trip() {
    let blob = Blob::from_raw_data(PAYLOAD);
    let coeff_form = blob.to_polynomial_coeff_form().unwrap();
    let eval_form = coeff_form.to_eval_form().unwrap();
    let coeff_back = eval_form.to_coeff_form().unwrap();

    assert_eq!(coeff_back.coeffs(), coeff_form.coeffs());
    assert_eq!(
        &coeff_back.to_bytes_be()[..blob.len()],
        blob.data(),
        "bytes survive a coefficient/evaluation round trip"
    );
}

#[test]
fn coefficients_are_padded_to_a_power_of_two() {
    let blob = Blob::from_raw_data(&[1u8; 95]);
    let poly = blob.to_polynomial_coeff_form().unwrap();
    assert!(poly.len().is_power_of_two());
    assert!(poly.len() >= blob.len() / BYTES_PER_FIELD_ELEMENT);
}
