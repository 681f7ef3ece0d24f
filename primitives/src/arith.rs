use ark_bn254::Fr;
use ark_ff::Field;
use ark_std::{One, Zero};

use crate::errors::FieldError;

/// Embeds an unsigned integer into the scalar field.
pub fn from_u64(value: u64) -> Fr {
    Fr::from(value)
}

/// Computes the multiplicative inverse of a field element.
///
/// Fails with [FieldError::ZeroInverse] when the input is zero; every other
/// element of the prime field is invertible.
pub fn inverse(value: &Fr) -> Result<Fr, FieldError> {
    value.inverse().ok_or(FieldError::ZeroInverse)
}

/// Inverts every element of the slice in place using Montgomery's trick:
/// one field inversion plus `3(n-1)` multiplications instead of `n`
/// inversions.
///
/// Fails without modifying the slice if any element is zero.
pub fn batch_inverse(values: &mut [Fr]) -> Result<(), FieldError> {
    // prefix[i] holds the product of values[..i]
    let mut prefix = Vec::with_capacity(values.len());
    let mut acc = Fr::one();
    for value in values.iter() {
        if value.is_zero() {
            return Err(FieldError::ZeroInverse);
        }
        prefix.push(acc);
        acc *= value;
    }

    let mut acc_inv = inverse(&acc)?;
    for i in (0..values.len()).rev() {
        let inv = acc_inv * prefix[i];
        acc_inv *= values[i];
        values[i] = inv;
    }
    Ok(())
}

/// Computes powers of a field element up to a given exponent.
///
/// For a given field element x, computes [1, x, x², x³, ..., x^(count-1)].
pub fn compute_powers(base: &Fr, count: usize) -> Vec<Fr> {
    let mut powers = Vec::with_capacity(count);
    let mut current = Fr::one();
    for _ in 0..count {
        powers.push(current);
        current *= base;
    }
    powers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_of_zero_fails() {
        assert_eq!(inverse(&Fr::zero()), Err(FieldError::ZeroInverse));
    }

    #[test]
    fn inverse_round_trips() {
        let x = from_u64(12345);
        let x_inv = inverse(&x).unwrap();
        assert_eq!(x * x_inv, Fr::one());
    }

    #[test]
    fn batch_inverse_matches_individual_inverses() {
        let mut values: Vec<Fr> = (1u64..=64).map(from_u64).collect();
        let expected: Vec<Fr> = values.iter().map(|v| inverse(v).unwrap()).collect();
        batch_inverse(&mut values).unwrap();
        assert_eq!(values, expected);
    }

    #[test]
    fn batch_inverse_rejects_zero_without_mutating() {
        let mut values = vec![from_u64(3), Fr::zero(), from_u64(5)];
        let original = values.clone();
        assert_eq!(batch_inverse(&mut values), Err(FieldError::ZeroInverse));
        assert_eq!(values, original);
    }

    #[test]
    fn powers_start_at_one() {
        let powers = compute_powers(&from_u64(3), 5);
        assert_eq!(
            powers,
            vec![
                from_u64(1),
                from_u64(3),
                from_u64(9),
                from_u64(27),
                from_u64(81)
            ]
        );
    }
}
