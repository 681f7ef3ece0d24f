use ark_bn254::Fr;
use ark_std::{One, Zero};

use crate::errors::ZeroPolyError;
use crate::fft::FftSettings;

/// Largest number of roots multiplied together directly before the
/// convolution ladder takes over.
const LEAF_GROUP_SIZE: usize = 64;

/// A polynomial vanishing exactly on a set of evaluation-domain indices.
#[derive(Clone, Debug, PartialEq)]
pub struct ZeroPolynomial {
    /// Monic coefficients, lowest degree first; length `|missing| + 1`.
    pub coeffs: Vec<Fr>,
    /// Evaluations over the full subgroup, zero exactly at the missing
    /// indices.
    pub evals: Vec<Fr>,
}

/// Builds `Z(x) = ∏_{i ∈ missing} (x − ω^i)` where ω generates the full
/// subgroup of `fs`.
///
/// The missing set is partitioned into groups of at most [LEAF_GROUP_SIZE]
/// roots; each group is multiplied out directly, and the partial products
/// are then reduced pairwise, leaf-first, through evaluation-domain
/// convolution with the domain doubling as degrees grow.
///
/// An empty missing set yields the constant-one polynomial. The missing set
/// must leave at least one domain index standing: a polynomial vanishing on
/// the whole subgroup cannot coexist with a nonzero quotient.
pub fn zero_poly_via_multiplication(
    fs: &FftSettings,
    missing_indices: &[usize],
) -> Result<ZeroPolynomial, ZeroPolyError> {
    let max_width = fs.max_width();
    if missing_indices.is_empty() {
        return Ok(ZeroPolynomial {
            coeffs: vec![Fr::one()],
            evals: vec![Fr::one(); max_width],
        });
    }
    for &index in missing_indices {
        if index >= max_width {
            return Err(ZeroPolyError::IndexOutOfRange { index, max_width });
        }
    }
    if missing_indices.len() >= max_width {
        return Err(ZeroPolyError::TooManyMissingIndices {
            missing: missing_indices.len(),
            max_width,
        });
    }

    let mut layer: Vec<Vec<Fr>> = missing_indices
        .chunks(LEAF_GROUP_SIZE)
        .map(|group| leaf_poly(fs, group))
        .collect();

    // Pairwise reduction, leaf-first, so intermediate degrees stay balanced.
    while layer.len() > 1 {
        let mut next = Vec::with_capacity(layer.len().div_ceil(2));
        for pair in layer.chunks(2) {
            match pair {
                [a, b] => next.push(fs.mul_polys(a, b)?),
                [a] => next.push(a.clone()),
                _ => unreachable!("chunks(2) yields one or two entries"),
            }
        }
        layer = next;
    }
    let coeffs = layer.swap_remove(0);

    if coeffs.len() != missing_indices.len() + 1 {
        return Err(ZeroPolyError::WrongDegree {
            got: coeffs.len(),
            expected: missing_indices.len() + 1,
        });
    }

    let mut padded = coeffs.clone();
    padded.resize(max_width, Fr::zero());
    let evals = fs.fft(&padded, false)?;

    Ok(ZeroPolynomial { coeffs, evals })
}

/// Direct product `∏ (x − ω^i)` over one leaf group, lowest degree first.
fn leaf_poly(fs: &FftSettings, indices: &[usize]) -> Vec<Fr> {
    let mut coeffs = vec![Fr::one()];
    for &index in indices {
        let root = fs.root_of_unity(index);
        let mut next = vec![Fr::zero(); coeffs.len() + 1];
        for (k, coeff) in coeffs.iter().enumerate() {
            next[k] -= root * coeff;
            next[k + 1] += *coeff;
        }
        coeffs = next;
    }
    coeffs
}
