use ark_bn254::Fr;
use ark_ff::FftField;
use ark_std::Zero;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

use crate::arith;
use crate::errors::RecoveryError;
use crate::fft::FftSettings;
use crate::zero_poly::zero_poly_via_multiplication;

/// Reconstructs a full evaluation vector from a partial one.
///
/// `samples` must cover the whole subgroup of `fs`, with `None` marking the
/// missing positions. The returned vector agrees with every known sample,
/// provided the samples are the evaluation form of a polynomial of degree
/// below `max_width / 2` (the redundancy the erasure code provides).
///
/// The construction follows the zero-polynomial method: with
/// `Z(x) = ∏_{i missing} (x − ω^i)` the product `(E·Z)` is known everywhere
/// on the subgroup (missing positions contribute zero), so `P = (E·Z) / Z`
/// can be formed by pointwise division — on a coset, where `Z` has no roots.
pub fn recover_poly_from_samples(
    fs: &FftSettings,
    samples: &[Option<Fr>],
) -> Result<Vec<Fr>, RecoveryError> {
    let width = fs.max_width();
    if samples.len() != width {
        return Err(RecoveryError::SampleCountMismatch {
            got: samples.len(),
            expected: width,
        });
    }

    let missing: Vec<usize> = samples
        .iter()
        .enumerate()
        .filter_map(|(i, sample)| sample.is_none().then_some(i))
        .collect();
    if missing.is_empty() {
        return Ok(samples.iter().copied().flatten().collect());
    }
    if missing.len() > width / 2 {
        return Err(RecoveryError::TooManyMissingSamples {
            missing: missing.len(),
            width,
            max_missing: width / 2,
        });
    }

    let zero_poly = zero_poly_via_multiplication(fs, &missing)?;

    // (E·Z) in evaluation form; unknown positions contribute zero, which is
    // exact there since Z vanishes on them.
    let ez_evals: Vec<Fr> = samples
        .iter()
        .zip(&zero_poly.evals)
        .map(|(sample, z)| match sample {
            Some(value) => *value * z,
            None => Fr::zero(),
        })
        .collect();
    let ez_coeffs = fs.fft(&ez_evals, true)?;

    // Divide on the generator coset, where Z is nowhere zero.
    let shift = Fr::GENERATOR;
    let ez_coset_evals = fs.coset_fft(&ez_coeffs, &shift)?;
    let mut zero_coeffs_padded = zero_poly.coeffs.clone();
    zero_coeffs_padded.resize(width, Fr::zero());
    let mut z_coset_inverses = fs.coset_fft(&zero_coeffs_padded, &shift)?;
    arith::batch_inverse(&mut z_coset_inverses)?;

    let quotient_coset_evals: Vec<Fr> = ez_coset_evals
        .par_iter()
        .zip(z_coset_inverses.par_iter())
        .map(|(ez, z_inv)| *ez * z_inv)
        .collect();

    let coeffs = fs.coset_ifft(&quotient_coset_evals, &shift)?;
    let recovered = fs.fft(&coeffs, false)?;

    for (i, sample) in samples.iter().enumerate() {
        if let Some(known) = sample {
            if recovered[i] != *known {
                return Err(RecoveryError::InconsistentRecovery(i));
            }
        }
    }
    Ok(recovered)
}
