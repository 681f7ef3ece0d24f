use ark_bn254::Fr;
use ark_std::str::FromStr;
use ark_std::{One, Zero};

use crate::arith;
use crate::consts::{MAX_ORDER, PRIMITIVE_ROOTS_OF_UNITY};
use crate::errors::FftError;

/// Looks up the primitive `2^scale`-th root of unity of the scalar field.
pub fn primitive_root_of_unity(scale: usize) -> Result<Fr, FftError> {
    if scale > MAX_ORDER {
        return Err(FftError::ScaleTooLarge(scale));
    }
    let root =
        Fr::from_str(PRIMITIVE_ROOTS_OF_UNITY[scale]).expect("protocol root constants parse");
    Ok(root)
}

/// Transform engine over the order-`2^max_scale` subgroup of roots of unity.
///
/// Holds the expanded root table and its reverse; immutable after
/// construction. Sub-width transforms walk the same table with a larger
/// stride, so one settings value serves every power-of-two domain up to
/// `max_width`.
#[derive(Clone, Debug, PartialEq)]
pub struct FftSettings {
    max_width: usize,
    /// [1, ω, ω², ..., ω^(max_width-1), 1] where ω generates the subgroup.
    expanded_roots_of_unity: Vec<Fr>,
    /// The expanded table reversed: entry i is ω^(-i).
    reverse_roots_of_unity: Vec<Fr>,
}

impl FftSettings {
    pub fn new(max_scale: usize) -> Result<Self, FftError> {
        let root = primitive_root_of_unity(max_scale)?;
        let max_width = 1usize << max_scale;
        let expanded_roots_of_unity = expand_root_of_unity(&root);
        debug_assert_eq!(expanded_roots_of_unity.len(), max_width + 1);
        let reverse_roots_of_unity = expanded_roots_of_unity.iter().rev().copied().collect();
        Ok(Self {
            max_width,
            expanded_roots_of_unity,
            reverse_roots_of_unity,
        })
    }

    /// Builds settings whose full width equals `width`.
    pub fn from_width(width: usize) -> Result<Self, FftError> {
        if width == 0 || !width.is_power_of_two() {
            return Err(FftError::LengthNotPowerOfTwo(width));
        }
        Self::new(width.trailing_zeros() as usize)
    }

    pub fn max_width(&self) -> usize {
        self.max_width
    }

    /// `ω^i` for `i <= max_width`.
    pub fn root_of_unity(&self, i: usize) -> Fr {
        self.expanded_roots_of_unity[i]
    }

    /// Transforms `vals` over the full subgroup, producing `max_width`
    /// outputs. Shorter inputs are zero-padded. With `inverse` set, the
    /// reverse root table is used and outputs are scaled by `n⁻¹`, so that
    /// `fft(fft(x, false), true) == x`.
    pub fn fft(&self, vals: &[Fr], inverse: bool) -> Result<Vec<Fr>, FftError> {
        if vals.is_empty() || !vals.len().is_power_of_two() {
            return Err(FftError::LengthNotPowerOfTwo(vals.len()));
        }
        if vals.len() > self.max_width {
            return Err(FftError::LengthTooLarge {
                length: vals.len(),
                max_width: self.max_width,
            });
        }
        let mut padded = vals.to_vec();
        padded.resize(self.max_width, Fr::zero());
        self.subgroup_fft(&padded, inverse)
    }

    /// Transforms `vals` over the subgroup of order `vals.len()`, walking
    /// the root table with stride `max_width / n`.
    pub(crate) fn subgroup_fft(&self, vals: &[Fr], inverse: bool) -> Result<Vec<Fr>, FftError> {
        let n = vals.len();
        if n == 0 || !n.is_power_of_two() {
            return Err(FftError::LengthNotPowerOfTwo(n));
        }
        if n > self.max_width {
            return Err(FftError::LengthTooLarge {
                length: n,
                max_width: self.max_width,
            });
        }
        let roots_stride = self.max_width / n;
        let mut out = vec![Fr::zero(); n];
        if inverse {
            fft_recurse(
                vals,
                0,
                1,
                &self.reverse_roots_of_unity,
                roots_stride,
                &mut out,
            );
            let inv_len = arith::inverse(&Fr::from(n as u64))?;
            for value in out.iter_mut() {
                *value *= inv_len;
            }
        } else {
            fft_recurse(
                vals,
                0,
                1,
                &self.expanded_roots_of_unity,
                roots_stride,
                &mut out,
            );
        }
        Ok(out)
    }

    /// Evaluates `p(shift·x)` over the full subgroup: coefficient `i` is
    /// scaled by `shift^i` before the forward transform.
    pub fn coset_fft(&self, coeffs: &[Fr], shift: &Fr) -> Result<Vec<Fr>, FftError> {
        let mut shifted = coeffs.to_vec();
        scale_coefficients(&mut shifted, shift);
        self.fft(&shifted, false)
    }

    /// Interpolates evaluations taken over the `shift`-coset back to the
    /// coefficients of `p(x)`.
    pub fn coset_ifft(&self, evals: &[Fr], shift: &Fr) -> Result<Vec<Fr>, FftError> {
        let mut coeffs = self.fft(evals, true)?;
        let shift_inv = arith::inverse(shift)?;
        scale_coefficients(&mut coeffs, &shift_inv);
        Ok(coeffs)
    }

    /// Multiplies two coefficient-form polynomials by convolution in the
    /// evaluation domain. The convolution runs over the subgroup of order
    /// `next_power_of_two(deg_a + deg_b + 1)`.
    pub fn mul_polys(&self, a: &[Fr], b: &[Fr]) -> Result<Vec<Fr>, FftError> {
        if a.is_empty() || b.is_empty() {
            return Ok(Vec::new());
        }
        let result_len = a.len() + b.len() - 1;
        let width = result_len.next_power_of_two();
        if width > self.max_width {
            return Err(FftError::LengthTooLarge {
                length: width,
                max_width: self.max_width,
            });
        }
        let mut padded_a = a.to_vec();
        padded_a.resize(width, Fr::zero());
        let mut padded_b = b.to_vec();
        padded_b.resize(width, Fr::zero());

        let evals_a = self.subgroup_fft(&padded_a, false)?;
        let evals_b = self.subgroup_fft(&padded_b, false)?;
        let product: Vec<Fr> = evals_a
            .iter()
            .zip(&evals_b)
            .map(|(x, y)| *x * y)
            .collect();
        let mut coeffs = self.subgroup_fft(&product, true)?;
        coeffs.truncate(result_len);
        Ok(coeffs)
    }
}

/// Multiplies coefficient `i` by `factor^i` in place.
fn scale_coefficients(coeffs: &mut [Fr], factor: &Fr) {
    let mut scale = Fr::one();
    for coeff in coeffs.iter_mut() {
        *coeff *= scale;
        scale *= factor;
    }
}

/// Expands a primitive root into the table [1, ω, ω², ..., 1]. The table
/// cycles back to one, so its length is the subgroup order plus one.
fn expand_root_of_unity(root: &Fr) -> Vec<Fr> {
    let mut roots = vec![Fr::one()];
    roots.push(*root);
    let mut i = 1;
    while !roots[i].is_one() {
        let next = roots[i] * root;
        i += 1;
        roots.push(next);
    }
    roots
}

/// Radix-2 Cooley–Tukey butterfly. Each level halves the output and doubles
/// both the value stride and the root-table stride, so twiddles at a level
/// of width `n` are read at stride `max_width / n`.
fn fft_recurse(
    vals: &[Fr],
    offset: usize,
    stride: usize,
    roots: &[Fr],
    roots_stride: usize,
    out: &mut [Fr],
) {
    let n = out.len();
    if n <= 4 {
        simple_dft(vals, offset, stride, roots, roots_stride, out);
        return;
    }
    let half = n / 2;
    let (evens, odds) = out.split_at_mut(half);
    fft_recurse(vals, offset, stride * 2, roots, roots_stride * 2, evens);
    fft_recurse(
        vals,
        offset + stride,
        stride * 2,
        roots,
        roots_stride * 2,
        odds,
    );
    for i in 0..half {
        let y_times_root = odds[i] * roots[i * roots_stride];
        odds[i] = evens[i] - y_times_root;
        evens[i] += y_times_root;
    }
}

/// Quadratic base case for small widths.
fn simple_dft(
    vals: &[Fr],
    offset: usize,
    stride: usize,
    roots: &[Fr],
    roots_stride: usize,
    out: &mut [Fr],
) {
    let n = out.len();
    for (i, out_i) in out.iter_mut().enumerate() {
        let mut sum = Fr::zero();
        for j in 0..n {
            sum += vals[offset + j * stride] * roots[(i * j % n) * roots_stride];
        }
        *out_i = sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_roots_have_expected_order() {
        use ark_ff::Field;
        for scale in 0..=10usize {
            let root = primitive_root_of_unity(scale).unwrap();
            let order = 1u64 << scale;
            assert_eq!(root.pow([order]), Fr::one(), "scale {scale}");
            if scale > 0 {
                assert_ne!(root.pow([order / 2]), Fr::one(), "scale {scale}");
            }
        }
    }

    #[test]
    fn scale_above_max_order_is_rejected() {
        assert_eq!(
            primitive_root_of_unity(MAX_ORDER + 1),
            Err(FftError::ScaleTooLarge(MAX_ORDER + 1))
        );
    }

    #[test]
    fn expanded_table_wraps_to_one() {
        let fs = FftSettings::new(4).unwrap();
        assert_eq!(fs.expanded_roots_of_unity.len(), 17);
        assert_eq!(fs.expanded_roots_of_unity[0], Fr::one());
        assert_eq!(fs.expanded_roots_of_unity[16], Fr::one());
    }

    #[test]
    fn width_two_transform_is_sum_and_difference() {
        let fs = FftSettings::new(1).unwrap();
        let a = Fr::from(7u64);
        let b = Fr::from(3u64);
        let out = fs.fft(&[a, b], false).unwrap();
        assert_eq!(out, vec![a + b, a - b]);
    }

    #[test]
    fn non_power_of_two_input_is_rejected() {
        let fs = FftSettings::new(3).unwrap();
        let vals = vec![Fr::one(); 3];
        assert_eq!(
            fs.fft(&vals, false),
            Err(FftError::LengthNotPowerOfTwo(3))
        );
    }

    #[test]
    fn oversized_input_is_rejected() {
        let fs = FftSettings::new(2).unwrap();
        let vals = vec![Fr::one(); 8];
        assert_eq!(
            fs.fft(&vals, false),
            Err(FftError::LengthTooLarge {
                length: 8,
                max_width: 4
            })
        );
    }

    #[test]
    fn convolution_matches_schoolbook_product() {
        let fs = FftSettings::new(4).unwrap();
        // (1 + 2x + 3x²)(4 + 5x) = 4 + 13x + 22x² + 15x³
        let a = vec![Fr::from(1u64), Fr::from(2u64), Fr::from(3u64)];
        let b = vec![Fr::from(4u64), Fr::from(5u64)];
        let product = fs.mul_polys(&a, &b).unwrap();
        assert_eq!(
            product,
            vec![
                Fr::from(4u64),
                Fr::from(13u64),
                Fr::from(22u64),
                Fr::from(15u64)
            ]
        );
    }
}
