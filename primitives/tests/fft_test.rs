use ark_bn254::Fr;
use ark_ff::FftField;
use ark_poly::univariate::DensePolynomial;
use ark_poly::{DenseUVPolynomial, Polynomial};
use ark_std::{One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use eigenda_primitives::fft::FftSettings;

fn random_vector(len: usize, rng: &mut StdRng) -> Vec<Fr> {
    (0..len).map(|_| Fr::from(rng.gen::<u64>())).collect()
}

#[test]
fn fft_inverse_fft_is_identity() {
    let mut rng = StdRng::seed_from_u64(7);
    for scale in 2..=10usize {
        let fs = FftSettings::new(scale).unwrap();
        let vals = random_vector(fs.max_width(), &mut rng);

        let evals = fs.fft(&vals, false).unwrap();
        let back = fs.fft(&evals, true).unwrap();
        assert_eq!(back, vals, "round trip at scale {scale}");

        // the opposite composition order holds as well
        let coeffs = fs.fft(&vals, true).unwrap();
        let forward = fs.fft(&coeffs, false).unwrap();
        assert_eq!(forward, vals, "inverse-first round trip at scale {scale}");
    }
}

#[test]
fn short_inputs_are_zero_padded() {
    let fs = FftSettings::new(4).unwrap();
    let short = vec![Fr::from(3u64), Fr::from(5u64)];
    let mut padded = short.clone();
    padded.resize(fs.max_width(), Fr::zero());

    assert_eq!(
        fs.fft(&short, false).unwrap(),
        fs.fft(&padded, false).unwrap()
    );
}

#[test]
fn forward_transform_matches_direct_evaluation() {
    let mut rng = StdRng::seed_from_u64(11);
    for scale in [2usize, 4, 6, 8] {
        let fs = FftSettings::new(scale).unwrap();
        let coeffs = random_vector(fs.max_width(), &mut rng);
        let evals = fs.fft(&coeffs, false).unwrap();

        let poly = DensePolynomial::from_coefficients_slice(&coeffs);
        for (i, eval) in evals.iter().enumerate() {
            let point = fs.root_of_unity(i);
            assert_eq!(*eval, poly.evaluate(&point), "scale {scale} index {i}");
        }
    }
}

#[test]
fn coset_round_trip_is_identity() {
    let mut rng = StdRng::seed_from_u64(13);
    let fs = FftSettings::new(6).unwrap();
    let coeffs = random_vector(fs.max_width(), &mut rng);
    let shift = Fr::GENERATOR;

    let coset_evals = fs.coset_fft(&coeffs, &shift).unwrap();
    let back = fs.coset_ifft(&coset_evals, &shift).unwrap();
    assert_eq!(back, coeffs);

    // a coset evaluation differs from the plain subgroup evaluation
    let plain_evals = fs.fft(&coeffs, false).unwrap();
    assert_ne!(coset_evals, plain_evals);
}

#[test]
fn convolution_degree_is_sum_of_degrees() {
    let mut rng = StdRng::seed_from_u64(17);
    let fs = FftSettings::new(8).unwrap();
    for (len_a, len_b) in [(1usize, 1usize), (3, 5), (17, 64), (100, 28)] {
        let a = random_vector(len_a, &mut rng);
        let mut b = random_vector(len_b, &mut rng);
        // force a nonzero top coefficient so the degree is exact
        if b[len_b - 1].is_zero() {
            b[len_b - 1] = Fr::one();
        }
        let product = fs.mul_polys(&a, &b).unwrap();
        assert_eq!(product.len(), len_a + len_b - 1);
    }
}
