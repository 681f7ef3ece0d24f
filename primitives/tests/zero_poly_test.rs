use ark_bn254::Fr;
use ark_std::{One, Zero};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use eigenda_primitives::fft::FftSettings;
use eigenda_primitives::zero_poly::zero_poly_via_multiplication;

fn random_missing_set(width: usize, count: usize, seed: u64) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..width).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    indices.truncate(count);
    indices
}

#[test]
fn degree_and_roots_match_the_missing_set() {
    let fs = FftSettings::new(8).unwrap();
    let width = fs.max_width();

    // sizes straddling the leaf-group boundary
    for (seed, count) in [(1u64, 1usize), (2, 63), (3, 64), (4, 65), (5, 200)] {
        let missing = random_missing_set(width, count, seed);
        let zero_poly = zero_poly_via_multiplication(&fs, &missing).unwrap();

        assert_eq!(zero_poly.coeffs.len(), count + 1, "degree for |M| = {count}");
        assert_eq!(
            *zero_poly.coeffs.last().unwrap(),
            Fr::one(),
            "monic for |M| = {count}"
        );
        assert_eq!(zero_poly.evals.len(), width);

        for i in 0..width {
            let vanishes = zero_poly.evals[i].is_zero();
            assert_eq!(
                vanishes,
                missing.contains(&i),
                "evaluation at index {i} for |M| = {count}"
            );
        }
    }
}

#[test]
fn construction_is_independent_of_index_order() {
    let fs = FftSettings::new(6).unwrap();
    let forward: Vec<usize> = (3..40).collect();
    let mut reversed = forward.clone();
    reversed.reverse();

    let a = zero_poly_via_multiplication(&fs, &forward).unwrap();
    let b = zero_poly_via_multiplication(&fs, &reversed).unwrap();
    assert_eq!(a.coeffs, b.coeffs);
    assert_eq!(a.evals, b.evals);
}

#[test]
fn single_missing_index_is_a_linear_factor() {
    let fs = FftSettings::new(4).unwrap();
    let zero_poly = zero_poly_via_multiplication(&fs, &[5]).unwrap();
    // x - ω^5
    assert_eq!(zero_poly.coeffs, vec![-fs.root_of_unity(5), Fr::one()]);
}
