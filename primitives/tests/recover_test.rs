use ark_bn254::Fr;
use ark_std::Zero;
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use eigenda_primitives::fft::FftSettings;
use eigenda_primitives::recover::recover_poly_from_samples;

/// Shared wide domain; building the 2^10 root table once keeps the ratio
/// sweep fast.
static WIDE_SETTINGS: Lazy<FftSettings> = Lazy::new(|| FftSettings::new(10).unwrap());

/// Coefficients with a zero-padded second half, so any half of the
/// evaluations carries full information.
fn padded_poly(width: usize) -> Vec<Fr> {
    let mut poly = vec![Fr::zero(); width];
    for (i, coeff) in poly.iter_mut().enumerate().take(width / 2) {
        *coeff = Fr::from(i as u64);
    }
    poly
}

#[test]
fn recovers_from_two_missing_samples_on_a_tiny_domain() {
    let fs = FftSettings::new(2).unwrap();
    let poly = padded_poly(fs.max_width());
    let data = fs.fft(&poly, false).unwrap();

    let subset = vec![Some(data[0]), None, None, Some(data[3])];
    let recovered = recover_poly_from_samples(&fs, &subset).unwrap();

    assert_eq!(recovered, data);

    // and the original coefficients come back, padding included
    let back = fs.fft(&recovered, true).unwrap();
    assert_eq!(back, poly);
}

#[test]
fn recovers_random_subsets_across_known_ratios() {
    let fs = &*WIDE_SETTINGS;
    let width = fs.max_width();
    let poly = padded_poly(width);
    let data = fs.fft(&poly, false).unwrap();

    for known_ratio in [0.70f64, 0.75, 0.80, 0.85, 0.90, 0.95] {
        let known = (width as f64 * known_ratio) as usize;
        let missing_count = width - known;

        for seed in 0..3u64 {
            let mut samples: Vec<Option<Fr>> = data.iter().copied().map(Some).collect();
            let mut indices: Vec<usize> = (0..width).collect();
            indices.shuffle(&mut StdRng::seed_from_u64(seed));
            for &index in indices.iter().take(missing_count) {
                samples[index] = None;
            }

            let recovered = recover_poly_from_samples(&fs, &samples)
                .unwrap_or_else(|err| panic!("known={known} seed={seed}: {err}"));
            assert_eq!(recovered, data, "known={known} seed={seed}");

            let back = fs.fft(&recovered, true).unwrap();
            assert_eq!(&back[..width / 2], &poly[..width / 2]);
            for (i, coeff) in back.iter().enumerate().skip(width / 2) {
                assert!(coeff.is_zero(), "padding coefficient {i} nonzero");
            }
        }
    }
}

#[test]
fn recovers_exactly_at_the_redundancy_floor() {
    let fs = FftSettings::new(6).unwrap();
    let width = fs.max_width();
    let poly = padded_poly(width);
    let data = fs.fft(&poly, false).unwrap();

    // knock out every other evaluation: exactly width / 2 missing
    let samples: Vec<Option<Fr>> = data
        .iter()
        .enumerate()
        .map(|(i, value)| (i % 2 == 0).then_some(*value))
        .collect();

    let recovered = recover_poly_from_samples(&fs, &samples).unwrap();
    assert_eq!(recovered, data);
}
