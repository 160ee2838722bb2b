//! Synthetic permutation results shared by the integration tests.

#![allow(dead_code)]

use ndarray::Array3;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;

use tfstats::voxels::{voxel_index_list, IndexOrder};
use tfstats::TimeFreqSnpmResults;

pub const DIST_SZ: usize = 16;
pub const NVOX: usize = 100;
pub const NT: usize = 10;
pub const NF: usize = 4;

/// Standard-normal array from a seeded generator.
pub fn randn(rng: &mut Xoshiro256PlusPlus, shape: (usize, usize, usize)) -> Array3<f64> {
    Array3::from_shape_simple_fn(shape, || rng.sample(StandardNormal))
}

/// Uniform [0, 1) array from a seeded generator.
pub fn rand_unit(rng: &mut Xoshiro256PlusPlus, shape: (usize, usize, usize)) -> Array3<f64> {
    Array3::from_shape_simple_fn(shape, || rng.gen::<f64>())
}

/// Random results with `dist_sz` permutations over a 5x5x5 volume.
pub fn random_results(seed: u64, dist_sz: usize) -> TimeFreqSnpmResults {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let stat = randn(&mut rng, (NVOX, NT, NF));
    let rankings = rand_unit(&mut rng, (NVOX, NT, NF));
    let max_dist = randn(&mut rng, (dist_sz, NT, NF));
    let min_dist = randn(&mut rng, (dist_sz, NT, NF));
    let vox = voxel_index_list([5, 5, 5], IndexOrder::Ijk)[..NVOX].to_vec();
    TimeFreqSnpmResults::new(stat, vox, rankings, max_dist, min_dist)
        .expect("synthetic arrays are consistent")
}
