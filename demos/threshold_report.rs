//! Threshold a synthetic time-frequency study and print the report.
//!
//! Run with `RUST_LOG=tfstats=debug` to see the distribution transforms, and
//! `TFSTATS_POOL=time` to change the default adjustment.

use ndarray::{Array3, Axis as ArrayAxis};
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing_subscriber::EnvFilter;

use tfstats::output::{format_threshold, to_json};
use tfstats::voxels::{voxel_index_list, IndexOrder};
use tfstats::{Adjustment, Axis, Config, Tail, TimeFreqSnpmResults};

const N_PERM: usize = 1000;
const SHAPE: (usize, usize, usize) = (125, 12, 6);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
    let (_, n_time, n_freq) = SHAPE;

    // Voxel-wise extremes of simulated null maps
    let mut max_dist = Array3::zeros((N_PERM, n_time, n_freq));
    let mut min_dist = Array3::zeros((N_PERM, n_time, n_freq));
    for s in 0..N_PERM {
        let null: Array3<f64> = Array3::from_shape_simple_fn(SHAPE, || rng.sample(StandardNormal));
        let hi = null.fold_axis(ArrayAxis(0), f64::NEG_INFINITY, |&a, &b| a.max(b));
        let lo = null.fold_axis(ArrayAxis(0), f64::INFINITY, |&a, &b| a.min(b));
        max_dist.index_axis_mut(ArrayAxis(0), s).assign(&hi);
        min_dist.index_axis_mut(ArrayAxis(0), s).assign(&lo);
    }

    let mut stat: Array3<f64> = Array3::from_shape_simple_fn(SHAPE, || rng.sample(StandardNormal));
    for v in 0..5 {
        stat[[v, 4, 2]] += 7.0;
    }
    let rankings = stat.mapv(|x| 0.5 + x.tanh() / 2.0);
    let vox = voxel_index_list([5, 5, 5], IndexOrder::Ijk);

    let results =
        TimeFreqSnpmResults::with_config(stat, vox, rankings, max_dist, min_dist, Config::from_env())?;
    println!(
        "{} voxels, {} permutations\n",
        results.voxels().len(),
        results.permutations()
    );

    let threshold = results.threshold(0.05, Tail::Positive)?;
    println!("{}", format_threshold(&threshold));

    let per_freq = results.threshold_with(0.05, Tail::Negative, &Adjustment::none().pool(Axis::Time))?;
    println!("{}", format_threshold(&per_freq));

    let adjustment = results.config().adjustment();
    let (mask, _) = results.significance_mask(0.05, Tail::Positive, &adjustment)?;
    let hits = mask.iter().filter(|&&m| m).count();
    println!("{hits} significant points");
    println!("{}", to_json(&threshold)?);
    Ok(())
}
