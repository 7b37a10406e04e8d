//! Aggregate many independent stochastic replicates of double-mutant
//! takeover into per-time-index order statistics (median and 95% credible
//! band).
use crate::CloneSize;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

/// The replicate trajectories, aligned to a common length of `samples + 1`
/// entries and clamped at saturation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrajectoryMatrix {
    rows: Vec<Vec<CloneSize>>,
    total_pop: CloneSize,
}

/// Per sample index, the cross-replicate median and the two-sided 95%
/// order-statistic bounds.
#[derive(Clone, Debug)]
pub struct TrajectorySummary {
    pub median: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

pub fn run_replicates<F>(
    runs: usize,
    samples: usize,
    total_pop: CloneSize,
    replicate: F,
) -> TrajectoryMatrix
where
    F: Fn(&mut ChaCha8Rng) -> Vec<CloneSize> + Sync,
{
    //! Drive `runs` independent replicates across the rayon worker pool.
    //! Each replicate seeds its own rng with the replicate index, so the
    //! same `runs` and the same driving procedure reproduce the matrix
    //! bit for bit regardless of scheduling.
    let rows: Vec<Vec<CloneSize>> = (0..runs)
        .into_par_iter()
        .map(|idx| {
            let mut rng = ChaCha8Rng::seed_from_u64(idx as u64);
            clamp_saturated(replicate(&mut rng), samples, total_pop)
        })
        .collect();
    TrajectoryMatrix { rows, total_pop }
}

fn clamp_saturated(
    trajectory: Vec<CloneSize>,
    samples: usize,
    total_pop: CloneSize,
) -> Vec<CloneSize> {
    //! Align one realised trajectory to `samples + 1` entries. Once the count
    //! first reaches the total population, every later entry is forced to the
    //! total population; a trajectory cut short by the early-exit is
    //! right-padded with the saturated value (or with its last observed count
    //! if it ended below takeover).
    let mut row = Vec::with_capacity(samples + 1);
    let mut saturated = false;
    for &count in trajectory.iter().take(samples + 1) {
        row.push(if saturated { total_pop } else { count.min(total_pop) });
        if count >= total_pop {
            saturated = true;
        }
    }
    let pad = if saturated {
        total_pop
    } else {
        row.last().copied().unwrap_or(0)
    };
    row.resize(samples + 1, pad);
    row
}

impl TrajectoryMatrix {
    pub fn rows(&self) -> &[Vec<CloneSize>] {
        &self.rows
    }

    pub fn total_pop(&self) -> CloneSize {
        self.total_pop
    }

    pub fn summarise(&self) -> TrajectorySummary {
        //! Median and [2.5, 97.5] percentile band across the replicates, per
        //! sample index.
        assert!(!self.rows.is_empty(), "no replicates to summarise");
        let len = self.rows[0].len();
        let mut summary = TrajectorySummary {
            median: Vec::with_capacity(len),
            lower: Vec::with_capacity(len),
            upper: Vec::with_capacity(len),
        };
        for idx in 0..len {
            let mut column: Vec<f64> =
                self.rows.iter().map(|row| row[idx] as f64).collect();
            column.sort_by(|a, b| a.partial_cmp(b).unwrap());
            summary.lower.push(quantile(&column, 0.025));
            summary.median.push(quantile(&column, 0.5));
            summary.upper.push(quantile(&column, 0.975));
        }
        summary
    }
}

pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    //! Empirical quantile of an ascending sample with linear interpolation
    //! between the two nearest order statistics.
    assert!(!sorted.is_empty(), "cannot take the quantile of no replicates");
    assert!((0f64..=1f64).contains(&q), "quantile {} out of [0, 1]", q);
    let position = q * (sorted.len() - 1) as f64;
    let below = position.floor() as usize;
    let above = position.ceil() as usize;
    sorted[below] + (position - below as f64) * (sorted[above] - sorted[below])
}
