//! Turn a simulated multi-time-point clone-size sample and the target dataset
//! into one scalar distance for the external ABC sampler.
use crate::data::TargetData;
use crate::CloneSize;
use anyhow::{ensure, Context};
use kolmogorov_smirnov as ks;

/// Sentinel distance handed to the external sampler when a candidate cannot
/// be evaluated. The sampler has no separate error channel, so the sentinel
/// must be distinguishable by magnitude alone: legitimate distances are sums
/// of KS statistics, each in [0, 1], over at most a handful of time points.
pub const ERROR_DISTANCE: f32 = 99_999.0;

/// The `kolmogorov_smirnov` crate rejects samples this small.
const MIN_OBSERVATIONS: usize = 10;

pub fn ks_distance(
    target: &[CloneSize],
    simulated: &[CloneSize],
) -> anyhow::Result<f32> {
    //! Two-sample Kolmogorov-Smirnov statistic (the maximum absolute
    //! difference between the two empirical cumulative distribution
    //! functions) between the target and the simulated clone sizes.
    ensure!(
        target.len() > MIN_OBSERVATIONS
            && simulated.len() > MIN_OBSERVATIONS,
        "cannot compute the KS statistic with {} target and {} simulated observations",
        target.len(),
        simulated.len()
    );
    Ok(ks::test(target, simulated, 0.95).statistic as f32)
}

pub fn summed_distance(
    target: &TargetData,
    simulated: &[Vec<CloneSize>],
) -> anyhow::Result<f32> {
    //! Sum of the per-time-point KS statistics. The sum (not the average) is
    //! deliberate: candidates that disagree at more time points accumulate a
    //! larger penalty.
    ensure!(
        target.len() == simulated.len(),
        "found {} simulated samples for {} target time points",
        simulated.len(),
        target.len()
    );
    let mut total = 0f32;
    for ((time, observed), sample) in target.iter().zip(simulated.iter()) {
        total += ks_distance(observed, sample)
            .with_context(|| format!("at time point {}", time))?;
    }
    Ok(total)
}
