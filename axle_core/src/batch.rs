//! Multi-channel fan-out.
//!
//! Each channel fit is independent, so a batch is spread over a fixed pool of
//! scoped worker threads fed through a bounded channel. Results come back in
//! input order and match sequential fitting exactly.
use crate::config::FitCfg;
use crate::{ChannelReport, fit_channel_report};
use crate::sample::CalibrationSample;
use crossbeam_channel as xch;

/// Samples collected for one sensing channel.
#[derive(Debug, Clone)]
pub struct ChannelJob {
    pub channel: String,
    pub samples: Vec<CalibrationSample>,
}

/// Outcome of fitting one channel of a batch.
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    pub channel: String,
    pub report: crate::error::Result<ChannelReport>,
}

/// Resolve a requested worker count; 0 means one per available core.
pub fn effective_workers(requested: usize, jobs: usize) -> usize {
    let wanted = if requested == 0 {
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(1)
    } else {
        requested
    };
    wanted.min(jobs).max(1)
}

/// Fit every job on up to `workers` threads.
pub fn fit_channels(jobs: Vec<ChannelJob>, cfg: &FitCfg, workers: usize) -> Vec<ChannelOutcome> {
    let total = jobs.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = effective_workers(workers, total);
    tracing::debug!(channels = total, workers, "fitting channel batch");

    let (job_tx, job_rx) = xch::bounded::<(usize, ChannelJob)>(total);
    let (out_tx, out_rx) = xch::unbounded::<(usize, ChannelOutcome)>();
    for (idx, job) in jobs.into_iter().enumerate() {
        // Capacity equals the job count, so this never blocks.
        if job_tx.send((idx, job)).is_err() {
            break;
        }
    }
    drop(job_tx);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let out_tx = out_tx.clone();
            scope.spawn(move || {
                for (idx, job) in job_rx.iter() {
                    let report = fit_channel_report(&job.samples, cfg);
                    if let Err(e) = &report {
                        tracing::warn!(channel = %job.channel, error = %e, "channel fit failed");
                    }
                    let outcome = ChannelOutcome {
                        channel: job.channel,
                        report,
                    };
                    if out_tx.send((idx, outcome)).is_err() {
                        tracing::debug!("batch collector disconnected, worker exiting");
                        break;
                    }
                }
            });
        }
    });
    drop(out_tx);

    let mut slots: Vec<Option<ChannelOutcome>> = (0..total).map(|_| None).collect();
    for (idx, outcome) in out_rx.try_iter() {
        slots[idx] = Some(outcome);
    }
    slots.into_iter().flatten().collect()
}
