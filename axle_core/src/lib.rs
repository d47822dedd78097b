#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss,
    clippy::many_single_char_names
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Calibration regression engine for pneumatic axle load sensors.
//!
//! Turns sparse operator calibration points into linear weight models. The
//! engine is a set of pure functions: no I/O, no state between calls, and
//! identical inputs always give bit-identical outputs.
//!
//! ## Architecture
//!
//! - **Samples**: raw readings and the defensive pre-fit filter (`sample` module)
//! - **Channel fits**: zero-intercept low-data path and ridge path (`channel` module)
//! - **Virtual steer**: session grouping and drive→steer OLS (`steer` module)
//! - **Batch**: independent channels fanned out over worker threads (`batch` module)
//! - **Configuration**: tuning thresholds with field-proven defaults (`config` module)
//!
//! A model predicts
//! `weight = intercept + pressure_coeff*bag + ambient_coeff*ambient + temperature_coeff*T`,
//! clamped to non-negative, with `ambient_coeff == -pressure_coeff`.

pub mod batch;
pub mod channel;
pub mod config;
pub mod conversions;
pub mod error;
pub mod linalg;
pub mod sample;
pub mod steer;

pub use axle_units::{Pounds, Psi, TempUnit, Temperature};
pub use batch::{ChannelJob, ChannelOutcome, fit_channels};
pub use channel::{ChannelFit, ChannelModel, FitPath};
pub use config::{ChannelFitCfg, FilterCfg, FitCfg, SteerFitCfg};
pub use error::{FitError, Result};
pub use sample::{CalibrationSample, FilteredRow, filter_samples};
pub use steer::{AxleGroup, AxleSample, CalibrationSession, SessionKey, SteerModel, group_sessions};

/// Filter outcome plus fit, for callers that explain their results.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelReport {
    /// `None` when too few usable rows remain.
    pub fit: Option<ChannelFit>,
    pub rows_dropped: usize,
}

impl ChannelReport {
    pub fn model(&self) -> Option<&ChannelModel> {
        self.fit.as_ref().map(|f| &f.model)
    }
}

/// Filter raw samples and fit a channel model.
///
/// `Ok(None)` means insufficient data; a singular system is an error.
pub fn fit_channel(samples: &[CalibrationSample], cfg: &FitCfg) -> Result<Option<ChannelModel>> {
    cfg.channel.validate()?;
    let rows = filter_samples(samples, &cfg.filter);
    channel::fit(&rows, &cfg.channel)
}

/// Like [`fit_channel`], also reporting the regime and dropped rows.
pub fn fit_channel_report(samples: &[CalibrationSample], cfg: &FitCfg) -> Result<ChannelReport> {
    cfg.channel.validate()?;
    let rows = filter_samples(samples, &cfg.filter);
    let fit = channel::fit_report(&rows, &cfg.channel)?;
    Ok(ChannelReport {
        fit,
        rows_dropped: samples.len() - rows.len(),
    })
}

/// Fit the drive→steer model from grouped sessions.
pub fn fit_virtual_steer(sessions: &[CalibrationSession], cfg: &FitCfg) -> Option<SteerModel> {
    steer::fit(sessions, &cfg.steer)
}
