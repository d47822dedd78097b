//! Tuning for the calibration fitters.
//!
//! These are the runtime structs the fitters read. They are separate from the
//! TOML-deserialized config in `axle_config`; see `conversions` for the bridge.
//! Defaults are the field-proven constants the deployed fleet was calibrated with.

use crate::error::{FitError, Result};
use axle_units::TempUnit;

/// Sample filter thresholds.
#[derive(Debug, Clone)]
pub struct FilterCfg {
    /// Rows whose gauge pressure is at or below this (psi) are dropped.
    pub deadband_psi: f64,
    /// Rows whose scale weight is at or below this (lbs) are dropped.
    pub min_weight_lbs: f64,
    /// Unit every row's temperature is normalized into. `None` adopts the
    /// unit of the first surviving sample.
    pub temperature_unit: Option<TempUnit>,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            deadband_psi: 0.01,
            min_weight_lbs: 0.0,
            temperature_unit: None,
        }
    }
}

/// Per-channel fitter configuration.
#[derive(Debug, Clone)]
pub struct ChannelFitCfg {
    /// Below this many rows the zero-intercept scale path is used.
    pub min_ridge_samples: usize,
    /// Row count at which the temperature term is fully trusted.
    pub full_trust_samples: usize,
    /// Base ridge penalty on the centered temperature coefficient.
    pub ridge_base_lambda: f64,
    /// Row count at which the penalty equals `ridge_base_lambda`.
    pub ridge_reference_n: usize,
    /// Row count beyond which the penalty stops shrinking.
    pub ridge_n_cap: usize,
    /// Worst-case temperature contribution as a fraction of typical weight, at full trust.
    pub temperature_effect_cap: f64,
    /// Rows with |gauge| below this are skipped on the low-data path.
    pub scale_factor_guard: f64,
    /// Relative gauge-pressure spread (and |det|) at or below this makes the normal
    /// equations singular.
    pub singular_det_eps: f64,
    /// Total sum of squares below this leaves r² undefined.
    pub degenerate_sstot_eps: f64,
}

impl Default for ChannelFitCfg {
    fn default() -> Self {
        Self {
            min_ridge_samples: 5,
            full_trust_samples: 20,
            ridge_base_lambda: 10_000.0,
            ridge_reference_n: 20,
            ridge_n_cap: 50,
            temperature_effect_cap: 0.01,
            scale_factor_guard: 1e-6,
            singular_det_eps: 1e-12,
            degenerate_sstot_eps: 1e-9,
        }
    }
}

impl ChannelFitCfg {
    /// Range checks for the `[channel]` config section.
    pub fn validate(&self) -> Result<()> {
        if self.min_ridge_samples < 2 {
            return Err(FitError::InvalidConfig("channel.min_ridge_samples must be >= 2"));
        }
        if self.full_trust_samples <= self.min_ridge_samples {
            return Err(FitError::InvalidConfig(
                "channel.full_trust_samples must be > channel.min_ridge_samples",
            ));
        }
        if self.ridge_n_cap < self.min_ridge_samples {
            return Err(FitError::InvalidConfig(
                "channel.ridge_n_cap must be >= channel.min_ridge_samples",
            ));
        }
        if !(self.ridge_base_lambda.is_finite() && self.ridge_base_lambda > 0.0) {
            return Err(FitError::InvalidConfig("channel.ridge_base_lambda must be > 0.0"));
        }
        if self.ridge_reference_n == 0 {
            return Err(FitError::InvalidConfig("channel.ridge_reference_n must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.temperature_effect_cap) {
            return Err(FitError::InvalidConfig(
                "channel.temperature_effect_cap must be in [0.0, 1.0]",
            ));
        }
        if !(self.scale_factor_guard > 0.0) {
            return Err(FitError::InvalidConfig("channel.scale_factor_guard must be > 0.0"));
        }
        if !(self.singular_det_eps > 0.0) {
            return Err(FitError::InvalidConfig("channel.singular_det_eps must be > 0.0"));
        }
        if !(self.degenerate_sstot_eps > 0.0) {
            return Err(FitError::InvalidConfig("channel.degenerate_sstot_eps must be > 0.0"));
        }
        Ok(())
    }
}

/// Virtual steer fitter configuration.
#[derive(Debug, Clone)]
pub struct SteerFitCfg {
    /// Minimum number of complete sessions needed for a model.
    pub min_sessions: usize,
}

impl Default for SteerFitCfg {
    fn default() -> Self {
        Self { min_sessions: 3 }
    }
}

/// Everything a fit invocation reads.
#[derive(Debug, Clone, Default)]
pub struct FitCfg {
    pub filter: FilterCfg,
    pub channel: ChannelFitCfg,
    pub steer: SteerFitCfg,
}
