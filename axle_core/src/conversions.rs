//! `From` implementations bridging `axle_config` types to `axle_core` types.

use crate::config::{ChannelFitCfg, FilterCfg, FitCfg, SteerFitCfg};
use crate::sample::CalibrationSample;
use crate::steer::{AxleGroup, AxleSample};
use axle_units::{Pounds, Psi, TempUnit, Temperature};

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&axle_config::FilterCfg> for FilterCfg {
    fn from(c: &axle_config::FilterCfg) -> Self {
        Self {
            deadband_psi: c.deadband_psi,
            min_weight_lbs: c.min_weight_lbs,
            temperature_unit: None,
        }
    }
}

// ── ChannelFitCfg ────────────────────────────────────────────────────────────

impl From<&axle_config::ChannelCfg> for ChannelFitCfg {
    fn from(c: &axle_config::ChannelCfg) -> Self {
        Self {
            min_ridge_samples: c.min_ridge_samples,
            full_trust_samples: c.full_trust_samples,
            ridge_base_lambda: c.ridge_base_lambda,
            ridge_reference_n: c.ridge_reference_n,
            ridge_n_cap: c.ridge_n_cap,
            temperature_effect_cap: c.temperature_effect_cap,
            scale_factor_guard: c.scale_factor_guard,
            singular_det_eps: c.singular_det_eps,
            degenerate_sstot_eps: c.degenerate_sstot_eps,
        }
    }
}

// ── SteerFitCfg ──────────────────────────────────────────────────────────────

impl From<&axle_config::SteerCfg> for SteerFitCfg {
    fn from(c: &axle_config::SteerCfg) -> Self {
        Self {
            min_sessions: c.min_sessions,
        }
    }
}

// ── FitCfg ───────────────────────────────────────────────────────────────────

impl FitCfg {
    /// Build the engine config, pinning the fit temperature unit to the one
    /// the samples are recorded in.
    pub fn from_config(c: &axle_config::Config, unit: TempUnit) -> Self {
        let mut filter = FilterCfg::from(&c.filter);
        filter.temperature_unit = Some(unit);
        Self {
            filter,
            channel: (&c.channel).into(),
            steer: (&c.steer).into(),
        }
    }
}

// ── Samples ──────────────────────────────────────────────────────────────────

impl CalibrationSample {
    /// Tag a CSV row's bare numbers with their units.
    pub fn from_row(row: &axle_config::SampleRow, unit: TempUnit) -> Self {
        Self {
            scale_weight: Pounds(row.scale_weight),
            bag_pressure: Psi(row.bag_pressure),
            ambient_pressure: Psi(row.ambient_pressure),
            air_temperature: Temperature {
                value: row.air_temperature,
                unit,
            },
            occurred_at: row.occurred_at,
            session_key: row.session_key.clone(),
        }
    }
}

impl From<&axle_config::SampleRow> for AxleSample {
    fn from(row: &axle_config::SampleRow) -> Self {
        Self {
            weight: Pounds(row.scale_weight),
            occurred_at: row.occurred_at,
            session_key: row.session_key.clone(),
            group: row
                .axle_group
                .as_deref()
                .map_or(AxleGroup::Other, |g| g.parse::<AxleGroup>().unwrap_or_default()),
        }
    }
}
