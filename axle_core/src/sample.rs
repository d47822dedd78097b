//! Calibration samples and the pre-fit filter.
//!
//! The filter is defensive, not validating: a malformed row is dropped and
//! the rest of the set is kept in input order.

use crate::config::FilterCfg;
use axle_units::{Pounds, Psi, TempUnit, Temperature};
use chrono::{DateTime, Utc};

/// One operator-recorded reading against a known scale weight.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSample {
    pub scale_weight: Pounds,
    pub bag_pressure: Psi,
    pub ambient_pressure: Psi,
    pub air_temperature: Temperature,
    pub occurred_at: DateTime<Utc>,
    /// Free-text ticket or grouping id.
    pub session_key: Option<String>,
}

impl CalibrationSample {
    #[inline]
    pub fn gauge_pressure(&self) -> Psi {
        self.bag_pressure - self.ambient_pressure
    }
}

/// A sample that survived filtering, with its derived gauge pressure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilteredRow {
    pub weight: Pounds,
    pub bag_pressure: Psi,
    pub ambient_pressure: Psi,
    pub temperature: Temperature,
    pub gauge_pressure: Psi,
}

impl FilteredRow {
    /// Build a row directly from raw readings, deriving gauge pressure.
    pub fn new(
        weight: Pounds,
        bag_pressure: Psi,
        ambient_pressure: Psi,
        temperature: Temperature,
    ) -> Self {
        Self {
            weight,
            bag_pressure,
            ambient_pressure,
            temperature,
            gauge_pressure: bag_pressure - ambient_pressure,
        }
    }
}

/// Why a sample was dropped. Only used for trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DropReason {
    NonFinite,
    NonPositiveWeight,
    InsideDeadband,
}

fn classify(s: &CalibrationSample, gauge: Psi, cfg: &FilterCfg) -> Option<DropReason> {
    let finite = s.scale_weight.get().is_finite()
        && s.bag_pressure.get().is_finite()
        && s.ambient_pressure.get().is_finite()
        && s.air_temperature.value.is_finite();
    if !finite {
        return Some(DropReason::NonFinite);
    }
    if s.scale_weight.get() <= cfg.min_weight_lbs {
        return Some(DropReason::NonPositiveWeight);
    }
    if gauge.get() <= cfg.deadband_psi {
        return Some(DropReason::InsideDeadband);
    }
    None
}

/// Filter raw samples into fit rows.
///
/// Rules, in order: derive gauge pressure, drop non-positive weights, drop
/// rows inside the gauge deadband. Non-finite readings are dropped as well.
/// Temperatures are normalized to `cfg.temperature_unit`, or to the unit of
/// the first surviving sample when unset.
pub fn filter_samples(samples: &[CalibrationSample], cfg: &FilterCfg) -> Vec<FilteredRow> {
    let mut unit: Option<TempUnit> = cfg.temperature_unit;
    let mut out = Vec::with_capacity(samples.len());
    for (idx, s) in samples.iter().enumerate() {
        let gauge = s.gauge_pressure();
        if let Some(reason) = classify(s, gauge, cfg) {
            tracing::trace!(idx, ?reason, gauge_psi = gauge.get(), "calibration sample dropped");
            continue;
        }
        let fit_unit = *unit.get_or_insert(s.air_temperature.unit);
        out.push(FilteredRow {
            weight: s.scale_weight,
            bag_pressure: s.bag_pressure,
            ambient_pressure: s.ambient_pressure,
            temperature: s.air_temperature.to_unit(fit_unit),
            gauge_pressure: gauge,
        });
    }
    if out.len() < samples.len() {
        tracing::debug!(
            kept = out.len(),
            dropped = samples.len() - out.len(),
            "calibration samples filtered"
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(w: f64, bag: f64, amb: f64) -> CalibrationSample {
        CalibrationSample {
            scale_weight: Pounds(w),
            bag_pressure: Psi(bag),
            ambient_pressure: Psi(amb),
            air_temperature: Temperature::fahrenheit(70.0),
            occurred_at: DateTime::<Utc>::UNIX_EPOCH,
            session_key: None,
        }
    }

    #[test]
    fn deadband_is_exclusive_of_threshold() {
        let cfg = FilterCfg::default();
        // gauge exactly at 0.01 is dropped; just above survives
        let rows = filter_samples(
            &[sample(100.0, 0.01, 0.0), sample(100.0, 0.0201, 0.0)],
            &cfg,
        );
        assert_eq!(rows.len(), 1);
        assert!((rows[0].gauge_pressure.get() - 0.0201).abs() < 1e-9);
    }

    #[test]
    fn nan_rows_are_dropped() {
        let cfg = FilterCfg::default();
        let rows = filter_samples(&[sample(f64::NAN, 30.0, 14.7)], &cfg);
        assert!(rows.is_empty());
    }
}
