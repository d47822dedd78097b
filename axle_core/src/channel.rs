//! Per-channel weight model fitting.
//!
//! Two regimes, chosen by the number of filtered rows `n`:
//!
//! - `n < min_ridge_samples`: zero-intercept differential scale. The slope is
//!   the mean of `weight / gauge` and the line is forced through the origin.
//! - otherwise: ridge-regularized least squares on `[1, gauge, T - T0]`, with
//!   the temperature term penalized, faded in with `n` and clamped to a small
//!   fraction of typical weight.
//!
//! Either way the model is a differential-gauge model: `ambient_coeff` is
//! always `-pressure_coeff`.

use crate::config::ChannelFitCfg;
use crate::error::{FitError, Result};
use crate::linalg::{inverse3, mat_vec3, mean, normal_equations};
use crate::sample::FilteredRow;
use axle_units::{Pounds, Psi, TempUnit, Temperature};

/// Fitted per-channel weight model.
///
/// `weight = intercept + pressure_coeff*bag + ambient_coeff*ambient + temperature_coeff*T`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelModel {
    pub intercept: f64,
    pub pressure_coeff: f64,
    pub ambient_coeff: f64,
    pub temperature_coeff: f64,
    /// Unit `temperature_coeff` applies to.
    pub temperature_unit: TempUnit,
    /// `None` on the low-data path, or when every training weight is identical.
    pub r_squared: Option<f64>,
    /// `None` on the low-data path.
    pub rmse: Option<f64>,
}

impl ChannelModel {
    /// Predict the load on this channel, clamped to non-negative.
    pub fn predict(&self, bag: Psi, ambient: Psi, temperature: Temperature) -> Pounds {
        let w = self.intercept
            + self.pressure_coeff * bag.get()
            + self.ambient_coeff * ambient.get()
            + self.temperature_coeff * temperature.in_unit(self.temperature_unit);
        Pounds(w).non_negative()
    }
}

/// Which regime produced a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitPath {
    LowData,
    Ridge,
}

impl FitPath {
    pub const fn as_str(self) -> &'static str {
        match self {
            FitPath::LowData => "low_data",
            FitPath::Ridge => "ridge",
        }
    }
}

/// A model plus how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelFit {
    pub model: ChannelModel,
    pub path: FitPath,
    pub rows_used: usize,
}

/// Linear fade-in between `min_ridge_samples` (0) and `full_trust_samples` (1).
pub fn ramp_factor(n: usize, cfg: &ChannelFitCfg) -> f64 {
    let lo = cfg.min_ridge_samples;
    let hi = cfg.full_trust_samples;
    if n < lo {
        0.0
    } else if n >= hi {
        1.0
    } else {
        (n - lo) as f64 / (hi - lo) as f64
    }
}

/// Ridge penalty on the centered temperature coefficient; shrinks as `n` grows.
pub fn temperature_lambda(n: usize, cfg: &ChannelFitCfg) -> f64 {
    let n_eff = n.clamp(cfg.min_ridge_samples, cfg.ridge_n_cap);
    cfg.ridge_base_lambda * (cfg.ridge_reference_n as f64 / n_eff as f64)
}

/// Allowed worst-case temperature effect as a fraction of typical weight.
pub fn temperature_gamma(n: usize, cfg: &ChannelFitCfg) -> f64 {
    cfg.temperature_effect_cap * ramp_factor(n, cfg)
}

/// Fit a channel model from filtered rows.
///
/// `Ok(None)` means there is not enough usable data; the caller keeps its
/// previous model. A degenerate system is an error.
pub fn fit(rows: &[FilteredRow], cfg: &ChannelFitCfg) -> Result<Option<ChannelModel>> {
    Ok(fit_report(rows, cfg)?.map(|f| f.model))
}

/// Like [`fit`], also reporting the regime used.
pub fn fit_report(rows: &[FilteredRow], cfg: &ChannelFitCfg) -> Result<Option<ChannelFit>> {
    let Some(first) = rows.first() else {
        tracing::debug!("no usable calibration rows");
        return Ok(None);
    };
    let unit = first.temperature.unit;
    let n = rows.len();
    if n < cfg.min_ridge_samples {
        Ok(fit_low_data(rows, unit, cfg).map(|model| ChannelFit {
            model,
            path: FitPath::LowData,
            rows_used: n,
        }))
    } else {
        let model = fit_ridge(rows, unit, cfg)?;
        Ok(Some(ChannelFit {
            model,
            path: FitPath::Ridge,
            rows_used: n,
        }))
    }
}

fn fit_low_data(
    rows: &[FilteredRow],
    unit: TempUnit,
    cfg: &ChannelFitCfg,
) -> Option<ChannelModel> {
    let m = mean(
        rows.iter()
            .filter(|r| r.gauge_pressure.get().abs() >= cfg.scale_factor_guard)
            .map(|r| r.weight.get() / r.gauge_pressure.get()),
    )?;
    tracing::debug!(n = rows.len(), lbs_per_psi = m, "low-data zero-intercept fit");
    Some(ChannelModel {
        intercept: 0.0,
        pressure_coeff: m,
        ambient_coeff: -m,
        temperature_coeff: 0.0,
        temperature_unit: unit,
        r_squared: None,
        rmse: None,
    })
}

fn fit_ridge(rows: &[FilteredRow], unit: TempUnit, cfg: &ChannelFitCfg) -> Result<ChannelModel> {
    let n = rows.len();
    let temps: Vec<f64> = rows.iter().map(|r| r.temperature.in_unit(unit)).collect();
    let t0 = mean(temps.iter().copied()).unwrap_or(0.0);

    check_pressure_spread(rows, cfg)?;

    let design = rows
        .iter()
        .zip(&temps)
        .map(|(r, t)| ([1.0, r.gauge_pressure.get(), t - t0], r.weight.get()));
    let (mut xtx, xty) = normal_equations(design);
    let lambda_t = temperature_lambda(n, cfg);
    // No penalty on intercept or pressure slope.
    xtx[2][2] += lambda_t;

    let inv = inverse3(&xtx, cfg.singular_det_eps)?;
    let [b, m, c_fit] = mat_vec3(&inv, &xty);

    let mut c = c_fit * ramp_factor(n, cfg);
    let max_abs_dt = temps.iter().map(|t| (t - t0).abs()).fold(0.0f64, f64::max);
    if max_abs_dt > 0.0 {
        let typical_weight = mean(rows.iter().map(|r| r.weight.get().abs())).unwrap_or(0.0);
        let allowed = temperature_gamma(n, cfg) * typical_weight.max(1.0);
        let max_effect = c.abs() * max_abs_dt;
        if max_effect > allowed && max_effect > 0.0 {
            tracing::debug!(max_effect, allowed, "temperature effect clamped");
            c *= allowed / max_effect;
        }
    } else {
        c = 0.0;
    }

    if !(b.is_finite() && m.is_finite() && c.is_finite()) {
        return Err(FitError::NonFinite("coefficient"));
    }

    let (r_squared, rmse) = fit_quality(rows, &temps, t0, b, m, c, cfg);
    tracing::debug!(
        n,
        lambda_t,
        intercept = b - c * t0,
        lbs_per_psi = m,
        temperature_coeff = c,
        ?r_squared,
        "ridge fit"
    );

    Ok(ChannelModel {
        intercept: b - c * t0,
        pressure_coeff: m,
        ambient_coeff: -m,
        temperature_coeff: c,
        temperature_unit: unit,
        r_squared,
        rmse: Some(rmse),
    })
}

/// A constant gauge column is collinear with the intercept.
///
/// `Σ(g - ḡ)² / max(Σg², 1)` is the pressure block's determinant normalized by its
/// diagonal, so the threshold holds at any pressure scale.
fn check_pressure_spread(rows: &[FilteredRow], cfg: &ChannelFitCfg) -> Result<()> {
    let g_mean = mean(rows.iter().map(|r| r.gauge_pressure.get())).unwrap_or(0.0);
    let (spread, sum_sq) = rows.iter().fold((0.0, 0.0), |(spread, sum_sq), r| {
        let g = r.gauge_pressure.get();
        (spread + (g - g_mean).powi(2), sum_sq + g * g)
    });
    let rel = spread / sum_sq.max(1.0);
    if !rel.is_finite() || rel <= cfg.singular_det_eps {
        tracing::debug!(spread, sum_sq, "gauge pressure has no spread");
        return Err(FitError::SingularSystem { det: rel });
    }
    Ok(())
}

fn fit_quality(
    rows: &[FilteredRow],
    temps: &[f64],
    t0: f64,
    b: f64,
    m: f64,
    c: f64,
    cfg: &ChannelFitCfg,
) -> (Option<f64>, f64) {
    let n = rows.len() as f64;
    let y_mean = mean(rows.iter().map(|r| r.weight.get())).unwrap_or(0.0);
    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (r, t) in rows.iter().zip(temps) {
        let y = r.weight.get();
        let y_hat = b + m * r.gauge_pressure.get() + c * (t - t0);
        ss_res += (y - y_hat).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }
    let r_squared = (ss_tot >= cfg.degenerate_sstot_eps).then(|| 1.0 - ss_res / ss_tot);
    (r_squared, (ss_res / n).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_schedule() {
        let cfg = ChannelFitCfg::default();
        assert_eq!(ramp_factor(4, &cfg), 0.0);
        assert_eq!(ramp_factor(5, &cfg), 0.0);
        assert!((ramp_factor(10, &cfg) - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(ramp_factor(20, &cfg), 1.0);
        assert_eq!(ramp_factor(400, &cfg), 1.0);
    }

    #[test]
    fn lambda_at_five_is_four_times_lambda_at_twenty() {
        let cfg = ChannelFitCfg::default();
        assert_eq!(temperature_lambda(5, &cfg), 40_000.0);
        assert_eq!(temperature_lambda(20, &cfg), 10_000.0);
        assert_eq!(temperature_lambda(3, &cfg), temperature_lambda(5, &cfg));
        assert_eq!(temperature_lambda(50, &cfg), 4_000.0);
        assert_eq!(temperature_lambda(500, &cfg), 4_000.0);
    }

    #[test]
    fn gamma_reaches_one_percent() {
        let cfg = ChannelFitCfg::default();
        assert_eq!(temperature_gamma(4, &cfg), 0.0);
        assert!((temperature_gamma(20, &cfg) - 0.01).abs() < 1e-15);
    }

    #[test]
    fn predict_clamps_below_zero() {
        let model = ChannelModel {
            intercept: -500.0,
            pressure_coeff: 10.0,
            ambient_coeff: -10.0,
            temperature_coeff: 0.0,
            temperature_unit: TempUnit::Fahrenheit,
            r_squared: None,
            rmse: None,
        };
        let w = model.predict(Psi(20.0), Psi(14.7), Temperature::fahrenheit(60.0));
        assert_eq!(w, Pounds(0.0));
    }
}
