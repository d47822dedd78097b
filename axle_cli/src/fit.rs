//! Command execution: sample loading, fitting, and result printing.

use axle_config::{Config, SampleRow};
use axle_core::{
    AxleSample, CalibrationSample, ChannelJob, ChannelModel, ChannelOutcome, ChannelReport,
    FitCfg, Pounds, Psi, SteerModel, TempUnit, Temperature,
};
use eyre::{Result, WrapErr};
use serde_json::json;
use std::path::Path;

/// Everything a command needs from the loaded config.
pub struct Ctx {
    pub fit: FitCfg,
    pub unit: TempUnit,
    pub jobs: usize,
    pub json: bool,
}

impl Ctx {
    pub fn new(cfg: &Config, json: bool) -> Result<Self> {
        let unit = cfg.temperature_unit()?;
        let fit = FitCfg::from_config(cfg, unit);
        fit.channel.validate().wrap_err("invalid config")?;
        Ok(Self {
            fit,
            unit,
            jobs: cfg.batch.jobs,
            json,
        })
    }
}

fn load_rows(path: &Path) -> Result<Vec<SampleRow>> {
    let rows = axle_config::load_samples_csv(path)?;
    tracing::info!(rows = rows.len(), path = %path.display(), "samples loaded");
    Ok(rows)
}

/// Split rows into per-channel jobs, keeping first-appearance channel order.
pub fn channel_jobs(rows: &[SampleRow], unit: TempUnit, only: Option<&str>) -> Vec<ChannelJob> {
    let mut jobs: Vec<ChannelJob> = Vec::new();
    for row in rows {
        if only.is_some_and(|c| c != row.channel) {
            continue;
        }
        let sample = CalibrationSample::from_row(row, unit);
        match jobs.iter_mut().find(|j| j.channel == row.channel) {
            Some(job) => job.samples.push(sample),
            None => jobs.push(ChannelJob {
                channel: row.channel.clone(),
                samples: vec![sample],
            }),
        }
    }
    jobs
}

fn model_json(m: &ChannelModel) -> serde_json::Value {
    json!({
        "intercept": m.intercept,
        "pressure_coeff": m.pressure_coeff,
        "ambient_coeff": m.ambient_coeff,
        "temperature_coeff": m.temperature_coeff,
        "temperature_unit": m.temperature_unit.as_str(),
        "r_squared": m.r_squared,
        "rmse": m.rmse,
    })
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map_or_else(|| "-".to_string(), |x| format!("{x:.6}"))
}

fn print_report(channel: &str, report: &ChannelReport, json_mode: bool) {
    match &report.fit {
        Some(fit) => {
            if json_mode {
                let obj = json!({
                    "channel": channel,
                    "status": "ok",
                    "path": fit.path.as_str(),
                    "rows_used": fit.rows_used,
                    "rows_dropped": report.rows_dropped,
                    "model": model_json(&fit.model),
                });
                println!("{obj}");
            } else {
                let m = &fit.model;
                println!(
                    "channel={channel} status=ok path={} rows={} dropped={} intercept={:.6} pressure_coeff={:.6} ambient_coeff={:.6} temperature_coeff={:.6} unit={} r2={} rmse={}",
                    fit.path.as_str(),
                    fit.rows_used,
                    report.rows_dropped,
                    m.intercept,
                    m.pressure_coeff,
                    m.ambient_coeff,
                    m.temperature_coeff,
                    m.temperature_unit,
                    fmt_opt(m.r_squared),
                    fmt_opt(m.rmse),
                );
            }
        }
        None => {
            if json_mode {
                let obj = json!({
                    "channel": channel,
                    "status": "insufficient_data",
                    "rows_dropped": report.rows_dropped,
                });
                println!("{obj}");
            } else {
                println!(
                    "channel={channel} status=insufficient_data dropped={}",
                    report.rows_dropped
                );
            }
        }
    }
}

fn print_failure(channel: &str, err: &axle_core::FitError, json_mode: bool) {
    if json_mode {
        println!(
            "{}",
            json!({ "channel": channel, "status": "error", "error": err.to_string() })
        );
    } else {
        println!("channel={channel} status=error error=\"{err}\"");
    }
}

/// Fit every channel, print one line each, then fail on the first fit error.
pub fn run_fit_channels(
    ctx: &Ctx,
    samples: &Path,
    only: Option<&str>,
    jobs_override: Option<usize>,
) -> Result<()> {
    let rows = load_rows(samples)?;
    let jobs = channel_jobs(&rows, ctx.unit, only);
    if let Some(ch) = only
        && jobs.is_empty()
    {
        eyre::bail!("channel '{ch}' not found in sample CSV");
    }
    let workers = jobs_override.unwrap_or(ctx.jobs);
    tracing::info!(channels = jobs.len(), workers, "fit start");

    let outcomes = axle_core::fit_channels(jobs, &ctx.fit, workers);
    let mut first_err: Option<(String, axle_core::FitError)> = None;
    for ChannelOutcome { channel, report } in outcomes {
        match report {
            Ok(r) => print_report(&channel, &r, ctx.json),
            Err(e) => {
                print_failure(&channel, &e, ctx.json);
                if first_err.is_none() {
                    first_err = Some((channel, e));
                }
            }
        }
    }
    if let Some((channel, e)) = first_err {
        return Err(eyre::Report::new(e).wrap_err(format!("fit failed for channel '{channel}'")));
    }
    tracing::info!("fit complete");
    Ok(())
}

fn steer_json(m: &SteerModel) -> serde_json::Value {
    json!({
        "intercept": m.intercept,
        "coefficient": m.coefficient,
        "r_squared": m.r_squared,
        "sessions_used": m.sessions_used,
    })
}

pub fn run_fit_steer(ctx: &Ctx, samples: &Path) -> Result<()> {
    let rows = load_rows(samples)?;
    let tagged: Vec<AxleSample> = rows.iter().map(AxleSample::from).collect();
    let sessions = axle_core::group_sessions(&tagged);
    let complete = sessions.iter().filter(|s| s.is_complete()).count();
    tracing::info!(sessions = sessions.len(), complete, "steer sessions grouped");

    match axle_core::fit_virtual_steer(&sessions, &ctx.fit) {
        Some(m) => {
            if ctx.json {
                let obj = json!({
                    "status": "ok",
                    "sessions": sessions.len(),
                    "complete_sessions": complete,
                    "model": steer_json(&m),
                });
                println!("{obj}");
            } else {
                println!(
                    "status=ok sessions={} complete={} intercept={:.6} coefficient={:.6} r2={:.6}",
                    sessions.len(),
                    complete,
                    m.intercept,
                    m.coefficient,
                    m.r_squared
                );
            }
        }
        None => {
            if ctx.json {
                let obj = json!({
                    "status": "insufficient_data",
                    "sessions": sessions.len(),
                    "complete_sessions": complete,
                    "required": ctx.fit.steer.min_sessions,
                });
                println!("{obj}");
            } else {
                println!(
                    "status=insufficient_data sessions={} complete={} required={}",
                    sessions.len(),
                    complete,
                    ctx.fit.steer.min_sessions
                );
            }
        }
    }
    Ok(())
}

pub fn run_predict(
    ctx: &Ctx,
    samples: &Path,
    channel: &str,
    bag: f64,
    ambient: f64,
    temperature: f64,
) -> Result<()> {
    let rows = load_rows(samples)?;
    let jobs = channel_jobs(&rows, ctx.unit, Some(channel));
    let Some(job) = jobs.into_iter().next() else {
        eyre::bail!("channel '{channel}' not found in sample CSV");
    };
    let model = axle_core::fit_channel(&job.samples, &ctx.fit)
        .wrap_err_with(|| format!("fit failed for channel '{channel}'"))?;
    let Some(model) = model else {
        eyre::bail!("channel '{channel}' has insufficient calibration data");
    };
    let weight: Pounds = model.predict(
        Psi(bag),
        Psi(ambient),
        Temperature {
            value: temperature,
            unit: ctx.unit,
        },
    );
    if ctx.json {
        println!(
            "{}",
            json!({ "channel": channel, "weight_lbs": weight.get(), "model": model_json(&model) })
        );
    } else {
        println!("channel={channel} weight_lbs={:.2}", weight.get());
    }
    Ok(())
}
