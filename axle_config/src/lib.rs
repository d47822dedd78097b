#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration sample loading for the axle calibration tools.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every section is optional; omitted values take the engine defaults.
//! - The sample CSV loader enforces exact headers and fails on the first
//!   unparseable row. Semantic filtering (weights, deadband) is left to the engine.
use axle_units::TempUnit;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

/// Calibration sample CSV schema.
///
/// Expected headers:
/// channel,occurred_at,scale_weight,bag_pressure,ambient_pressure,air_temperature,session_key,axle_group
///
/// Example:
/// channel,occurred_at,scale_weight,bag_pressure,ambient_pressure,air_temperature,session_key,axle_group
/// left-drive,2024-05-01T14:03:10Z,8420.0,46.2,14.7,68.0,T-1001,drive
/// steer,2024-05-01T14:03:40Z,11020.0,61.9,14.7,68.0,T-1001,steer
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SampleRow {
    pub channel: String,
    pub occurred_at: DateTime<Utc>,
    /// Known scale weight (lbs).
    pub scale_weight: f64,
    /// Absolute bladder pressure (psi).
    pub bag_pressure: f64,
    /// Absolute atmospheric pressure (psi).
    pub ambient_pressure: f64,
    /// Air temperature in the unit configured under `[units]`.
    pub air_temperature: f64,
    pub session_key: Option<String>,
    pub axle_group: Option<String>,
}

pub const SAMPLE_HEADERS: [&str; 8] = [
    "channel",
    "occurred_at",
    "scale_weight",
    "bag_pressure",
    "ambient_pressure",
    "air_temperature",
    "session_key",
    "axle_group",
];

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterCfg {
    /// Gauge pressure deadband (psi); rows at or below are dropped.
    pub deadband_psi: f64,
    /// Rows with scale weight at or below this are dropped.
    pub min_weight_lbs: f64,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self {
            deadband_psi: 0.01,
            min_weight_lbs: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChannelCfg {
    pub min_ridge_samples: usize,
    pub full_trust_samples: usize,
    pub ridge_base_lambda: f64,
    pub ridge_reference_n: usize,
    pub ridge_n_cap: usize,
    /// Max temperature contribution as a fraction of typical weight
    pub temperature_effect_cap: f64,
    pub scale_factor_guard: f64,
    pub singular_det_eps: f64,
    /// Total sum of squares below this leaves r² unreported
    pub degenerate_sstot_eps: f64,
}

impl Default for ChannelCfg {
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

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SteerCfg {
    pub min_sessions: usize,
}

impl Default for SteerCfg {
    fn default() -> Self {
        Self { min_sessions: 3 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Units {
    /// "fahrenheit" | "celsius" (default fahrenheit)
    pub temperature: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Batch {
    /// Worker threads for multi-channel fits; 0 = one per core
    pub jobs: usize,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub filter: FilterCfg,
    pub channel: ChannelCfg,
    pub steer: SteerCfg,
    pub units: Units,
    pub batch: Batch,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_config_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()
        .map_err(|e| eyre::eyre!("invalid config {:?}: {}", path, e))?;
    Ok(cfg)
}

impl Config {
    /// Temperature unit the sample CSV is recorded in.
    pub fn temperature_unit(&self) -> eyre::Result<TempUnit> {
        match self.units.temperature.as_deref() {
            None => Ok(TempUnit::default()),
            Some(s) => s
                .parse::<TempUnit>()
                .map_err(|e| eyre::eyre!("units.temperature: {e}")),
        }
    }

    /// Check everything except `[channel]`, whose ranges belong to the fitter
    /// (`axle_core::ChannelFitCfg::validate`).
    pub fn validate(&self) -> eyre::Result<()> {
        // Filter
        if !self.filter.deadband_psi.is_finite() || self.filter.deadband_psi < 0.0 {
            eyre::bail!("filter.deadband_psi must be >= 0.0");
        }
        if !self.filter.min_weight_lbs.is_finite() || self.filter.min_weight_lbs < 0.0 {
            eyre::bail!("filter.min_weight_lbs must be >= 0.0");
        }

        // Steer
        if self.steer.min_sessions < 2 {
            eyre::bail!("steer.min_sessions must be >= 2");
        }

        // Units
        self.temperature_unit()?;

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got '{rot}'");
        }

        Ok(())
    }
}

/// Parse calibration samples from any CSV reader, enforcing exact headers.
pub fn parse_samples_csv<R: std::io::Read>(reader: R) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers: {}", e))?
        .clone();
    let actual: Vec<&str> = headers.iter().collect();
    if actual != SAMPLE_HEADERS {
        eyre::bail!(
            "sample CSV must have headers '{}', got: {}",
            SAMPLE_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    Ok(rows)
}

pub fn load_samples_csv(path: &Path) -> eyre::Result<Vec<SampleRow>> {
    let file = std::fs::File::open(path)
        .map_err(|e| eyre::eyre!("open sample CSV {:?}: {}", path, e))?;
    parse_samples_csv(file).map_err(|e| eyre::eyre!("{:?}: {}", path, e))
}
