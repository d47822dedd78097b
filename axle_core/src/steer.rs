//! Virtual steer axle estimate.
//!
//! Learns `steer_total ≈ intercept + coefficient * drive_total` from
//! calibration sessions in which both axle groups were weighed.

use crate::config::SteerFitCfg;
use axle_units::Pounds;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Logical axle set a sensing channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxleGroup {
    Steer,
    Drive,
    #[default]
    Other,
}

impl FromStr for AxleGroup {
    type Err = std::convert::Infallible;

    /// Unrecognized and empty tags map to `Other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "steer" => AxleGroup::Steer,
            "drive" => AxleGroup::Drive,
            _ => AxleGroup::Other,
        })
    }
}

/// A calibration weight tagged with its axle group and session identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AxleSample {
    pub weight: Pounds,
    pub occurred_at: DateTime<Utc>,
    pub session_key: Option<String>,
    pub group: AxleGroup,
}

/// How samples are bucketed into sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionKey {
    /// Operator-supplied ticket number.
    Ticket(String),
    /// Unix minute the sample was taken in.
    Minute(i64),
}

impl SessionKey {
    /// Ticket when present and non-blank, otherwise the timestamp truncated to the minute.
    pub fn for_sample(session_key: Option<&str>, occurred_at: DateTime<Utc>) -> Self {
        match session_key.map(str::trim) {
            Some(t) if !t.is_empty() => SessionKey::Ticket(t.to_string()),
            _ => SessionKey::Minute(occurred_at.timestamp().div_euclid(60)),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKey::Ticket(t) => write!(f, "ticket:{t}"),
            SessionKey::Minute(m) => match DateTime::<Utc>::from_timestamp(m * 60, 0) {
                Some(ts) => write!(f, "minute:{}", ts.format("%Y-%m-%dT%H:%MZ")),
                None => write!(f, "minute:{m}"),
            },
        }
    }
}

/// Steer and drive totals observed together.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationSession {
    pub key: SessionKey,
    pub steer_total: Pounds,
    pub drive_total: Pounds,
}

impl CalibrationSession {
    /// Both totals strictly positive.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.steer_total.get() > 0.0 && self.drive_total.get() > 0.0
    }
}

/// Group tagged samples into sessions, in order of first appearance.
///
/// Two untagged sessions recorded within the same wall-clock minute merge.
pub fn group_sessions(samples: &[AxleSample]) -> Vec<CalibrationSession> {
    let mut index: HashMap<SessionKey, usize> = HashMap::new();
    let mut sessions: Vec<CalibrationSession> = Vec::new();
    for s in samples {
        let key = SessionKey::for_sample(s.session_key.as_deref(), s.occurred_at);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            sessions.push(CalibrationSession {
                key,
                steer_total: Pounds(0.0),
                drive_total: Pounds(0.0),
            });
            sessions.len() - 1
        });
        let session = &mut sessions[slot];
        match s.group {
            AxleGroup::Steer => session.steer_total = session.steer_total + s.weight,
            AxleGroup::Drive => session.drive_total = session.drive_total + s.weight,
            AxleGroup::Other => {}
        }
    }
    sessions
}

/// Fitted drive-to-steer model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteerModel {
    pub intercept: f64,
    pub coefficient: f64,
    /// Zero when every session reported the same steer total.
    pub r_squared: f64,
    pub sessions_used: usize,
}

impl SteerModel {
    /// Estimated steer total for a drive total, clamped to non-negative.
    pub fn predict(&self, drive_total: Pounds) -> Pounds {
        Pounds(self.intercept + self.coefficient * drive_total.get()).non_negative()
    }
}

/// Ordinary least squares of steer on drive over complete sessions.
///
/// Returns `None` with fewer than `cfg.min_sessions` complete sessions, or
/// when every drive total is the same.
pub fn fit(sessions: &[CalibrationSession], cfg: &SteerFitCfg) -> Option<SteerModel> {
    let pairs: Vec<(f64, f64)> = sessions
        .iter()
        .filter(|s| s.is_complete())
        .map(|s| (s.drive_total.get(), s.steer_total.get()))
        .collect();
    if pairs.len() < cfg.min_sessions {
        tracing::debug!(
            complete = pairs.len(),
            total = sessions.len(),
            required = cfg.min_sessions,
            "not enough complete steer sessions"
        );
        return None;
    }

    let n = pairs.len() as f64;
    let (sum_x, sum_y, sum_xx, sum_xy, sum_yy) = pairs.iter().fold(
        (0.0, 0.0, 0.0, 0.0, 0.0),
        |(sx, sy, sxx, sxy, syy), &(x, y)| (sx + x, sy + y, sxx + x * x, sxy + x * y, syy + y * y),
    );

    let denom = n * sum_xx - sum_x * sum_x;
    // Relative guard: identical drive totals cancel to rounding noise, not exactly zero.
    if !denom.is_finite() || denom.abs() <= 1e-12 * (n * sum_xx).max(1.0) {
        tracing::debug!("drive totals have no variance");
        return None;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / n;
    if !(slope.is_finite() && intercept.is_finite()) {
        return None;
    }

    let y_mean = sum_y / n;
    let (ss_res, ss_tot) = pairs.iter().fold((0.0, 0.0), |(res, tot), &(x, y)| {
        let y_hat = intercept + slope * x;
        (res + (y - y_hat).powi(2), tot + (y - y_mean).powi(2))
    });
    let r_squared = if ss_tot <= f64::EPSILON * sum_yy {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    };

    tracing::debug!(
        sessions = pairs.len(),
        intercept,
        coefficient = slope,
        r_squared,
        "virtual steer fit"
    );
    Some(SteerModel {
        intercept,
        coefficient: slope,
        r_squared,
        sessions_used: pairs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ticket_falls_back_to_minute() {
        let ts = DateTime::<Utc>::from_timestamp(125, 0).unwrap();
        assert_eq!(SessionKey::for_sample(Some("  "), ts), SessionKey::Minute(2));
        assert_eq!(SessionKey::for_sample(None, ts), SessionKey::Minute(2));
        assert_eq!(
            SessionKey::for_sample(Some(" T-17 "), ts),
            SessionKey::Ticket("T-17".into())
        );
    }

    #[test]
    fn minute_bucket_floors_before_epoch() {
        let ts = DateTime::<Utc>::from_timestamp(-1, 0).unwrap();
        assert_eq!(SessionKey::for_sample(None, ts), SessionKey::Minute(-1));
    }

    #[test]
    fn axle_group_tags() {
        assert_eq!("STEER".parse::<AxleGroup>().unwrap(), AxleGroup::Steer);
        assert_eq!("drive".parse::<AxleGroup>().unwrap(), AxleGroup::Drive);
        assert_eq!("".parse::<AxleGroup>().unwrap(), AxleGroup::Other);
        assert_eq!("trailer".parse::<AxleGroup>().unwrap(), AxleGroup::Other);
    }
}
