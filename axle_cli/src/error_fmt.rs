//! Human-readable error descriptions and structured JSON error formatting.

use axle_core::FitError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(fe) = err.downcast_ref::<FitError>() {
        let body = match fe {
            FitError::SingularSystem { det } => format!(
                "What happened: The calibration points cannot determine a model (determinant {det:e}).\nLikely causes: Every point was taken at (nearly) the same gauge pressure, so weight cannot be separated from offset.\nHow to fix: Record calibration points across a range of loads, then refit."
            ),
            FitError::NonFinite(what) => format!(
                "What happened: The fit produced a non-finite {what}.\nLikely causes: Extreme or corrupted readings in the sample CSV.\nHow to fix: Inspect the channel's samples for out-of-range values and remove them."
            ),
            FitError::InvalidConfig(msg) => format!(
                "What happened: Invalid fit configuration ({msg}).\nLikely causes: Out-of-range values in the [channel] section.\nHow to fix: Edit the config file, then rerun."
            ),
        };
        return format!("{body}\nContext: {err}");
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("sample csv must have headers") {
        return format!(
            "Invalid headers in sample CSV. Expected '{}'.",
            axle_config::SAMPLE_HEADERS.join(",")
        );
    }

    if lower.contains("invalid csv row") {
        return format!(
            "What happened: A sample CSV row could not be parsed.\nLikely causes: Non-numeric readings or a timestamp that is not RFC 3339.\nHow to fix: Correct the row and rerun. Original: {msg}"
        );
    }

    if lower.contains("insufficient calibration data") {
        return format!(
            "What happened: {msg}.\nLikely causes: Too few usable calibration points after filtering.\nHow to fix: Record more calibration points for this channel."
        );
    }

    if lower.contains("config") && (lower.contains("must be") || lower.contains("parse")) {
        return format!(
            "What happened: Configuration is invalid.\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file and try again. Original: {msg}"
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes for typed fit errors; everything else returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> u8 {
    match err.downcast_ref::<FitError>() {
        Some(FitError::SingularSystem { .. }) => 3,
        Some(FitError::NonFinite(_)) => 4,
        Some(FitError::InvalidConfig(_)) => 5,
        None => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<FitError>() {
        Some(FitError::SingularSystem { .. }) => "SingularSystem",
        Some(FitError::NonFinite(_)) => "NonFinite",
        Some(FitError::InvalidConfig(_)) => "InvalidConfig",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let mut obj = json!({ "reason": reason_name(err), "message": humanize(err) });
    if let Some(FitError::SingularSystem { det }) = err.downcast_ref::<FitError>() {
        obj["details"] = json!({ "determinant": det });
    }
    obj.to_string()
}
