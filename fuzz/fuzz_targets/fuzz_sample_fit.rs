#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary CSV through the loader and into both fitters: errors are fine, panics are not.
    let Ok(rows) = axle_config::parse_samples_csv(data) else {
        return;
    };
    let cfg = axle_core::FitCfg::default();
    let samples: Vec<_> = rows
        .iter()
        .map(|r| axle_core::CalibrationSample::from_row(r, axle_core::TempUnit::Fahrenheit))
        .collect();
    let _ = axle_core::fit_channel(&samples, &cfg);
    let tagged: Vec<axle_core::AxleSample> = rows.iter().map(axle_core::AxleSample::from).collect();
    let sessions = axle_core::group_sessions(&tagged);
    let _ = axle_core::fit_virtual_steer(&sessions, &cfg);
});
