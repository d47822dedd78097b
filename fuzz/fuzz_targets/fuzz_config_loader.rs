#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject input but must never panic.
    if let Ok(cfg) = toml::from_str::<axle_config::Config>(data) {
        if cfg.validate().is_ok() {
            let unit = cfg.temperature_unit().unwrap_or_default();
            let _ = axle_core::FitCfg::from_config(&cfg, unit);
        }
    }
});
