use axle_core::channel;
use axle_core::{ChannelFitCfg, FilteredRow, Pounds, Psi, Temperature};
use proptest::prelude::*;

prop_compose! {
    fn rows_strategy(max_len: usize)(
        points in prop::collection::vec((0.5f64..80.0, 100.0f64..20_000.0, -20.0f64..110.0), 1..max_len),
    ) -> Vec<FilteredRow> {
        points
            .into_iter()
            .map(|(g, w, t)| FilteredRow::new(Pounds(w), Psi(14.7 + g), Psi(14.7), Temperature::fahrenheit(t)))
            .collect()
    }
}

fn max_abs_dt(rows: &[FilteredRow]) -> f64 {
    let t0 = rows.iter().map(|r| r.temperature.value).sum::<f64>() / rows.len() as f64;
    rows.iter()
        .map(|r| (r.temperature.value - t0).abs())
        .fold(0.0, f64::max)
}

proptest! {
    #[test]
    fn ambient_coefficient_mirrors_pressure(rows in rows_strategy(40)) {
        if let Ok(Some(m)) = channel::fit(&rows, &ChannelFitCfg::default()) {
            prop_assert_eq!(m.ambient_coeff, -m.pressure_coeff);
        }
    }

    #[test]
    fn low_data_fits_pass_through_origin(rows in rows_strategy(5)) {
        let m = channel::fit(&rows, &ChannelFitCfg::default()).unwrap().unwrap();
        prop_assert_eq!(m.intercept, 0.0);
        prop_assert_eq!(m.temperature_coeff, 0.0);
        prop_assert!(m.r_squared.is_none());
        prop_assert!(m.rmse.is_none());
    }

    #[test]
    fn temperature_effect_is_bounded(rows in rows_strategy(40)) {
        let n = rows.len();
        prop_assume!(n >= 5);
        if let Ok(Some(m)) = channel::fit(&rows, &ChannelFitCfg::default()) {
            let typical = rows.iter().map(|r| r.weight.get().abs()).sum::<f64>() / n as f64;
            let gamma = if n >= 20 { 0.01 } else { 0.01 * (n as f64 - 5.0) / 15.0 };
            let allowed = gamma * typical.max(1.0);
            let effect = m.temperature_coeff.abs() * max_abs_dt(&rows);
            prop_assert!(effect <= allowed * (1.0 + 1e-9) + 1e-12, "effect {} > allowed {}", effect, allowed);
        }
    }

    #[test]
    fn flat_temperature_means_no_temperature_term(rows in rows_strategy(40), t in -20.0f64..110.0) {
        let rows: Vec<FilteredRow> = rows
            .into_iter()
            .map(|r| FilteredRow { temperature: Temperature::fahrenheit(t), ..r })
            .collect();
        if let Ok(Some(m)) = channel::fit(&rows, &ChannelFitCfg::default()) {
            prop_assert_eq!(m.temperature_coeff, 0.0);
        }
    }

    #[test]
    fn fitting_is_deterministic(rows in rows_strategy(40)) {
        let copy = rows.clone();
        let a = channel::fit(&rows, &ChannelFitCfg::default());
        let b = channel::fit(&copy, &ChannelFitCfg::default());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn predictions_are_never_negative(rows in rows_strategy(40), bag in 0.0f64..120.0, t in -40.0f64..140.0) {
        if let Ok(Some(m)) = channel::fit(&rows, &ChannelFitCfg::default()) {
            let w = m.predict(Psi(bag), Psi(14.7), Temperature::fahrenheit(t));
            prop_assert!(w.get() >= 0.0);
        }
    }
}
