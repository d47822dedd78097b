use axle_core::{
    AxleGroup, AxleSample, CalibrationSession, FitCfg, Pounds, SessionKey, fit_virtual_steer,
    group_sessions,
};
use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

fn session(drive: f64, steer: f64) -> CalibrationSession {
    CalibrationSession {
        key: SessionKey::Ticket(format!("T-{drive}")),
        steer_total: Pounds(steer),
        drive_total: Pounds(drive),
    }
}

fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap()
}

fn tagged(weight: f64, ts: DateTime<Utc>, ticket: Option<&str>, group: AxleGroup) -> AxleSample {
    AxleSample {
        weight: Pounds(weight),
        occurred_at: ts,
        session_key: ticket.map(str::to_string),
        group,
    }
}

#[rstest]
fn two_sessions_are_not_enough() {
    let sessions = vec![session(10_000.0, 7_000.0), session(12_000.0, 8_000.0)];
    assert!(fit_virtual_steer(&sessions, &FitCfg::default()).is_none());
}

#[rstest]
fn three_collinear_sessions_fit_exactly() {
    let sessions = vec![
        session(10_000.0, 7_000.0),
        session(12_000.0, 8_000.0),
        session(14_000.0, 9_000.0),
    ];
    let m = fit_virtual_steer(&sessions, &FitCfg::default()).expect("model");
    assert!((m.r_squared - 1.0).abs() < 1e-6);
    assert!((m.coefficient - 0.5).abs() < 1e-9);
    assert!((m.intercept - 2_000.0).abs() < 1e-6);
    assert_eq!(m.sessions_used, 3);
    assert!((m.predict(Pounds(16_000.0)).get() - 10_000.0).abs() < 1e-6);
}

#[rstest]
fn incomplete_sessions_are_skipped() {
    let sessions = vec![
        session(10_000.0, 7_000.0),
        session(11_000.0, 0.0),
        session(12_000.0, 8_000.0),
        session(0.0, 7_700.0),
        session(14_000.0, 9_000.0),
    ];
    let m = fit_virtual_steer(&sessions, &FitCfg::default()).expect("model");
    assert_eq!(m.sessions_used, 3);

    let short = &sessions[..4];
    assert!(fit_virtual_steer(short, &FitCfg::default()).is_none());
}

#[rstest]
#[case(10_000.0)]
#[case(10_000.1)]
#[case(33_333.3)]
fn identical_drive_totals_give_no_model(#[case] drive: f64) {
    let sessions = vec![
        session(drive, 7_000.0),
        session(drive, 7_400.0),
        session(drive, 6_900.0),
    ];
    assert!(fit_virtual_steer(&sessions, &FitCfg::default()).is_none());
}

#[rstest]
fn identical_steer_totals_report_zero_r_squared() {
    let sessions = vec![
        session(10_000.0, 7_000.0),
        session(12_500.0, 7_000.0),
        session(15_000.0, 7_000.0),
    ];
    let m = fit_virtual_steer(&sessions, &FitCfg::default()).expect("model");
    assert_eq!(m.r_squared, 0.0);
    assert!(m.coefficient.abs() < 1e-9);
}

#[rstest]
fn noisy_sessions_fit_reasonably() {
    let sessions = vec![
        session(9_800.0, 6_950.0),
        session(11_200.0, 7_580.0),
        session(12_900.0, 8_490.0),
        session(14_100.0, 9_020.0),
        session(15_600.0, 9_840.0),
    ];
    let m = fit_virtual_steer(&sessions, &FitCfg::default()).expect("model");
    assert!(m.r_squared > 0.99 && m.r_squared <= 1.0);
    assert!((m.coefficient - 0.5).abs() < 0.05);
}

#[rstest]
fn predictions_clamp_at_zero() {
    let sessions = vec![
        session(10_000.0, 1_000.0),
        session(12_000.0, 3_000.0),
        session(14_000.0, 5_000.0),
    ];
    let m = fit_virtual_steer(&sessions, &FitCfg::default()).unwrap();
    assert_eq!(m.predict(Pounds(1_000.0)), Pounds(0.0));
}

#[rstest]
fn groups_by_ticket_then_minute() {
    let samples = vec![
        tagged(4_100.0, at(9, 0, 5), Some("T-1"), AxleGroup::Drive),
        tagged(4_200.0, at(9, 0, 30), Some("T-1"), AxleGroup::Drive),
        tagged(6_900.0, at(9, 4, 0), Some("T-1"), AxleGroup::Steer),
        // untagged, same minute -> one session
        tagged(5_000.0, at(10, 15, 1), None, AxleGroup::Drive),
        tagged(7_100.0, at(10, 15, 59), Some(" "), AxleGroup::Steer),
        // next minute -> separate session
        tagged(3_000.0, at(10, 16, 0), None, AxleGroup::Steer),
        // trailer weights never count
        tagged(9_999.0, at(9, 1, 0), Some("T-1"), AxleGroup::Other),
    ];
    let sessions = group_sessions(&samples);
    assert_eq!(sessions.len(), 3);

    assert_eq!(sessions[0].key, SessionKey::Ticket("T-1".into()));
    assert_eq!(sessions[0].drive_total, Pounds(8_300.0));
    assert_eq!(sessions[0].steer_total, Pounds(6_900.0));
    assert!(sessions[0].is_complete());

    assert!(matches!(sessions[1].key, SessionKey::Minute(_)));
    assert_eq!(sessions[1].drive_total, Pounds(5_000.0));
    assert_eq!(sessions[1].steer_total, Pounds(7_100.0));

    assert_eq!(sessions[2].drive_total, Pounds(0.0));
    assert!(!sessions[2].is_complete());
}

#[rstest]
fn minute_session_key_displays_utc_minute() {
    let key = SessionKey::for_sample(None, at(10, 15, 42));
    assert_eq!(key.to_string(), "minute:2024-05-01T10:15Z");
    assert_eq!(
        SessionKey::Ticket("T-9".into()).to_string(),
        "ticket:T-9"
    );
}
