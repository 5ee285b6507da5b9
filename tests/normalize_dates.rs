use poolcharts::SeriesCatalog;
use poolcharts::models::Record;
use poolcharts::normalize::{normalize, parse_date, to_raw};
use std::collections::BTreeSet;

fn ratio_fields() -> BTreeSet<String> {
    SeriesCatalog::aggregate().ratio_fields()
}

#[test]
fn unparseable_dates_are_dropped() {
    let raw = vec![
        Record::new("2024-01-02").with("token_usd_amount", 2.0),
        Record::new("not-a-date").with("token_usd_amount", 99.0),
        Record::new("2024-01-01").with("token_usd_amount", 1.0),
    ];
    let out = normalize(&raw, &ratio_fields());
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|r| r.date != "not-a-date"));
}

#[test]
fn records_come_out_in_date_order() {
    let raw = vec![
        Record::new("2024-01-03").with("token_usd_amount", 3.0),
        Record::new("2024-01-01").with("token_usd_amount", 1.0),
        Record::new("2024-01-02T00:00:00Z").with("token_usd_amount", 2.0),
    ];
    let out = normalize(&raw, &ratio_fields());
    let values: Vec<f64> = out.iter().map(|r| r.fields["token_usd_amount"]).collect();
    assert_eq!(values, vec![1.0, 2.0, 3.0]);
    // original text survives for labels
    assert_eq!(out[1].date, "2024-01-02T00:00:00Z");
}

#[test]
fn equal_dates_keep_payload_order() {
    let raw = vec![
        Record::new("2024-01-01").with("token_usd_amount", 1.0),
        Record::new("2024-01-01 00:00:00").with("token_usd_amount", 2.0),
    ];
    let out = normalize(&raw, &ratio_fields());
    assert_eq!(out[0].fields["token_usd_amount"], 1.0);
    assert_eq!(out[1].fields["token_usd_amount"], 2.0);
}

#[test]
fn ratio_fields_become_percentage_points() {
    let raw = vec![
        Record::new("2024-01-01")
            .with("percentage_change_in_usd", 0.05)
            .with("adjusted_percentage_change_in_usd", 0.02)
            .with("weth_change_in_price_percentage", -0.1)
            .with("tvl_to_incentive_roi_percentage", 12.0)
            .with("token_usd_amount", 1000.0),
    ];
    let out = normalize(&raw, &ratio_fields());
    let r = &out[0];
    assert!((r.fields["percentage_change_in_usd"] - 5.0).abs() < 1e-9);
    assert!((r.fields["adjusted_percentage_change_in_usd"] - 2.0).abs() < 1e-9);
    assert!((r.fields["weth_change_in_price_percentage"] + 10.0).abs() < 1e-9);
    // not ratio-tagged: untouched
    assert_eq!(r.fields["tvl_to_incentive_roi_percentage"], 12.0);
    assert_eq!(r.fields["token_usd_amount"], 1000.0);
}

#[test]
fn normalizing_twice_scales_ratios_twice() {
    let raw = vec![Record::new("2024-01-01").with("percentage_change_in_usd", 0.05)];
    let once = normalize(&raw, &ratio_fields());
    let twice = normalize(&to_raw(&once), &ratio_fields());
    assert!((once[0].fields["percentage_change_in_usd"] - 5.0).abs() < 1e-9);
    assert!((twice[0].fields["percentage_change_in_usd"] - 500.0).abs() < 1e-9);
    assert_ne!(once, twice);
}

#[test]
fn nan_values_pass_through_unchanged() {
    let raw = vec![Record::new("2024-01-01").with("percentage_change_in_usd", f64::NAN)];
    let out = normalize(&raw, &ratio_fields());
    assert!(out[0].fields["percentage_change_in_usd"].is_nan());
}

#[test]
fn unix_seconds_are_accepted() {
    let ts = parse_date("1704153600").unwrap();
    assert_eq!(ts, parse_date("2024-01-02").unwrap());
}
