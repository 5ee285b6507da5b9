use poolcharts::catalog::Axis;
use poolcharts::domain::{AxisDomain, AxisScale, axis_domain, domain, families_for_axis};
use poolcharts::models::Record;
use poolcharts::normalize::normalize;
use poolcharts::{ChartError, SeriesCatalog, VisibilityMap};
use std::collections::BTreeSet;

fn two_day_tvl() -> Vec<poolcharts::NormalizedRecord> {
    let raw = vec![
        Record::new("2024-01-01").with("token_usd_amount", 100.0),
        Record::new("2024-01-02").with("token_usd_amount", 200.0),
    ];
    normalize(&raw, &BTreeSet::new())
}

#[test]
fn visible_magnitude_series_is_padded_ten_percent() {
    let records = two_day_tvl();
    let vis = VisibilityMap::new(["token_usd_amount"]);
    let d = domain(&records, &["token_usd_amount"], &vis, AxisScale::Magnitude);
    assert_eq!(d, AxisDomain::new(90.0, 220.0));
}

#[test]
fn all_hidden_axis_falls_back_to_unit_range() {
    let records = two_day_tvl();
    let vis = VisibilityMap::new(["token_usd_amount"])
        .toggle("token_usd_amount")
        .unwrap();
    let d = domain(&records, &["token_usd_amount"], &vis, AxisScale::Magnitude);
    assert_eq!(d, AxisDomain::new(0.0, 1.0));
}

#[test]
fn toggle_off_then_on_restores_domain() {
    let raw = vec![
        Record::new("2024-01-01")
            .with("token_usd_amount", 100.0)
            .with("raw_change_in_usd", 5_000.0),
        Record::new("2024-01-02")
            .with("token_usd_amount", 200.0)
            .with("raw_change_in_usd", 7_000.0),
    ];
    let records = normalize(&raw, &BTreeSet::new());
    let keys = ["token_usd_amount", "raw_change_in_usd"];
    let vis = VisibilityMap::new(keys);
    let before = domain(&records, &keys, &vis, AxisScale::Magnitude);

    let hidden = vis.toggle("raw_change_in_usd").unwrap();
    let shrunk = domain(&records, &keys, &hidden, AxisScale::Magnitude);
    assert_eq!(shrunk, AxisDomain::new(90.0, 220.0), "hidden series must not count");

    let restored = hidden.toggle("raw_change_in_usd").unwrap();
    assert_eq!(restored, vis);
    assert_eq!(domain(&records, &keys, &restored, AxisScale::Magnitude), before);
}

#[test]
fn toggle_only_flips_one_key() {
    let vis = VisibilityMap::new(["a", "b", "c"]);
    let next = vis.toggle("b").unwrap();
    assert!(next.is_visible("a"));
    assert!(!next.is_visible("b"));
    assert!(next.is_visible("c"));
    assert_eq!(next.hidden_count(), 1);
    // the original map is untouched
    assert!(vis.is_visible("b"));
}

#[test]
fn unknown_key_is_an_error_and_changes_nothing() {
    let mut vis = VisibilityMap::new(["a"]);
    assert_eq!(
        vis.toggle("nope"),
        Err(ChartError::UnknownSeries("nope".to_string()))
    );
    assert!(vis.toggle_in_place("nope").is_err());
    assert_eq!(vis, VisibilityMap::new(["a"]));
    assert!(!vis.is_visible("nope"));
}

#[test]
fn nan_values_do_not_poison_the_domain() {
    let raw = vec![
        Record::new("2024-01-01").with("token_usd_amount", 100.0),
        Record::new("2024-01-02").with("token_usd_amount", f64::NAN),
        Record::new("2024-01-03").with("token_usd_amount", 200.0),
    ];
    let records = normalize(&raw, &BTreeSet::new());
    let vis = VisibilityMap::new(["token_usd_amount"]);
    let d = domain(&records, &["token_usd_amount"], &vis, AxisScale::Magnitude);
    assert_eq!(d, AxisDomain::new(90.0, 220.0));
}

#[test]
fn stacked_axis_covers_running_totals() {
    let catalog = SeriesCatalog::combo();
    let series = catalog.resolve(false);
    let raw = vec![
        Record::new("2024-01-01")
            .with("token_usd_amount", 100.0)
            .with("raw_change_in_usd", 50.0)
            .with("incentives_per_day_usd", 50.0),
    ];
    let records = normalize(&raw, &catalog.ratio_fields());
    let vis = VisibilityMap::new(catalog.all_keys());
    let families = families_for_axis(&series, Axis::Left);
    assert_eq!(families.len(), 1);
    assert!(families[0].stacked);

    let d = axis_domain(&records, &families, &vis, AxisScale::Magnitude);
    // extent 50..200 (stack top), padded
    assert_eq!(d, AxisDomain::new(45.0, 220.0));

    let vis = vis.toggle("incentives_per_day_usd").unwrap();
    let d = axis_domain(&records, &families, &vis, AxisScale::Magnitude);
    assert_eq!(d, AxisDomain::new(45.0, 165.0));
}

#[test]
fn negative_values_push_the_floor_down() {
    let raw = vec![
        Record::new("2024-01-01").with("raw_change_in_usd", -100.0),
        Record::new("2024-01-02").with("raw_change_in_usd", 50.0),
    ];
    let records = normalize(&raw, &BTreeSet::new());
    let vis = VisibilityMap::new(["raw_change_in_usd"]);
    let d = domain(&records, &["raw_change_in_usd"], &vis, AxisScale::Magnitude);
    assert_eq!(d, AxisDomain::new(-110.0, 55.0));
    assert!(d.contains(-100.0) && d.contains(50.0));
}
