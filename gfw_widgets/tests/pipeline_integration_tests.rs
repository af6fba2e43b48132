//! Integration tests driving the widget pipeline from analytics JSON to
//! sentence and chart configuration.

use chrono::NaiveDate;
use serde_json::json;

use gfw_widgets::config::PipelineConfig;
use gfw_widgets::models::{CompareYear, Indicator, RawObservation, StatusBand, WidgetSettings};
use gfw_widgets::preprocessing::WidgetPipeline;
use gfw_widgets::services::cumulative::compute_cumulative;
use gfw_widgets::services::densify::{densify, densify_full_years};
use gfw_widgets::time::{week_start, FixedClock, WeekCalendar};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn pipeline_at(today: NaiveDate, config: PipelineConfig) -> WidgetPipeline<FixedClock> {
    WidgetPipeline::with_clock(config, FixedClock::new(today))
}

/// Weeks 1..=10 of 2018..=2021 at 10 alerts, with 2021 week 5 set to `spike`.
fn spike_payload(spike: u32) -> String {
    let mut rows = Vec::new();
    for year in 2018..=2021 {
        for week in 1..=10 {
            let count = if year == 2021 && week == 5 { spike } else { 10 };
            rows.push(json!({
                "alert__year": year,
                "alert__week": week,
                "alert__count": count,
            }));
        }
    }
    json!({ "alerts": rows, "latest": "2021-02-07" }).to_string()
}

#[test]
fn test_single_observation_fills_long_year() {
    let observations = vec![RawObservation::new(2020, 52, 5.0)];
    let calendar = WeekCalendar::new(ymd(2021, 1, 15), 14);
    let points = densify(&observations, 2020, &calendar).unwrap();

    assert_eq!(points.len(), 53);
    assert_eq!(points.iter().filter(|p| p.count == Some(5.0)).count(), 1);
    assert_eq!(points[51].week, 52);
    assert_eq!(points[51].count, Some(5.0));
}

#[test]
fn test_weekly_spike_reported_as_unusually_high() {
    // anchor 2021-02-07 is the Sunday closing week 5
    let mut pipeline = pipeline_at(ymd(2021, 2, 21), PipelineConfig::default());
    let snapshot = pipeline.snapshot_from_json(&spike_payload(40)).unwrap();

    let stats = pipeline.weekly_stats(&snapshot).unwrap();
    let week_5 = stats.iter().find(|s| s.week() == 5).unwrap();
    assert_eq!(week_5.status(), StatusBand::UnusuallyHigh);

    let output = pipeline.weekly_output(&snapshot).unwrap();
    assert_eq!(output.data.last().unwrap().week(), 5);
    assert_eq!(output.sentence.param("status").unwrap().value(), "unusually high");
    assert_eq!(output.sentence.param("count").unwrap().value(), "40");
    assert_eq!(output.config.latest, Some(ymd(2021, 2, 7)));
}

#[test]
fn test_weekly_sentence_without_indicator_or_threshold() {
    let config = PipelineConfig::default();
    let default_template = config.templates.weekly.default.clone();
    let mut pipeline = pipeline_at(ymd(2021, 2, 21), config);
    let snapshot = pipeline
        .snapshot_from_json(&spike_payload(10))
        .unwrap()
        .with_settings(WidgetSettings {
            threshold: Some(0.0),
            ..Default::default()
        });

    let sentence = pipeline.weekly_sentence(&snapshot).unwrap();
    assert_eq!(sentence.template, default_template);
    assert!(sentence.param("threshold").is_none());
}

#[test]
fn test_weekly_sentence_with_indicator() {
    let mut pipeline = pipeline_at(ymd(2021, 2, 21), PipelineConfig::default());
    let snapshot = pipeline
        .snapshot_from_json(&spike_payload(10))
        .unwrap()
        .with_settings(WidgetSettings {
            indicator: Some(Indicator {
                value: "primary_forest".to_string(),
                label: "primary forests".to_string(),
            }),
            ..Default::default()
        });

    let sentence = pipeline.weekly_sentence(&snapshot).unwrap();
    assert!(sentence.template.contains("{indicator}"));
    assert_eq!(sentence.param("indicator").unwrap().value(), "primary forests");
}

#[test]
fn test_cumulative_compare_year_realignment() {
    let mut observations = Vec::new();
    for week in 1..=4 {
        let count = if week == 3 { 7.0 } else { 1.0 };
        observations.push(RawObservation::new(2020, week, count));
        observations.push(RawObservation::new(2021, week, 2.0));
    }
    let calendar = WeekCalendar::new(ymd(2021, 2, 14), 14);
    let points = densify_full_years(&observations, 2020, &calendar).unwrap();
    let series = compute_cumulative(&points, Some(&[2020])).unwrap();

    let week_3 = series.points.iter().find(|p| p.week() == 3).unwrap();
    assert_eq!(week_3.count(), Some(6.0));
    assert_eq!(week_3.compare_value(2020), Some(9.0));
}

#[test]
fn test_cumulative_widget_from_json() {
    let rows: Vec<_> = (2019..=2021)
        .flat_map(|year| {
            (1..=8).flat_map(move |week| {
                [
                    json!({"alert__year": year, "alert__week": week, "alert__count": 3, "confidence__cat": "h"}),
                    json!({"alert__year": year, "alert__week": week, "alert__count": "2", "confidence__cat": "n"}),
                ]
            })
        })
        .collect();
    let payload = json!({ "alerts": rows, "latest": "2021-02-28T00:00:00Z" }).to_string();

    let config = PipelineConfig::from_toml_str(
        r#"
        [dataset]
        name = "viirs"
        mapping = "fires"
        "#,
    )
    .unwrap();
    let mut pipeline = pipeline_at(ymd(2021, 3, 14), config);
    let snapshot = pipeline
        .snapshot_from_json(&payload)
        .unwrap()
        .with_location("Brazil")
        .with_settings(WidgetSettings {
            compare_year: Some(CompareYear::Year(2020)),
            ..Default::default()
        });

    let output = pipeline.cumulative_output(&snapshot).unwrap();
    // 2021 runs to 52 weeks, reported through week 8
    assert_eq!(output.original_data.len(), 52);
    assert_eq!(output.original_data[7].count(), Some(40.0));
    assert_eq!(output.original_data[7].compare_value(2020), Some(40.0));
    assert_eq!(output.original_data[8].count(), None);

    let sentence = &output.sentence;
    assert_eq!(sentence.param("count").unwrap().value(), "40");
    assert_eq!(sentence.param("dataset").unwrap().value(), "VIIRS");
    assert_eq!(sentence.param("location").unwrap().value(), "Brazil");

    let config = &output.config;
    assert_eq!(config.tooltip.len(), 2);
    assert_eq!(config.tooltip[1].key, "2020");
    assert_eq!(config.reference_line.as_ref().unwrap().x, week_start(2021, 8).unwrap());
    assert_eq!(config.latest, Some(ymd(2021, 2, 28)));

    let serialized = serde_json::to_value(output.as_ref()).unwrap();
    assert_eq!(serialized["originalData"][7]["2020"], json!(40.0));
    assert_eq!(serialized["originalData"][7]["date"], json!("2021-02-22"));
}

#[test]
fn test_missing_alerts_yield_no_output() {
    let mut pipeline = pipeline_at(ymd(2021, 3, 14), PipelineConfig::default());
    let snapshot = pipeline.snapshot_from_json(r#"{"latest": "2021-02-28"}"#).unwrap();

    assert!(snapshot.observations.is_none());
    assert!(pipeline.weekly_output(&snapshot).is_none());
    assert!(pipeline.cumulative_output(&snapshot).is_none());
}

#[test]
fn test_malformed_rows_are_dropped() {
    let payload = json!({
        "alerts": [
            {"alert__year": 2020, "alert__week": 2, "alert__count": 4},
            {"alert__year": 2020, "alert__week": 60, "alert__count": 4},
            {"alert__year": 2020, "alert__count": 4},
            {"alert__year": 2021, "alert__week": 2, "alert__count": 6},
        ],
        "latest": "2021-01-17",
    })
    .to_string();

    let mut pipeline = pipeline_at(ymd(2021, 1, 31), PipelineConfig::default());
    let snapshot = pipeline.snapshot_from_json(&payload).unwrap();
    assert_eq!(snapshot.observations.as_ref().unwrap().len(), 2);

    let stats = pipeline.weekly_stats(&snapshot).unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[1].count(), Some(6.0));
    assert_eq!(stats[1].mean, 4.0);
}

#[test]
fn test_config_lag_moves_last_week() {
    let config = PipelineConfig::from_toml_str("[calendar]\nlag_days = 0").unwrap();
    let mut pipeline = pipeline_at(ymd(2021, 2, 21), config);
    let snapshot = pipeline.snapshot_from_json(&spike_payload(10)).unwrap();

    // without lag, 2021-02-21 itself closes week 7
    let stats = pipeline.weekly_stats(&snapshot).unwrap();
    assert_eq!(stats.last().unwrap().week(), 7);
}

#[test]
fn test_snapshot_uses_config_palette() {
    let config = PipelineConfig::from_toml_str("[palette]\nmain = \"#123456\"").unwrap();
    let mut pipeline = pipeline_at(ymd(2021, 2, 21), config);
    let snapshot = pipeline.snapshot_from_json(&spike_payload(10)).unwrap();

    let sentence = pipeline.weekly_sentence(&snapshot).unwrap();
    assert_eq!(sentence.param("count").unwrap().color(), Some("#123456"));
}

#[test]
fn test_cumulative_null_tail_follows_latest_not_clock() {
    let rows: Vec<_> = (2020..=2021)
        .flat_map(|year| {
            (1..=20).map(move |week| {
                json!({"alert__year": year, "alert__week": week, "alert__count": 1})
            })
        })
        .collect();
    let payload = json!({ "alerts": rows, "latest": "2021-02-28" }).to_string();

    let mut pipeline = pipeline_at(ymd(2021, 6, 20), PipelineConfig::default());
    let snapshot = pipeline.snapshot_from_json(&payload).unwrap();
    let output = pipeline.cumulative_output(&snapshot).unwrap();

    assert_eq!(output.original_data[7].count(), Some(8.0));
    assert!(output.original_data[8..].iter().all(|p| p.count().is_none()));
    assert_eq!(output.config.reference_line.as_ref().unwrap().x, week_start(2021, 8).unwrap());
}
