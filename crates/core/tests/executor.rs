//! Executor tests against in-memory collaborators.

mod common;

use common::{
    ArchiveCall, FakeGeocoder, FakeWeather, PAIR, RecordingPresenter, Rendered, TABLES,
    WEEK_DATASET,
};
use weather_query_core::exec::Coordinates;
use weather_query_core::{Bar, DatasetStore, Executor, QueryValue, codes};
use weather_query_dataset::{Aggregate, Dataset};

struct Run {
    value: Option<QueryValue>,
    presenter: RecordingPresenter,
}

fn run_on(dataset: &dyn DatasetStore, geo: &FakeGeocoder, weather: &FakeWeather, line: &str) -> Run {
    let exec = Executor::new(&TABLES, dataset, geo, weather);
    let mut presenter = RecordingPresenter::default();
    let value = exec.submit(line, &mut presenter);
    Run { value, presenter }
}

fn run(line: &str) -> Run {
    run_on(
        &*WEEK_DATASET,
        &FakeGeocoder::default(),
        &FakeWeather::default(),
        line,
    )
}

fn only_result(run: &Run) -> &Rendered {
    let results = run.presenter.results();
    assert_eq!(results.len(), 1, "{:?}", run.presenter.entries);
    results[0]
}

// ─── Local Queries ──────────────────────────────────────────────────────────

#[test]
fn max_over_two_days() {
    let pair = Dataset::parse(PAIR).expect("fixture");
    let r = run_on(
        &pair,
        &FakeGeocoder::default(),
        &FakeWeather::default(),
        "max `temperature_max`",
    );
    assert_eq!(
        r.presenter.entries[0],
        Rendered::Echo("max `temperature_max`".into())
    );
    assert_eq!(only_result(&r), &Rendered::Generic("75°".into()));
    assert_eq!(r.value, Some(QueryValue::Scalar(75.0)));
}

#[test]
fn histogram_over_two_days() {
    let pair = Dataset::parse(PAIR).expect("fixture");
    let r = run_on(
        &pair,
        &FakeGeocoder::default(),
        &FakeWeather::default(),
        "histogram `temperature_max`",
    );
    let bars = vec![
        Bar {
            date: "2024-04-24".into(),
            value: 70.0,
        },
        Bar {
            date: "2024-04-25".into(),
            value: 75.0,
        },
    ];
    assert_eq!(
        only_result(&r),
        &Rendered::Histogram {
            title: "Histogram of `temperature_max`".into(),
            y_label: "temperature_max".into(),
            bars: bars.clone(),
        }
    );
    assert_eq!(r.value, Some(QueryValue::Histogram(bars)));
}

#[test]
fn aggregates_respect_date_range() {
    let r = run("avg `temperature_max` 0 1");
    assert_eq!(only_result(&r), &Rendered::Generic("72.5°".into()));
    let r = run("min `temperature_max` 2024-04-25 -1");
    assert_eq!(only_result(&r), &Rendered::Generic("68.5°".into()));
    let r = run("max `precipitation_sum`");
    assert_eq!(only_result(&r), &Rendered::Generic("1.25in".into()));
}

#[test]
fn value_reads_one_day() {
    let r = run("value `temperature_min` -1");
    assert_eq!(only_result(&r), &Rendered::Generic("60°".into()));
}

#[test]
fn weather_code_renders_with_label() {
    let r = run("value `weather_code` 1");
    assert_eq!(
        only_result(&r),
        &Rendered::WeatherCode(61, "61 - Rain (Light)".into())
    );
    let r = run("max `weather_code`");
    assert_eq!(
        only_result(&r),
        &Rendered::WeatherCode(95, "95 - Thunderstorm".into())
    );
}

#[test]
fn table_formats_cells() {
    let r = run("table");
    let Rendered::Table(grid) = only_result(&r) else {
        panic!("expected table: {:?}", r.presenter.entries);
    };
    assert_eq!(
        grid.headers,
        [
            "date",
            "weather_code",
            "temperature_max",
            "temperature_min",
            "precipitation_sum",
        ]
    );
    assert_eq!(grid.rows.len(), 4);
    assert_eq!(
        grid.rows[0],
        ["2024-04-24", "3 - Overcast", "70°", "50°", "0in"]
    );
    assert_eq!(grid.rows[2][2], "68.5°");
}

#[test]
fn side_effect_commands() {
    let r = run("help");
    assert_eq!(only_result(&r), &Rendered::Help);
    assert_eq!(r.value, Some(QueryValue::None));
    assert_eq!(only_result(&run("input")), &Rendered::Upload);
    assert_eq!(only_result(&run("clear")), &Rendered::Clear);
}

// ─── Failures ───────────────────────────────────────────────────────────────

#[test]
fn validation_failure_is_rendered_after_echo() {
    let r = run("min");
    assert_eq!(r.value, None);
    assert_eq!(r.presenter.entries.len(), 2);
    assert_eq!(r.presenter.entries[0], Rendered::Echo("min".into()));
    let errors = r.presenter.errors();
    assert_eq!(errors[0].id, codes::TOO_FEW_ARGUMENTS);
}

#[test]
fn unknown_row_is_a_dataset_failure() {
    let r = run("max `humidity`");
    assert_eq!(r.value, None);
    let errors = r.presenter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].id, codes::DATASET_FAILURE);
    assert_eq!(errors[0].message, "row `humidity` not found");
}

#[test]
fn missing_date_and_empty_range() {
    let r = run("value `temperature_max` 2023-01-01");
    assert_eq!(r.presenter.errors()[0].id, codes::DATASET_FAILURE);
    let r = run("min `temperature_max` 3 0");
    assert_eq!(r.presenter.errors()[0].id, codes::DATASET_FAILURE);
}

// ─── Comparisons ────────────────────────────────────────────────────────────

#[test]
fn compare_zip_geocodes_and_fetches_whole_range() {
    let geo = FakeGeocoder::with("66213", 38.9, -94.7);
    let weather = FakeWeather::returning(80.0);
    let r = run_on(
        &*WEEK_DATASET,
        &geo,
        &weather,
        "compare zip 66213 max `temperature_max`",
    );
    assert_eq!(
        only_result(&r),
        &Rendered::Generic(
            "In the given data the maximum of temperature_max in the dataset was 80° which was equal to, at latitude 38.9 and longitude -94.7 the maximum of temperature_max was 80°".into()
        )
    );
    assert_eq!(*geo.calls.borrow(), ["66213"]);
    assert_eq!(
        *weather.calls.borrow(),
        [ArchiveCall {
            at: Coordinates {
                latitude: 38.9,
                longitude: -94.7,
            },
            kind: Aggregate::Max,
            row: "temperature_max".into(),
            start: "2024-04-24".into(),
            end: "2024-04-27".into(),
        }]
    );
}

#[test]
fn compare_coord_value_uses_single_day() {
    let geo = FakeGeocoder::default();
    let weather = FakeWeather::returning(90.5);
    let r = run_on(
        &*WEEK_DATASET,
        &geo,
        &weather,
        "compare coord 38.9 -94.7 value `temperature_max` 1",
    );
    assert!(geo.calls.borrow().is_empty());
    let call = &weather.calls.borrow()[0];
    assert_eq!(call.kind, Aggregate::Value);
    assert_eq!((call.start.as_str(), call.end.as_str()), ("2024-04-25", "2024-04-25"));
    let Some(QueryValue::Text(text)) = &r.value else {
        panic!("expected text: {:?}", r.value);
    };
    assert!(text.contains("was 75° which was less than"), "{text}");
}

#[test]
fn compare_city_geocodes_unquoted_name() {
    let geo = FakeGeocoder::with("Kansas City", 39.1, -94.6);
    let weather = FakeWeather::returning(50.0);
    let r = run_on(
        &*WEEK_DATASET,
        &geo,
        &weather,
        r#"compare city "Kansas City" min `temperature_min`"#,
    );
    assert_eq!(*geo.calls.borrow(), ["Kansas City"]);
    assert!(r.presenter.errors().is_empty(), "{:?}", r.presenter.entries);
}

#[test]
fn geocode_failure_is_external() {
    let weather = FakeWeather::returning(1.0);
    let r = run_on(
        &*WEEK_DATASET,
        &FakeGeocoder::default(),
        &weather,
        "compare zip 66213 max `temperature_max`",
    );
    let errors = r.presenter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].id, codes::EXTERNAL_SERVICE_FAILURE);
    assert!(
        errors[0].message.starts_with("Could not find a location for 66213"),
        "{}",
        errors[0].message
    );
    assert!(weather.calls.borrow().is_empty());
}

#[test]
fn archive_failure_is_external() {
    let geo = FakeGeocoder::with("66213", 38.9, -94.7);
    let r = run_on(
        &*WEEK_DATASET,
        &geo,
        &FakeWeather::default(),
        "compare zip 66213 max `temperature_max`",
    );
    let errors = r.presenter.errors();
    assert_eq!(errors[0].id, codes::EXTERNAL_SERVICE_FAILURE);
    assert_eq!(
        errors[0].message,
        "Could not fetch historical weather data: no historical data"
    );
}

#[test]
fn sub_query_failure_stops_comparison() {
    let geo = FakeGeocoder::with("66213", 38.9, -94.7);
    let weather = FakeWeather::returning(1.0);
    let r = run_on(
        &*WEEK_DATASET,
        &geo,
        &weather,
        "compare zip 66213 max `humidity`",
    );
    assert_eq!(r.presenter.errors()[0].id, codes::DATASET_FAILURE);
    assert!(geo.calls.borrow().is_empty());
}

#[test]
fn compare_dataset_prints_only_the_sentence() {
    let r = run("compare dataset min `temperature_max` max `temperature_max`");
    assert_eq!(
        only_result(&r),
        &Rendered::Generic(
            "In the first given query the minimum of temperature_max in the dataset was 68.5° which was less than the second query, the maximum of temperature_max was 80°".into()
        )
    );
}

#[test]
fn evaluate_without_print_renders_nothing() {
    let geo = FakeGeocoder::default();
    let weather = FakeWeather::default();
    let exec = Executor::new(&TABLES, &*WEEK_DATASET, &geo, &weather);
    let node = weather_query_core::parse_query(
        "avg `temperature_min`",
        false,
        &exec.validation_context(),
    )
    .expect("valid");
    let mut presenter = RecordingPresenter::default();
    let value = exec.evaluate(&node, false, &mut presenter).expect("evaluates");
    assert_eq!(value, QueryValue::Scalar(53.5));
    assert!(presenter.entries.is_empty());
}
