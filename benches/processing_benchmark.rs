use aq_validator::analyzers::Summarizer;
use aq_validator::models::{RawExport, STATION_REGISTRY};
use aq_validator::processors::{map_status_token, Pipeline, QualityControl, SchemaConverter};
use aq_validator::readers::EnvistaReader;
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const PARAMETERS: [&str; 8] = ["O3", "NO", "NO2", "NOX", "CO", "PM10", "PM2.5", "TempInt"];

// Build a wide ENVISTA-style grid: header block plus `hours` data rows
fn create_test_export(station_count: usize, hours: usize) -> RawExport {
    let stations = &STATION_REGISTRY[..station_count.min(STATION_REGISTRY.len())];

    let mut station_row = vec!["Date & Time".to_string()];
    let mut parameter_row = vec![String::new()];
    for (name, _) in stations {
        for parameter in PARAMETERS {
            station_row.push(name.to_string());
            parameter_row.push(parameter.to_string());
        }
    }
    let width = station_row.len();

    let mut rows = vec![
        vec!["Envista".to_string()],
        vec![String::new()],
        station_row,
        parameter_row,
        vec![String::new(); width],
    ];

    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    for hour in 0..hours {
        let timestamp = start + chrono::Duration::hours(hour as i64);
        let mut row = vec![timestamp.format("%Y-%m-%d %H:%M").to_string()];
        for station in 0..stations.len() {
            let wobble = ((hour + station) % 7) as f64;
            row.push(format!("{:.4}", 0.02 + wobble * 0.001));
            row.push(format!("{:.4}", 0.005 + wobble * 0.0005));
            row.push(format!("{:.4}", 0.015 + wobble * 0.0005));
            row.push(format!("{:.4}", 0.020 + wobble * 0.001));
            row.push(if hour % 24 == 3 { "Zero".to_string() } else { format!("{:.2}", 0.5 + wobble * 0.1) });
            row.push(format!("{}", 30 + (hour % 11)));
            row.push(format!("{}", 15 + (hour % 5)));
            row.push(format!("{:.1}", 24.0 + wobble * 0.2));
        }
        rows.push(row);
    }

    RawExport::new(rows)
}

fn benchmark_flag_mapper(c: &mut Criterion) {
    let tokens = ["0.021", "NoData", "Alarm/Zero", "maintenance", "Purge", "  ", "1e-3"];

    c.bench_function("flag_mapper", |b| {
        b.iter(|| {
            for token in tokens {
                black_box(map_status_token(black_box(token)));
            }
        })
    });
}

fn benchmark_reshape_and_convert(c: &mut Criterion) {
    let export = create_test_export(13, 24 * 31);
    let reader = EnvistaReader::new();
    let converter = SchemaConverter::new();

    c.bench_function("reshape_and_convert_month", |b| {
        b.iter(|| {
            let long_form = reader.reshape(&export).unwrap();
            let records = converter.convert(&long_form).unwrap();
            black_box(records.len())
        })
    });
}

fn benchmark_quality_control(c: &mut Criterion) {
    let export = create_test_export(13, 24 * 31);
    let long_form = EnvistaReader::new().reshape(&export).unwrap();
    let records = SchemaConverter::new().convert(&long_form).unwrap();
    let qc = QualityControl::new();

    c.bench_function("quality_control_month", |b| {
        b.iter(|| {
            let mut records = records.clone();
            black_box(qc.run(&mut records))
        })
    });
}

fn benchmark_summarizer(c: &mut Criterion) {
    let export = create_test_export(13, 24 * 31);
    let result = Pipeline::new().run(&export).unwrap();
    let summarizer = Summarizer::new();

    c.bench_function("summarizer_month", |b| {
        b.iter(|| black_box(summarizer.summarize(&result.records)))
    });
}

fn benchmark_varying_data_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_size");

    for &days in &[1, 7, 31, 90] {
        group.bench_with_input(BenchmarkId::new("days", days), &days, |b, &days| {
            let export = create_test_export(13, 24 * days);
            let pipeline = Pipeline::new();

            b.iter(|| {
                let result = pipeline.run(&export).unwrap();
                black_box(result.records.len())
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_flag_mapper,
    benchmark_reshape_and_convert,
    benchmark_quality_control,
    benchmark_summarizer,
    benchmark_varying_data_sizes
);
criterion_main!(benches);
