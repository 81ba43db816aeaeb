//! Export round trips over results produced by the pipeline.

use chrono::NaiveDate;
use sectorlens_data::{Company, PositionRecord, PriceRecord, Warehouse};
use sectorlens_output::{
    CompanyFilter, ExportDataset, ExportFormat, Exporter, TableRow, ToDataFrame, company_kpis,
};
use sectorlens_pipeline::{
    DateRange, Pipeline, PipelineConfig, PricePoint, SectorSelection, SectorTotal, TopCompany,
};
use std::path::PathBuf;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_store() -> Warehouse {
    let store = Warehouse::in_memory().unwrap();
    store
        .put_companies(&[
            Company::new(1, "AAA", "Tech"),
            Company::new(2, "BBB", "Tech"),
            Company::new(3, "CCC", "Bio"),
            Company::new(4, "DDD", "Energy"),
        ])
        .unwrap();

    let day = date(2024, 6, 28);
    let shares = [(1, 500), (2, 300), (3, 200), (4, 100)];
    store
        .put_positions(
            &shares
                .iter()
                .map(|&(id, n)| PositionRecord::new(id, day, Some(n)))
                .collect::<Vec<_>>(),
        )
        .unwrap();
    store
        .put_prices(&[
            PriceRecord::new(1, day, Some(1.0)),
            PriceRecord::new(2, day, None),
            PriceRecord::new(3, day, Some(2.0)),
            PriceRecord::new(4, day, Some(3.0)),
        ])
        .unwrap();
    store
}

fn pipeline() -> Pipeline {
    Pipeline::new(PipelineConfig {
        as_of: Some(date(2024, 6, 30)),
        ..PipelineConfig::default()
    })
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sectorlens_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Parse an exported CSV back into its header and record count.
fn read_back(path: &std::path::Path) -> (Vec<String>, usize) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    (headers, reader.records().count())
}

#[test]
fn test_csv_round_trip_keeps_rows_and_columns() {
    let store = seeded_store();
    let pipeline = pipeline();
    let dir = scratch_dir("round_trip");

    let sectors = pipeline
        .resolve_sectors(&store, &SectorSelection::All)
        .unwrap();
    let range = DateRange::new(date(2024, 6, 1), date(2024, 6, 30)).unwrap();
    let totals = pipeline.top_sectors(&store, range, &sectors).unwrap();
    let companies = pipeline.top_companies(&store).unwrap();
    let series = pipeline.time_series(&store, "CCC").unwrap();

    let path = ExportDataset::TopSectors.path_in(&dir, ExportFormat::Csv);
    totals.export_to_file(&path, ExportFormat::Csv).unwrap();
    let (headers, rows) = read_back(&path);
    assert_eq!(headers, SectorTotal::COLUMNS);
    assert_eq!(rows, totals.len());

    let path = ExportDataset::TopCompanies.path_in(&dir, ExportFormat::Csv);
    assert!(path.ends_with("Top 25% Companies.csv"));
    companies.export_to_file(&path, ExportFormat::Csv).unwrap();
    let (headers, rows) = read_back(&path);
    assert_eq!(headers, TopCompany::COLUMNS);
    assert_eq!(rows, companies.len());

    let path = ExportDataset::Series("CCC".to_string()).path_in(&dir, ExportFormat::Csv);
    series.export_to_file(&path, ExportFormat::Csv).unwrap();
    let (headers, rows) = read_back(&path);
    assert_eq!(headers, PricePoint::COLUMNS);
    assert_eq!(rows, 1);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_empty_results_still_export_headers() {
    let store = Warehouse::in_memory().unwrap();
    let pipeline = pipeline();
    let dir = scratch_dir("empty");

    let series = pipeline.time_series(&store, "NOPE").unwrap();
    assert!(series.is_empty());

    let path = ExportDataset::Series("NOPE".to_string()).path_in(&dir, ExportFormat::Csv);
    series.export_to_file(&path, ExportFormat::Csv).unwrap();
    let (headers, rows) = read_back(&path);
    assert_eq!(headers, vec!["date", "close_usd"]);
    assert_eq!(rows, 0);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_json_export_parses_back() {
    let store = seeded_store();
    let companies = pipeline().top_companies(&store).unwrap();

    let json = companies.export_to_string(ExportFormat::PrettyJson).unwrap();
    let parsed: Vec<TopCompany> = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, companies);
}

#[test]
fn test_dashboard_summaries_over_pipeline_results() {
    let store = seeded_store();
    let companies = pipeline().top_companies(&store).unwrap();

    // Four ranked companies give a top bucket of one: AAA at 500.0
    assert_eq!(companies.len(), 1);
    assert_eq!(companies[0].ticker, "AAA");

    let kpis = company_kpis(&companies).unwrap();
    assert_eq!(kpis.companies, 1);
    assert_eq!(kpis.top_sector.as_deref(), Some("Tech"));
    assert_eq!(kpis.largest_average_usd, Some(500.0));

    let filtered = CompanyFilter::new().search("bio").apply(&companies);
    assert!(filtered.is_empty());

    let df = companies.to_dataframe().unwrap();
    assert_eq!(df.height(), companies.len());
}
