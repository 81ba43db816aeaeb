//! Command handlers.
//!
//! Each handler runs its queries inside one scoped store connection and
//! prints to stdout. Notices are printed as plain lines, not errors.

use chrono::NaiveDate;
use sectorlens::dashboard::{self, CompanyView, SectorView, SeriesView};
use sectorlens::data::FactFiles;
use sectorlens::output::{AsciiTable, CompanyFilter, CompanyKpis, ExportDataset, ExportFormat};
use sectorlens::pipeline::SectorSelection;
use sectorlens::{DashboardRequest, ExportRequest, Result, SectorLens};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// How results are printed.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Output {
    /// Print JSON instead of tables.
    pub(crate) json: bool,
}

impl Output {
    fn json<T: Serialize>(self, value: &T) -> Result<bool> {
        if self.json {
            let text = serde_json::to_string_pretty(value)
                .map_err(sectorlens::output::ExportError::from)?;
            println!("{}", text);
        }
        Ok(self.json)
    }
}

pub(crate) fn load(
    app: &SectorLens,
    company: PathBuf,
    position: PathBuf,
    price: PathBuf,
    replace: bool,
) -> Result<()> {
    let files = FactFiles {
        company,
        position,
        price,
    };
    let summary = if replace {
        app.replace_facts(&files)?
    } else {
        app.load_facts(&files)?
    };

    println!(
        "Loaded {} companies, {} positions, {} prices into {}",
        summary.companies,
        summary.positions,
        summary.prices,
        app.settings().database_path.display()
    );
    Ok(())
}

pub(crate) fn sectors(
    app: &SectorLens,
    output: Output,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    choices: &[String],
) -> Result<()> {
    let days = app.settings().default_range_days;
    let selection = SectorSelection::from_choices(choices);

    let view = app.with_store(|store, pipeline| -> Result<SectorView> {
        let range = dashboard::resolve_range(store, pipeline, start, end, days)?;
        dashboard::sector_view(store, pipeline, range, &selection)
    })?;

    if !output.json(&view)? {
        print_sector_view(&view);
    }
    Ok(())
}

pub(crate) fn companies(
    app: &SectorLens,
    output: Output,
    choices: &[String],
    search: Option<&str>,
) -> Result<()> {
    let mut filter = CompanyFilter::new().sectors(SectorSelection::from_choices(choices));
    if let Some(term) = search {
        filter = filter.search(term);
    }

    let view = app.with_store(|store, pipeline| dashboard::company_view(store, pipeline, &filter))?;

    if !output.json(&view)? {
        print_company_view(&view);
    }
    Ok(())
}

pub(crate) fn series(app: &SectorLens, output: Output, tickers: Vec<String>) -> Result<()> {
    let selection = (!tickers.is_empty()).then_some(tickers);

    let view = app.with_store(|store, pipeline| {
        dashboard::series_view(store, pipeline, selection.as_deref())
    })?;

    if !output.json(&view)? {
        print_series_view(&view);
    }
    Ok(())
}

#[derive(Serialize)]
struct Lists {
    #[serde(skip_serializing_if = "Option::is_none")]
    sectors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tickers: Option<Vec<String>>,
}

pub(crate) fn list(app: &SectorLens, output: Output, sectors: bool, tickers: bool) -> Result<()> {
    let lists = app.with_store(|store, pipeline| -> Result<Lists> {
        Ok(Lists {
            sectors: if sectors {
                Some(pipeline.sector_list(store)?)
            } else {
                None
            },
            tickers: if tickers {
                Some(pipeline.company_list(store)?)
            } else {
                None
            },
        })
    })?;

    if output.json(&lists)? {
        return Ok(());
    }
    if let Some(sectors) = &lists.sectors {
        println!("Sectors ({}):", sectors.len());
        for sector in sectors {
            println!("  {}", sector);
        }
    }
    if let Some(tickers) = &lists.tickers {
        println!("Tickers ({}):", tickers.len());
        for ticker in tickers {
            println!("  {}", ticker);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct LatestDates {
    position: Option<NaiveDate>,
    price: Option<NaiveDate>,
}

pub(crate) fn latest_date(app: &SectorLens, output: Output) -> Result<()> {
    let dates = app.with_store(|store, pipeline| -> Result<LatestDates> {
        Ok(LatestDates {
            position: pipeline.latest_date(store)?,
            price: pipeline.latest_price_date(store)?,
        })
    })?;

    if !output.json(&dates)? {
        println!("Latest position date: {}", date_or_none(dates.position));
        println!("Latest price date:    {}", date_or_none(dates.price));
    }
    Ok(())
}

pub(crate) fn export(
    app: &SectorLens,
    dataset: ExportDataset,
    format: ExportFormat,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    choices: &[String],
    out: &Path,
) -> Result<()> {
    let request = ExportRequest {
        format,
        start,
        end,
        sectors: SectorSelection::from_choices(choices),
        ..ExportRequest::new(dataset)
    };

    let path = app.export(&request, out)?;
    println!("Exported to {}", path.display());
    Ok(())
}

pub(crate) fn dashboard(app: &SectorLens, output: Output) -> Result<()> {
    let view = app.render_dashboard(&DashboardRequest::default())?;

    if output.json(&view)? {
        return Ok(());
    }

    println!("BI Dashboard");
    println!("Latest position date: {}", date_or_none(view.latest_date));
    print_sector_view(&view.sectors);
    print_company_view(&view.companies);
    print_series_view(&view.series);
    Ok(())
}

fn date_or_none(date: Option<NaiveDate>) -> String {
    date.map_or_else(|| "none".to_string(), |d| d.to_string())
}

fn print_sector_view(view: &SectorView) {
    let title = view.range.map_or_else(
        || "Top 10 Sectors by Position".to_string(),
        |range| format!("Top 10 Sectors by Position ({})", range),
    );

    if let Some(notice) = view.notice {
        println!("\n{}", title);
        println!("{}", notice);
        return;
    }
    print!("{}", view.totals.to_ascii_table(&title));
}

fn print_kpis(kpis: &CompanyKpis) {
    println!("Total Companies Listed: {}", kpis.companies);
    println!(
        "Top Sector by Average Position (USD): {}",
        kpis.top_sector.as_deref().unwrap_or("-")
    );
    match kpis.largest_average_usd {
        Some(largest) => println!("Largest Position Overall: ${:.2}", largest),
        None => println!("Largest Position Overall: -"),
    }
}

fn print_company_view(view: &CompanyView) {
    print!("{}", view.shown.to_ascii_table("Top 25% Companies"));
    print_kpis(&view.kpis);
}

fn print_series_view(view: &SeriesView) {
    if let Some(notice) = view.notice {
        println!("\nCompany Timeseries");
        println!("{}", notice);
        return;
    }

    for series in &view.series {
        print!("{}", series.points.to_ascii_table(&series.ticker));
        match &series.stats {
            Some(stats) => println!("{}", stats),
            None => println!("No close prices recorded"),
        }
    }
}
