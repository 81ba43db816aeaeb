//! Fixed-width text tables for terminal output.

use sectorlens_pipeline::{PricePoint, SectorTotal, TopCompany};

const RULE_WIDTH: usize = 80;

/// Rendering of a result table as fixed-width text.
pub trait AsciiTable {
    /// Render the rows under `title`.
    fn to_ascii_table(&self, title: &str) -> String;
}

fn open_table(output: &mut String, title: &str, rows: usize) {
    output.push_str(&format!("\n{}\n", title));
    output.push_str(&format!("Rows: {}\n", rows));
    output.push_str(&"=".repeat(RULE_WIDTH));
    output.push('\n');
}

fn rule(output: &mut String) {
    output.push_str(&"-".repeat(RULE_WIDTH));
    output.push('\n');
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

fn opt_money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

impl AsciiTable for [SectorTotal] {
    fn to_ascii_table(&self, title: &str) -> String {
        let mut output = String::new();
        open_table(&mut output, title, self.len());

        output.push_str(&format!("{:<40} {:>24}\n", "Sector", "Total Position (USD)"));
        rule(&mut output);
        for total in self {
            output.push_str(&format!(
                "{:<40} {:>24.2}\n",
                total.sector_name, total.total_position_usd
            ));
        }

        output
    }
}

impl AsciiTable for [TopCompany] {
    fn to_ascii_table(&self, title: &str) -> String {
        let mut output = String::new();
        open_table(&mut output, title, self.len());

        output.push_str(&format!(
            "{:<10} {:<24} {:>12} {:>12} {:>18}\n",
            "Ticker", "Sector", "Shares", "Last Close", "Avg Position"
        ));
        rule(&mut output);
        for company in self {
            output.push_str(&format!(
                "{:<10} {:<24} {:>12} {:>12} {:>18.2}\n",
                company.ticker,
                company.sector_name,
                opt(company.shares),
                opt_money(company.last_close_price_usd),
                company.average_position_usd
            ));
        }

        output
    }
}

impl AsciiTable for [PricePoint] {
    fn to_ascii_table(&self, title: &str) -> String {
        let mut output = String::new();
        open_table(&mut output, title, self.len());

        output.push_str(&format!("{:<12} {:>14}\n", "Date", "Close (USD)"));
        rule(&mut output);
        for point in self {
            output.push_str(&format!(
                "{:<12} {:>14}\n",
                point.date,
                opt_money(point.close_usd)
            ));
        }

        output
    }
}
