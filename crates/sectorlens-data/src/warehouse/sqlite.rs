//! SQLite fact store for company, position and price data.
//!
//! Every statement that carries caller-supplied values binds them as
//! parameters; no value is ever formatted into SQL text.

use crate::error::{DataError, Result};
use crate::model::{Company, PositionRecord, PriceRecord};
use rusqlite::{Connection, Params, Row, params};
use std::cell::Cell;
use std::path::Path;
use tracing::{debug, warn};

/// SQLite store holding the three raw fact tables.
#[derive(Debug)]
pub struct Warehouse {
    conn: Connection,
    queries_issued: Cell<u64>,
}

impl Warehouse {
    /// Open (or create) a store at the given path.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        let store = Self {
            conn,
            queries_issued: Cell::new(0),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS company (
                id INTEGER PRIMARY KEY,
                ticker TEXT NOT NULL UNIQUE,
                sector_name TEXT NOT NULL
            )",
            [],
        )?;

        // Dates are ISO text so lexical order is chronological order
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS position (
                company_id INTEGER NOT NULL REFERENCES company(id),
                date TEXT NOT NULL,
                shares INTEGER,
                PRIMARY KEY (company_id, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS price (
                company_id INTEGER NOT NULL REFERENCES company(id),
                date TEXT NOT NULL,
                close_usd REAL,
                PRIMARY KEY (company_id, date)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_position_date ON position(date)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_price_date ON price(date)",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_company_sector ON company(sector_name)",
            [],
        )?;

        Ok(())
    }

    /// Run a read statement and map every row.
    ///
    /// `name` identifies the statement in logs; parameter values are never
    /// logged.
    pub fn query_map<T, P, F>(&self, name: &str, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        self.record_query(name, stmt.parameter_count());

        let rows = stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<T>, _>>()?;

        debug!(statement = name, rows = rows.len(), "query finished");
        Ok(rows)
    }

    /// Run a read statement that yields exactly one row.
    pub fn query_one<T, P, F>(&self, name: &str, sql: &str, params: P, f: F) -> Result<T>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql)?;
        self.record_query(name, stmt.parameter_count());

        Ok(stmt.query_row(params, f)?)
    }

    fn record_query(&self, name: &str, param_count: usize) {
        self.queries_issued.set(self.queries_issued.get() + 1);
        debug!(statement = name, params = param_count, "issuing query");
    }

    /// Number of read statements issued through this connection.
    pub fn queries_issued(&self) -> u64 {
        self.queries_issued.get()
    }

    /// Store company rows, updating existing ids in place.
    pub fn put_companies(&self, companies: &[Company]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        for company in companies {
            if company.ticker.is_empty() {
                return Err(DataError::InvalidRecord(format!(
                    "company {} has an empty ticker",
                    company.id
                )));
            }

            tx.execute(
                "INSERT INTO company (id, ticker, sector_name)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    ticker = excluded.ticker,
                    sector_name = excluded.sector_name",
                params![company.id, company.ticker, company.sector_name],
            )?;
        }

        tx.commit()?;
        Ok(companies.len())
    }

    /// Store position rows, replacing rows with the same company and date.
    pub fn put_positions(&self, positions: &[PositionRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        for position in positions {
            position.validate()?;
            tx.execute(
                "INSERT OR REPLACE INTO position (company_id, date, shares)
                 VALUES (?1, ?2, ?3)",
                params![
                    position.company_id,
                    position.date.to_string(),
                    position.shares
                ],
            )?;
        }

        tx.commit()?;
        Ok(positions.len())
    }

    /// Store price rows, replacing rows with the same company and date.
    pub fn put_prices(&self, prices: &[PriceRecord]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;

        for price in prices {
            price.validate()?;
            tx.execute(
                "INSERT OR REPLACE INTO price (company_id, date, close_usd)
                 VALUES (?1, ?2, ?3)",
                params![price.company_id, price.date.to_string(), price.close_usd],
            )?;
        }

        tx.commit()?;
        Ok(prices.len())
    }

    /// Delete every fact and company row.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute("DELETE FROM position", [])?;
        self.conn.execute("DELETE FROM price", [])?;
        self.conn.execute("DELETE FROM company", [])?;
        Ok(())
    }

    /// Get store statistics.
    pub fn get_stats(&self) -> Result<StoreStats> {
        let companies: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM company", [], |row| row.get(0))?;

        let sectors: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT sector_name) FROM company", [], |row| {
                    row.get(0)
                })?;

        let positions: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM position", [], |row| row.get(0))?;

        let prices: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM price", [], |row| row.get(0))?;

        Ok(StoreStats {
            companies: companies as usize,
            sectors: sectors as usize,
            positions: positions as usize,
            prices: prices as usize,
        })
    }

    /// Close the connection, reporting any failure to flush.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_conn, e)| {
            warn!(error = %e, "failed to close store connection");
            DataError::Database(e)
        })
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of companies
    pub companies: usize,
    /// Number of distinct sectors
    pub sectors: usize,
    /// Number of position rows
    pub positions: usize,
    /// Number of price rows
    pub prices: usize,
}
