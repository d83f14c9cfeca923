// SQLite persistence layer for rank snapshots.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection};

/// Snapshot stream fed by the power engine.
pub const POWER_STREAM: &str = "power";
/// Snapshot stream fed by the dynasty composite.
pub const DDI_STREAM: &str = "ddi";

/// SQLite-backed persistence for dated rank snapshots. The engine is
/// synchronous and single-writer; connection access is serialized through a
/// mutex.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS rank_snapshots (
                source        TEXT NOT NULL,
                snapshot_date TEXT NOT NULL,
                team          TEXT NOT NULL,
                rank          INTEGER NOT NULL,
                PRIMARY KEY (source, snapshot_date, team)
            );

            CREATE INDEX IF NOT EXISTS idx_rank_snapshots_source_date
                ON rank_snapshots (source, snapshot_date);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Record one dated snapshot of a ranking stream in a single transaction.
    /// Uses INSERT OR REPLACE so re-running the same day overwrites that
    /// day's rows instead of duplicating them.
    pub fn record_snapshot(
        &self,
        source: &str,
        date: NaiveDate,
        ranks: &[(String, u32)],
    ) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin snapshot transaction")?;
        for (team, rank) in ranks {
            tx.execute(
                "INSERT OR REPLACE INTO rank_snapshots (source, snapshot_date, team, rank)
                 VALUES (?1, ?2, ?3, ?4)",
                params![source, date.to_string(), team, rank],
            )
            .context("failed to insert snapshot row")?;
        }
        tx.commit().context("failed to commit snapshot")?;
        Ok(())
    }

    /// Load the most recent snapshot of `source` dated strictly before
    /// `date`, as (snapshot date, team -> rank). Returns `None` when no
    /// earlier snapshot exists. Same-day rows are excluded on purpose:
    /// movement compares against genuinely prior runs.
    pub fn latest_snapshot_before(
        &self,
        source: &str,
        date: NaiveDate,
    ) -> Result<Option<(NaiveDate, BTreeMap<String, u32>)>> {
        let conn = self.conn();

        // ISO-8601 dates sort lexicographically in chronological order.
        let prior: Option<String> = conn
            .query_row(
                "SELECT snapshot_date FROM rank_snapshots
                 WHERE source = ?1 AND snapshot_date < ?2
                 ORDER BY snapshot_date DESC LIMIT 1",
                params![source, date.to_string()],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })
            .context("failed to query prior snapshot date")?;

        let prior = match prior {
            Some(raw) => raw,
            None => return Ok(None),
        };
        let prior_date = NaiveDate::parse_from_str(&prior, "%Y-%m-%d")
            .with_context(|| format!("malformed snapshot date in database: {prior}"))?;

        let mut stmt = conn
            .prepare(
                "SELECT team, rank FROM rank_snapshots
                 WHERE source = ?1 AND snapshot_date = ?2",
            )
            .context("failed to prepare snapshot query")?;
        let ranks = stmt
            .query_map(params![source, prior], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })
            .context("failed to query snapshot rows")?
            .collect::<std::result::Result<BTreeMap<_, _>, _>>()
            .context("failed to map snapshot rows")?;

        Ok(Some((prior_date, ranks)))
    }

    /// All distinct snapshot dates recorded for `source`, oldest first.
    pub fn snapshot_dates(&self, source: &str) -> Result<Vec<NaiveDate>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT snapshot_date FROM rank_snapshots
                 WHERE source = ?1 ORDER BY snapshot_date",
            )
            .context("failed to prepare snapshot date query")?;
        let raw_dates = stmt
            .query_map(params![source], |row| row.get::<_, String>(0))
            .context("failed to query snapshot dates")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map snapshot date rows")?;

        let mut dates = Vec::with_capacity(raw_dates.len());
        for raw in raw_dates {
            let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("malformed snapshot date in database: {raw}"))?;
            dates.push(date);
        }
        Ok(dates)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
