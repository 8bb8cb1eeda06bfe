//! Experiment persistence using SQLite with sqlx.
//!
//! Two tables: `experiments` holds one row per run, `results` one row per
//! iteration. `iteration_index` is 0-based on disk; the API is 1-based.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use experiment::{Experiment, IterationResult, IterationStatus};
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, warn};

/// Ids tried by `save_unique` before giving up.
const MAX_ID_ATTEMPTS: u32 = 5;

/// An experiment together with its ordered results.
#[derive(Debug, Clone)]
pub struct StoredExperiment {
    pub experiment: Experiment,
    pub results: Vec<IterationResult>,
}

/// Row in the recent-experiments listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentListing {
    pub id: String,
    pub server_url: String,
    pub tool_name: String,
    pub iterations: u32,
    pub timestamp: DateTime<Utc>,
    pub result_count: u64,
    pub success_count: u64,
    pub avg_duration_ms: Option<f64>,
}

/// Manages experiment persistence.
pub struct ExperimentStore {
    pool: SqlitePool,
}

impl ExperimentStore {
    /// Open or create the experiment database at the given path.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to open SQLite database")?;

        init_schema(&pool).await?;

        info!(path = %path.display(), "Opened experiment database");

        Ok(Self { pool })
    }

    /// Open an in-memory database (for testing).
    pub async fn open_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .create_if_missing(true);

        // A single connection, otherwise each one sees its own empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// Persist an experiment and all of its results atomically.
    pub async fn save(&self, experiment: &Experiment, results: &[IterationResult]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO experiments (id, server_url, tool_name, arguments, iterations, timestamp)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&experiment.id)
        .bind(&experiment.server_url)
        .bind(&experiment.tool_name)
        .bind(&experiment.arguments)
        .bind(experiment.iterations as i64)
        .bind(format_timestamp(&experiment.timestamp))
        .execute(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert experiment {}", experiment.id))?;

        for result in results {
            sqlx::query(
                r#"
                INSERT INTO results (experiment_id, iteration_index, duration_ms, status, response)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&experiment.id)
            .bind(i64::from(result.iteration) - 1)
            .bind(result.duration_ms)
            .bind(result.status.as_str())
            .bind(&result.response)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(id = %experiment.id, results = results.len(), "Saved experiment");
        Ok(())
    }

    /// Persist an experiment, drawing a new id from `next_id` whenever the
    /// current one is already taken.
    ///
    /// On success `experiment.id` holds the id that was stored.
    pub async fn save_unique<F>(
        &self,
        experiment: &mut Experiment,
        results: &[IterationResult],
        mut next_id: F,
    ) -> Result<()>
    where
        F: FnMut() -> String,
    {
        let mut attempt = 1;
        loop {
            match self.save(experiment, results).await {
                Ok(()) => return Ok(()),
                Err(e) if is_duplicate_id(&e) && attempt < MAX_ID_ATTEMPTS => {
                    let fresh = next_id();
                    warn!(id = %experiment.id, new_id = %fresh, "Experiment id taken, retrying");
                    experiment.id = fresh;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Load an experiment and its results, ordered by iteration.
    pub async fn get(&self, id: &str) -> Result<Option<StoredExperiment>> {
        let row: Option<(String, String, String, String, i64, String)> = sqlx::query_as(
            r#"
            SELECT id, server_url, tool_name, arguments, iterations, timestamp
            FROM experiments
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let experiment = Experiment {
            id: row.0,
            server_url: row.1,
            tool_name: row.2,
            arguments: row.3,
            iterations: row.4.max(0) as u32,
            timestamp: parse_timestamp(&row.5)?,
        };

        let rows: Vec<(i64, f64, String, String)> = sqlx::query_as(
            r#"
            SELECT iteration_index, duration_ms, status, response
            FROM results
            WHERE experiment_id = ?
            ORDER BY iteration_index ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let results = rows
            .into_iter()
            .map(|row| IterationResult {
                iteration: (row.0 + 1).max(1) as u32,
                duration_ms: row.1,
                status: IterationStatus::from_stored(&row.2),
                response: row.3,
            })
            .collect();

        Ok(Some(StoredExperiment {
            experiment,
            results,
        }))
    }

    /// Most recent experiments first.
    pub async fn list_recent(&self, limit: usize) -> Result<Vec<ExperimentListing>> {
        let rows: Vec<(String, String, String, i64, String, i64, i64, Option<f64>)> =
            sqlx::query_as(
                r#"
                SELECT e.id, e.server_url, e.tool_name, e.iterations, e.timestamp,
                       COUNT(r.experiment_id),
                       COALESCE(SUM(CASE WHEN r.status = 'success' THEN 1 ELSE 0 END), 0),
                       AVG(r.duration_ms)
                FROM experiments e
                LEFT JOIN results r ON r.experiment_id = e.id
                GROUP BY e.id
                ORDER BY e.timestamp DESC
                LIMIT ?
                "#,
            )
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let listings = rows
            .into_iter()
            .map(|row| {
                Ok(ExperimentListing {
                    timestamp: parse_timestamp(&row.4)?,
                    id: row.0,
                    server_url: row.1,
                    tool_name: row.2,
                    iterations: row.3.max(0) as u32,
                    result_count: row.5.max(0) as u64,
                    success_count: row.6.max(0) as u64,
                    avg_duration_ms: row.7,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(listings)
    }

    /// Delete an experiment and its results. Returns false if it did not exist.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM results WHERE experiment_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM experiments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total number of stored experiments.
    pub async fn count(&self) -> Result<u64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM experiments")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0.max(0) as u64)
    }
}

async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS experiments (
            id TEXT PRIMARY KEY,
            server_url TEXT NOT NULL,
            tool_name TEXT NOT NULL,
            arguments TEXT NOT NULL,
            iterations INTEGER NOT NULL,
            timestamp TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS results (
            experiment_id TEXT NOT NULL REFERENCES experiments(id),
            iteration_index INTEGER NOT NULL,
            duration_ms REAL NOT NULL,
            status TEXT NOT NULL,
            response TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_results_experiment ON results(experiment_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_experiments_timestamp ON experiments(timestamp)")
        .execute(pool)
        .await?;

    Ok(())
}

fn is_duplicate_id(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(db)) => db.is_unique_violation(),
        _ => false,
    }
}

// Fixed-width UTC so that text ordering matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid stored timestamp: {}", s))?;
    Ok(ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use test_utils::EXAMPLE_ENDPOINT;

    fn experiment(id: &str, timestamp: DateTime<Utc>) -> Experiment {
        Experiment {
            id: id.to_string(),
            server_url: EXAMPLE_ENDPOINT.to_string(),
            tool_name: "echo".to_string(),
            arguments: r#"{"message": "hi"}"#.to_string(),
            iterations: 3,
            timestamp,
        }
    }

    fn results() -> Vec<IterationResult> {
        vec![
            IterationResult {
                iteration: 1,
                duration_ms: 10.0,
                status: IterationStatus::Success,
                response: r#"{"content":[]}"#.to_string(),
            },
            IterationResult {
                iteration: 2,
                duration_ms: 30.0,
                status: IterationStatus::Error,
                response: "This tool always fails".to_string(),
            },
            IterationResult {
                iteration: 3,
                duration_ms: 20.0,
                status: IterationStatus::Unknown,
                response: r#"{"id":1}"#.to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = ExperimentStore::open_memory().await.unwrap();
        let exp = experiment("abc12345", Utc::now());

        store.save(&exp, &results()).await.unwrap();

        let stored = store.get("abc12345").await.unwrap().unwrap();
        assert_eq!(stored.experiment.id, "abc12345");
        assert_eq!(stored.experiment.tool_name, "echo");
        assert_eq!(stored.experiment.arguments, r#"{"message": "hi"}"#);
        assert_eq!(stored.experiment.iterations, 3);
        assert_eq!(
            stored.experiment.timestamp.timestamp_micros(),
            exp.timestamp.timestamp_micros()
        );
        assert_eq!(stored.results, results());
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = ExperimentStore::open_memory().await.unwrap();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_rolls_back() {
        let store = ExperimentStore::open_memory().await.unwrap();
        let exp = experiment("dup00001", Utc::now());

        store.save(&exp, &results()).await.unwrap();
        assert!(store.save(&exp, &results()).await.is_err());

        let stored = store.get("dup00001").await.unwrap().unwrap();
        assert_eq!(stored.results.len(), 3);
    }

    #[tokio::test]
    async fn test_save_unique_picks_fresh_id() {
        let store = ExperimentStore::open_memory().await.unwrap();
        store
            .save(&experiment("taken000", Utc::now()), &results())
            .await
            .unwrap();

        let mut exp = experiment("taken000", Utc::now());
        let mut candidates = vec!["fresh000".to_string(), "taken000".to_string()];
        store
            .save_unique(&mut exp, &results()[..1], || candidates.pop().unwrap())
            .await
            .unwrap();

        assert_eq!(exp.id, "fresh000");
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.get("taken000").await.unwrap().unwrap().results.len(), 3);
        assert_eq!(store.get("fresh000").await.unwrap().unwrap().results.len(), 1);
    }

    #[tokio::test]
    async fn test_save_unique_gives_up() {
        let store = ExperimentStore::open_memory().await.unwrap();
        store
            .save(&experiment("taken000", Utc::now()), &results())
            .await
            .unwrap();

        let mut exp = experiment("taken000", Utc::now());
        let mut calls = 0;
        let result = store
            .save_unique(&mut exp, &results(), || {
                calls += 1;
                "taken000".to_string()
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls, MAX_ID_ATTEMPTS - 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_an_error() {
        let store = ExperimentStore::open_memory().await.unwrap();
        sqlx::query(
            "INSERT INTO experiments (id, server_url, tool_name, arguments, iterations, timestamp) \
             VALUES ('bad00000', 'http://x/mcp', 'echo', '{}', 1, 'yesterday')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.get("bad00000").await.unwrap_err();
        assert!(err.to_string().contains("Invalid stored timestamp"));
        assert!(store.list_recent(10).await.is_err());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let store = ExperimentStore::open_memory().await.unwrap();
        let now = Utc::now();

        store
            .save(&experiment("older000", now - Duration::minutes(5)), &results())
            .await
            .unwrap();
        store
            .save(&experiment("newer000", now), &results()[..1])
            .await
            .unwrap();
        store
            .save(&experiment("empty000", now - Duration::minutes(10)), &[])
            .await
            .unwrap();

        let listings = store.list_recent(10).await.unwrap();
        let ids: Vec<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["newer000", "older000", "empty000"]);

        assert_eq!(listings[0].result_count, 1);
        assert_eq!(listings[0].success_count, 1);
        assert_eq!(listings[1].result_count, 3);
        assert_eq!(listings[1].success_count, 1);
        assert_eq!(listings[1].avg_duration_ms, Some(20.0));
        assert_eq!(listings[2].result_count, 0);
        assert_eq!(listings[2].avg_duration_ms, None);

        assert_eq!(store.list_recent(2).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = ExperimentStore::open_memory().await.unwrap();
        store
            .save(&experiment("gone0000", Utc::now()), &results())
            .await
            .unwrap();

        assert!(store.delete("gone0000").await.unwrap());
        assert!(!store.delete("gone0000").await.unwrap());
        assert!(store.get("gone0000").await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_open_file_persists() {
        let (_dir, path) = test_utils::temp_database();

        {
            let store = ExperimentStore::open(&path).await.unwrap();
            store
                .save(&experiment("disk0000", Utc::now()), &results())
                .await
                .unwrap();
        }

        assert!(path.exists());
        let store = ExperimentStore::open(&path).await.unwrap();
        let stored = store.get("disk0000").await.unwrap().unwrap();
        assert_eq!(stored.results.len(), 3);
    }
}
