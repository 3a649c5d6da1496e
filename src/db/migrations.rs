use anyhow::{bail, Context};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

/// Applies every `.sql` script under `dir` in filename order, once each.
/// Applied scripts are recorded in `schema_migrations`, so re-running
/// against the same database is a no-op.
///
/// A missing or empty migrations directory is fatal: the engine cannot
/// persist call sessions without its schema, so we refuse to start
/// rather than limp along with no tables.
pub fn run_migrations(conn: &Connection, dir: &Path) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create schema_migrations table")?;

    if !dir.is_dir() {
        bail!("migrations directory not found: {}", dir.display());
    }

    let mut scripts: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("failed to read migrations directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().map_or(false, |ext| ext == "sql"))
        .collect();
    scripts.sort();

    if scripts.is_empty() {
        bail!("no .sql migrations found in {}", dir.display());
    }

    for path in scripts {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE name = ?1)",
                [&name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if applied {
            continue;
        }

        let sql = fs::read_to_string(&path)
            .with_context(|| format!("failed to read migration script: {name}"))?;

        conn.execute_batch(&sql)
            .with_context(|| format!("migration failed: {name}"))?;

        conn.execute("INSERT INTO schema_migrations (name) VALUES (?1)", [&name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!(migration = %name, "schema migration applied");
    }

    Ok(())
}
