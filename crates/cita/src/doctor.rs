// SPDX-FileCopyrightText: 2026 Cita Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cita doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database, and the
//! listen address, and prints one line per check.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use cita_config::CitaConfig;
use cita_core::CitaError;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn finish(
        name: &'static str,
        started: Instant,
        status: CheckStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: started.elapsed(),
        }
    }

    fn render(&self, use_color: bool) -> String {
        use colored::Colorize;

        let ms = self.duration.as_millis();
        if !use_color {
            let tag = match self.status {
                CheckStatus::Pass => "[OK]  ",
                CheckStatus::Warn => "[WARN]",
                CheckStatus::Fail => "[FAIL]",
            };
            return format!("    {tag} {:<20} {} ({ms}ms)", self.name, self.message);
        }

        let (symbol, message) = match self.status {
            CheckStatus::Pass => ("✓".green(), self.message.normal()),
            CheckStatus::Warn => ("!".yellow(), self.message.yellow()),
            CheckStatus::Fail => ("✗".red(), self.message.red()),
        };
        format!("    {symbol} {:<20} {message} ({ms}ms)", self.name)
    }
}

/// Run the `cita doctor` command.
///
/// With `deep`, also runs the integrity and memory checks. With `plain`, or
/// when stdout is not a terminal, prints without color.
pub async fn run_doctor(
    config: &CitaConfig,
    config_path: Option<&Path>,
    deep: bool,
    plain: bool,
) -> Result<(), CitaError> {
    let use_color = !plain && std::io::stdout().is_terminal();

    let db_path = config.storage.database_path.as_str();
    let mut results = vec![
        check_config(config_path),
        check_database(db_path).await,
        check_appointments(db_path).await,
        check_listen_address(&config.server.host, config.server.port).await,
    ];
    if deep {
        results.push(check_db_integrity(db_path).await);
        results.push(check_memory_baseline());
    }

    println!();
    println!("  cita doctor");
    println!("  {}", "-".repeat(50));
    for result in &results {
        println!("{}", result.render(use_color));
    }
    println!();

    let issues = results
        .iter()
        .filter(|r| r.status != CheckStatus::Pass)
        .count();
    match issues {
        0 => println!("  All checks passed."),
        1 => println!("  1 issue found."),
        n => println!("  {n} issues found."),
    }
    if issues > 0 && !deep {
        println!("  Run with --deep for detailed diagnostics.");
    }
    println!();

    Ok(())
}

/// Configuration loads and validates.
fn check_config(path: Option<&Path>) -> CheckResult {
    let started = Instant::now();
    let loaded = match path {
        Some(path) => cita_config::load_and_validate_path(path),
        None => cita_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::finish("Configuration", started, CheckStatus::Pass, "valid"),
        Err(errors) => CheckResult::finish(
            "Configuration",
            started,
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
        ),
    }
}

/// Database file exists and answers a query.
async fn check_database(db_path: &str) -> CheckResult {
    const NAME: &str = "Database";
    let started = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::finish(
            NAME,
            started,
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::finish(NAME, started, CheckStatus::Fail, format!("open failed: {e}"));
        }
    };
    let ping = conn
        .call(|conn| -> Result<(), rusqlite::Error> {
            conn.execute_batch("SELECT 1")?;
            Ok(())
        })
        .await;
    match ping {
        Ok(()) => CheckResult::finish(NAME, started, CheckStatus::Pass, "connected"),
        Err(e) => CheckResult::finish(NAME, started, CheckStatus::Fail, format!("query failed: {e}")),
    }
}

/// Appointment table is present; reports how many records it holds.
async fn check_appointments(db_path: &str) -> CheckResult {
    const NAME: &str = "Appointments";
    let started = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::finish(NAME, started, CheckStatus::Warn, "database not found (skipped)");
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::finish(NAME, started, CheckStatus::Fail, format!("open failed: {e}"));
        }
    };
    let counted = conn
        .call(|conn| {
            conn.query_row("SELECT COUNT(*) FROM appointments", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .await;
    match counted {
        Ok(1) => CheckResult::finish(NAME, started, CheckStatus::Pass, "1 appointment"),
        Ok(n) => CheckResult::finish(NAME, started, CheckStatus::Pass, format!("{n} appointments")),
        Err(e) => CheckResult::finish(
            NAME,
            started,
            CheckStatus::Warn,
            format!("schema not initialized ({e})"),
        ),
    }
}

/// The configured address can be bound.
async fn check_listen_address(host: &str, port: u16) -> CheckResult {
    const NAME: &str = "Listen address";
    let started = Instant::now();
    let addr = format!("{host}:{port}");

    match tokio::net::TcpListener::bind(&addr).await {
        Ok(_) => CheckResult::finish(NAME, started, CheckStatus::Pass, format!("{addr} available")),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => CheckResult::finish(
            NAME,
            started,
            CheckStatus::Warn,
            format!("{addr} in use (is cita already running?)"),
        ),
        Err(e) => CheckResult::finish(NAME, started, CheckStatus::Fail, format!("{addr}: {e}")),
    }
}

/// Deep check: SQLite integrity check.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    const NAME: &str = "DB integrity";
    let started = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::finish(NAME, started, CheckStatus::Warn, "database not found (skipped)");
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::finish(NAME, started, CheckStatus::Fail, format!("open failed: {e}"));
        }
    };
    let rows = conn
        .call(|conn| {
            let mut stmt = conn.prepare("PRAGMA integrity_check")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await;
    match rows {
        Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
            CheckResult::finish(NAME, started, CheckStatus::Pass, "ok")
        }
        Ok(rows) => CheckResult::finish(
            NAME,
            started,
            CheckStatus::Fail,
            format!("{} issue(s) found", rows.len()),
        ),
        Err(e) => CheckResult::finish(NAME, started, CheckStatus::Fail, format!("check failed: {e}")),
    }
}

/// Deep check: memory baseline via jemalloc.
fn check_memory_baseline() -> CheckResult {
    const NAME: &str = "Memory baseline";
    let started = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let mb = |bytes: usize| bytes as f64 / (1024.0 * 1024.0);
        CheckResult::finish(
            NAME,
            started,
            CheckStatus::Pass,
            format!(
                "heap: {:.1} MB, resident: {:.1} MB",
                mb(allocated),
                mb(resident)
            ),
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::finish(NAME, started, CheckStatus::Warn, "jemalloc not available on MSVC")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cita_config::model::StorageConfig;
    use cita_core::StorageAdapter;
    use cita_storage::SqliteStorage;

    async fn initialized_db(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("cita.db").to_string_lossy().into_owned();
        let storage = SqliteStorage::open(StorageConfig {
            database_path: path.clone(),
            wal_mode: true,
        })
        .await
        .unwrap();
        storage.close().await.unwrap();
        path
    }

    #[test]
    fn plain_render_uses_tags() {
        let result = CheckResult {
            name: "Database",
            status: CheckStatus::Warn,
            message: "not found".to_string(),
            duration: Duration::from_millis(5),
        };
        let line = result.render(false);
        assert!(line.contains("[WARN]"));
        assert!(line.contains("Database"));
        assert!(line.contains("(5ms)"));
    }

    #[tokio::test]
    async fn check_database_missing_warns() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.db");
        let result = check_database(missing.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn initialized_database_passes_all_db_checks() {
        let dir = tempfile::tempdir().unwrap();
        let path = initialized_db(&dir).await;

        assert_eq!(check_database(&path).await.status, CheckStatus::Pass);
        let count = check_appointments(&path).await;
        assert_eq!(count.status, CheckStatus::Pass);
        assert_eq!(count.message, "0 appointments");
        assert_eq!(check_db_integrity(&path).await.status, CheckStatus::Pass);
    }

    #[tokio::test]
    async fn uninitialized_schema_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        std::fs::write(&path, b"").unwrap();
        let result = check_appointments(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn occupied_port_warns() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let result = check_listen_address("127.0.0.1", port).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn memory_baseline_reports() {
        let result = check_memory_baseline();
        assert!(result.status == CheckStatus::Pass || result.status == CheckStatus::Warn);
    }
}
