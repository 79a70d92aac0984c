use std::time::Duration;

use anyhow::Context as _;
use sqlx::SqliteConnection;

use crate::{database::Database, model::timeouts::TimeoutEntry};

#[derive(sqlx::FromRow)]
struct TimeoutRow {
    started_at: i64,
    ends_at: i64,
}

/// Append a timed-mute interval for a member. Rows are never removed.
///
/// Callers write this only after the platform accepted the mute.
pub async fn record_timeout(
    db: &Database,
    member_id: &str,
    started_at: u64,
    duration: Duration,
) -> anyhow::Result<TimeoutEntry> {
    let duration_millis =
        u64::try_from(duration.as_millis()).context("timeout duration out of u64 range")?;
    let ends_at = started_at
        .checked_add(duration_millis)
        .context("timeout end overflows u64")?;
    let started_at_i64 = i64::try_from(started_at).context("started_at out of i64 range")?;
    let ends_at_i64 = i64::try_from(ends_at).context("ends_at out of i64 range")?;

    sqlx::query("INSERT INTO timeout_records (member_id, started_at, ends_at) VALUES (?, ?, ?)")
        .bind(member_id)
        .bind(started_at_i64)
        .bind(ends_at_i64)
        .execute(db.pool())
        .await?;

    Ok(TimeoutEntry {
        started_at,
        ends_at,
    })
}

pub(crate) async fn fetch_timeouts(
    conn: &mut SqliteConnection,
    member_id: &str,
) -> anyhow::Result<Vec<TimeoutEntry>> {
    let rows: Vec<TimeoutRow> = sqlx::query_as(
        "SELECT started_at, ends_at FROM timeout_records WHERE member_id = ? ORDER BY id ASC",
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?;

    let mut entries = Vec::with_capacity(rows.len());
    for row in rows {
        entries.push(TimeoutEntry {
            started_at: u64::try_from(row.started_at).context("started_at row out of u64 range")?,
            ends_at: u64::try_from(row.ends_at).context("ends_at row out of u64 range")?,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::record_timeout;
    use crate::database::Database;
    use crate::impls::warnings::{record_warning, remove_warnings, warning_history};

    #[tokio::test]
    async fn timeout_records_span_the_mute_duration() {
        let db = Database::open_in_memory().await.unwrap();

        let entry = record_timeout(&db, "7", 1_000, Duration::from_secs(3_600))
            .await
            .unwrap();

        assert_eq!(entry.started_at, 1_000);
        assert_eq!(entry.ends_at, 3_601_000);
        assert_eq!(entry.duration_millis(), 3_600_000);
        assert!(entry.is_active_at(3_600_999));
        assert!(!entry.is_active_at(3_601_000));
    }

    #[tokio::test]
    async fn timeouts_are_listed_in_insertion_order() {
        let db = Database::open_in_memory().await.unwrap();

        record_timeout(&db, "7", 5_000, Duration::from_secs(60)).await.unwrap();
        record_timeout(&db, "7", 1_000, Duration::from_secs(1)).await.unwrap();
        record_timeout(&db, "8", 2_000, Duration::from_secs(1)).await.unwrap();

        let history = warning_history(&db, "7").await.unwrap();
        let starts = history
            .timeouts
            .iter()
            .map(|entry| entry.started_at)
            .collect::<Vec<_>>();
        assert_eq!(starts, vec![5_000, 1_000]);
    }

    #[tokio::test]
    async fn removing_warnings_keeps_timeout_history() {
        let db = Database::open_in_memory().await.unwrap();

        record_warning(&db, "7", None).await.unwrap();
        record_warning(&db, "7", None).await.unwrap();
        record_timeout(&db, "7", 1_000, Duration::from_secs(3_600)).await.unwrap();

        remove_warnings(&db, "7", 2).await.unwrap();

        let history = warning_history(&db, "7").await.unwrap();
        assert_eq!(history.warn_count, 0);
        assert!(history.warnings.is_empty());
        assert_eq!(history.timeouts.len(), 1);
    }
}
