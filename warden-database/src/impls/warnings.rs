use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use tracing::warn;

use crate::{
    database::Database,
    impls::timeouts::fetch_timeouts,
    model::warnings::{WarningEntry, WarningHistory, WarningRecord, WarningRemoval},
};

/// Stored (and shown) when a moderator gives no reason.
pub const DEFAULT_REASON: &str = "No reason provided";

#[derive(sqlx::FromRow)]
struct WarningRow {
    reason: String,
    issued_at: i64,
}

/// Record a warning for a member and return the new warning total.
///
/// The count increment and the history append commit together or not at all.
pub async fn record_warning(
    db: &Database,
    member_id: &str,
    reason: Option<&str>,
) -> anyhow::Result<WarningRecord> {
    let reason = normalize_reason(reason);
    let issued_at_i64 = i64::try_from(now_unix_millis()).context("issued_at out of i64 range")?;

    let mut tx = db.pool().begin().await?;

    // Upsert first so the transaction holds the write lock before it reads the count.
    let warn_count: i64 = sqlx::query_scalar(
        "INSERT INTO warning_counts (member_id, warn_count) VALUES (?, 1)
         ON CONFLICT (member_id) DO UPDATE SET warn_count = warn_count + 1
         RETURNING warn_count",
    )
    .bind(member_id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO warning_records (member_id, reason, issued_at) VALUES (?, ?, ?)")
        .bind(member_id)
        .bind(&reason)
        .bind(issued_at_i64)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let warn_count = u64::try_from(warn_count).context("warn count out of u64 range")?;
    Ok(WarningRecord { warn_count, reason })
}

/// Remove up to `requested` of the member's most recent warnings.
///
/// A request of 0 is treated as 1. Removal is newest first, so what remains
/// is always the member's oldest history. A member with no warnings is a
/// no-op that reports zero removed.
pub async fn remove_warnings(
    db: &Database,
    member_id: &str,
    requested: u64,
) -> anyhow::Result<WarningRemoval> {
    let requested = requested.max(1);

    let mut tx = db.pool().begin().await?;

    // Touching the row takes the write lock, so the count read here cannot go stale.
    let current: Option<i64> = sqlx::query_scalar(
        "UPDATE warning_counts SET warn_count = warn_count WHERE member_id = ? RETURNING warn_count",
    )
    .bind(member_id)
    .fetch_optional(&mut *tx)
    .await?;

    let current = u64::try_from(current.unwrap_or(0)).context("warn count out of u64 range")?;
    if current == 0 {
        return Ok(WarningRemoval {
            removed: 0,
            remaining: 0,
        });
    }

    let removed = requested.min(current);
    let remaining = current - removed;
    let remaining_i64 = i64::try_from(remaining).context("remaining out of i64 range")?;
    let removed_i64 = i64::try_from(removed).context("removed out of i64 range")?;

    sqlx::query("UPDATE warning_counts SET warn_count = ? WHERE member_id = ?")
        .bind(remaining_i64)
        .bind(member_id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query(
        "DELETE FROM warning_records WHERE id IN (
            SELECT id FROM warning_records
            WHERE member_id = ?
            ORDER BY issued_at DESC, id DESC
            LIMIT ?
        )",
    )
    .bind(member_id)
    .bind(removed_i64)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    if deleted != removed {
        warn!(
            member_id,
            removed, deleted, "warning history was out of step with the cached count"
        );
    }

    Ok(WarningRemoval { removed, remaining })
}

/// Return the member's count, warnings oldest first, and every recorded timeout.
///
/// Unknown members yield an empty history.
pub async fn warning_history(db: &Database, member_id: &str) -> anyhow::Result<WarningHistory> {
    let mut tx = db.pool().begin().await?;

    let warn_count: Option<i64> =
        sqlx::query_scalar("SELECT warn_count FROM warning_counts WHERE member_id = ?")
            .bind(member_id)
            .fetch_optional(&mut *tx)
            .await?;

    let rows: Vec<WarningRow> = sqlx::query_as(
        "SELECT reason, issued_at
         FROM warning_records
         WHERE member_id = ?
         ORDER BY issued_at ASC, id ASC",
    )
    .bind(member_id)
    .fetch_all(&mut *tx)
    .await?;

    let timeouts = fetch_timeouts(&mut *tx, member_id).await?;

    tx.commit().await?;

    let mut warnings = Vec::with_capacity(rows.len());
    for row in rows {
        let issued_at = u64::try_from(row.issued_at).context("issued_at row out of u64 range")?;
        warnings.push(WarningEntry {
            reason: row.reason,
            issued_at,
        });
    }

    Ok(WarningHistory {
        warn_count: u64::try_from(warn_count.unwrap_or(0))
            .context("warn count out of u64 range")?,
        warnings,
        timeouts,
    })
}

fn normalize_reason(reason: Option<&str>) -> String {
    reason
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(DEFAULT_REASON)
        .to_owned()
}

pub fn now_unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        })
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_REASON, record_warning, remove_warnings, warning_history};
    use crate::database::{Database, MIGRATOR};

    async fn reasons(db: &Database, member_id: &str) -> Vec<String> {
        warning_history(db, member_id)
            .await
            .unwrap()
            .warnings
            .into_iter()
            .map(|entry| entry.reason)
            .collect()
    }

    async fn stored_rows(db: &Database, member_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM warning_records WHERE member_id = ?")
            .bind(member_id)
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_member_has_empty_history() {
        let db = Database::open_in_memory().await.unwrap();

        let history = warning_history(&db, "1").await.unwrap();

        assert_eq!(history.warn_count, 0);
        assert!(history.warnings.is_empty());
        assert!(history.timeouts.is_empty());
    }

    #[tokio::test]
    async fn each_warning_increments_count_and_history() {
        let db = Database::open_in_memory().await.unwrap();

        for expected in 1..=5 {
            let record = record_warning(&db, "1", Some("spam")).await.unwrap();
            assert_eq!(record.warn_count, expected);
        }

        let history = warning_history(&db, "1").await.unwrap();
        assert_eq!(history.warn_count, 5);
        assert_eq!(history.warnings.len(), 5);
        assert_eq!(stored_rows(&db, "1").await, 5);
    }

    #[tokio::test]
    async fn members_are_tracked_independently() {
        let db = Database::open_in_memory().await.unwrap();

        record_warning(&db, "1", None).await.unwrap();
        record_warning(&db, "1", None).await.unwrap();
        let other = record_warning(&db, "2", None).await.unwrap();

        assert_eq!(other.warn_count, 1);
        assert_eq!(warning_history(&db, "1").await.unwrap().warn_count, 2);
    }

    #[tokio::test]
    async fn missing_or_blank_reason_uses_placeholder() {
        let db = Database::open_in_memory().await.unwrap();

        let none = record_warning(&db, "1", None).await.unwrap();
        let blank = record_warning(&db, "1", Some("   ")).await.unwrap();
        let given = record_warning(&db, "1", Some("  flooding ")).await.unwrap();

        assert_eq!(none.reason, DEFAULT_REASON);
        assert_eq!(blank.reason, DEFAULT_REASON);
        assert_eq!(given.reason, "flooding");
    }

    #[tokio::test]
    async fn removal_drops_newest_warnings_first() {
        let db = Database::open_in_memory().await.unwrap();

        for reason in ["A", "B", "C"] {
            record_warning(&db, "1", Some(reason)).await.unwrap();
        }

        let removal = remove_warnings(&db, "1", 1).await.unwrap();

        assert_eq!(removal.removed, 1);
        assert_eq!(removal.remaining, 2);
        assert_eq!(reasons(&db, "1").await, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn removal_is_capped_at_current_count() {
        let db = Database::open_in_memory().await.unwrap();

        for _ in 0..3 {
            record_warning(&db, "1", None).await.unwrap();
        }

        let removal = remove_warnings(&db, "1", 10).await.unwrap();

        assert_eq!(removal.removed, 3);
        assert_eq!(removal.remaining, 0);
        assert_eq!(warning_history(&db, "1").await.unwrap().warn_count, 0);
        assert_eq!(stored_rows(&db, "1").await, 0);
    }

    #[tokio::test]
    async fn removing_from_clean_member_is_a_no_op() {
        let db = Database::open_in_memory().await.unwrap();

        let unknown = remove_warnings(&db, "1", 3).await.unwrap();
        assert_eq!(unknown.removed, 0);

        record_warning(&db, "1", None).await.unwrap();
        remove_warnings(&db, "1", 1).await.unwrap();
        let emptied = remove_warnings(&db, "1", 1).await.unwrap();

        assert_eq!(emptied.removed, 0);
        assert_eq!(emptied.remaining, 0);
    }

    #[tokio::test]
    async fn zero_request_removes_one() {
        let db = Database::open_in_memory().await.unwrap();

        record_warning(&db, "1", Some("A")).await.unwrap();
        record_warning(&db, "1", Some("B")).await.unwrap();

        let removal = remove_warnings(&db, "1", 0).await.unwrap();

        assert_eq!(removal.removed, 1);
        assert_eq!(reasons(&db, "1").await, vec!["A"]);
    }

    #[tokio::test]
    async fn count_matches_stored_rows_after_mixed_operations() {
        let db = Database::open_in_memory().await.unwrap();

        for _ in 0..4 {
            record_warning(&db, "1", None).await.unwrap();
        }
        remove_warnings(&db, "1", 3).await.unwrap();
        record_warning(&db, "1", None).await.unwrap();
        record_warning(&db, "1", None).await.unwrap();
        remove_warnings(&db, "1", 1).await.unwrap();

        let history = warning_history(&db, "1").await.unwrap();
        assert_eq!(history.warn_count, 2);
        assert_eq!(history.warnings.len(), 2);
        assert_eq!(stored_rows(&db, "1").await, 2);
    }

    #[tokio::test]
    async fn removal_resyncs_count_when_history_is_short() {
        let db = Database::open_in_memory().await.unwrap();

        record_warning(&db, "1", None).await.unwrap();
        sqlx::query("UPDATE warning_counts SET warn_count = 3 WHERE member_id = '1'")
            .execute(db.pool())
            .await
            .unwrap();

        let removal = remove_warnings(&db, "1", 2).await.unwrap();

        assert_eq!(removal.removed, 2);
        assert_eq!(removal.remaining, 1);
        assert_eq!(stored_rows(&db, "1").await, 0);
    }

    #[tokio::test]
    async fn history_reads_are_repeatable() {
        let db = Database::open_in_memory().await.unwrap();

        record_warning(&db, "1", Some("A")).await.unwrap();
        record_warning(&db, "1", Some("B")).await.unwrap();

        let first = warning_history(&db, "1").await.unwrap();
        let second = warning_history(&db, "1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(reasons(&db, "1").await, vec!["A", "B"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_warnings_for_one_member_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());
        let db = Database::connect(&url, 4).await.unwrap();
        MIGRATOR.run(db.pool()).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                record_warning(&db, "1", None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let history = warning_history(&db, "1").await.unwrap();
        assert_eq!(history.warn_count, 16);
        assert_eq!(history.warnings.len(), 16);
        db.close().await;
    }

    #[tokio::test]
    async fn ledger_survives_reopen_and_repeated_migrations() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("ledger.db").display());

        let db = Database::connect(&url, 1).await.unwrap();
        MIGRATOR.run(db.pool()).await.unwrap();
        record_warning(&db, "1", Some("A")).await.unwrap();
        record_warning(&db, "1", Some("B")).await.unwrap();
        db.close().await;

        let reopened = Database::connect(&url, 1).await.unwrap();
        MIGRATOR.run(reopened.pool()).await.unwrap();

        let history = warning_history(&reopened, "1").await.unwrap();
        assert_eq!(history.warn_count, 2);
        assert_eq!(reasons(&reopened, "1").await, vec!["A", "B"]);

        let record = record_warning(&reopened, "1", None).await.unwrap();
        assert_eq!(record.warn_count, 3);
        reopened.close().await;
    }
}
