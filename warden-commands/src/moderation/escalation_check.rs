//! Shared warning and escalation flow.
//!
//! `issue_warning` commits the warning first, then consults the escalation
//! policy once with the fresh total and dispatches whatever it demands.
//! A failed dispatch is reported in the outcome but never undoes the warning.

use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use warden_database::Database;
use warden_database::impls::escalation::action_for;
use warden_database::impls::timeouts::record_timeout;
use warden_database::impls::warnings::{now_unix_millis, record_warning};
use warden_database::model::escalation::EscalationAction;
use warden_database::model::timeouts::TimeoutEntry;
use warden_database::model::warnings::WarningRecord;
use warden_utils::formatting::format_warning_count;

use crate::moderation::dispatch::{PunishmentDispatch, is_missing_permissions};

/// What happened on the platform after a ledger write.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// The policy asked for nothing.
    NotRequired,
    /// A timed mute was applied and recorded.
    Muted(TimeoutEntry),
    /// The member was kicked or banned.
    Removed,
    /// The platform refused or the request failed.
    Failed(anyhow::Error),
}

#[derive(Debug)]
pub struct WarningOutcome {
    pub warning: WarningRecord,
    pub action: EscalationAction,
    pub dispatch: DispatchOutcome,
}

/// Ledger key for a platform user.
pub fn member_key(user_id: serenity::UserId) -> String {
    user_id.get().to_string()
}

/// Record a warning and apply the punishment owed for the new total.
///
/// Store faults are returned as errors. Dispatch faults are logged and
/// surface as [`DispatchOutcome::Failed`]; the warning stays recorded.
pub async fn issue_warning<D: PunishmentDispatch>(
    db: &Database,
    dispatcher: &D,
    user_id: serenity::UserId,
    reason: Option<&str>,
) -> anyhow::Result<WarningOutcome> {
    let warning = record_warning(db, &member_key(user_id), reason).await?;
    let action = action_for(warning.warn_count);

    info!(
        user_id = %user_id,
        warn_count = warning.warn_count,
        ?action,
        "warning recorded"
    );

    let audit_reason = format!("Reached {}", format_warning_count(warning.warn_count));
    let dispatch = match action {
        EscalationAction::None => DispatchOutcome::NotRequired,
        EscalationAction::TimedMute(duration) => {
            apply_mute(db, dispatcher, user_id, duration, &audit_reason).await?
        }
        EscalationAction::PermanentRemoval => ban_member(dispatcher, user_id, &audit_reason).await,
    };

    Ok(WarningOutcome {
        warning,
        action,
        dispatch,
    })
}

/// Apply a timed mute and, once the platform accepts it, append the timeout record.
///
/// Shared by escalation and the manual timeout command.
pub async fn apply_mute<D: PunishmentDispatch>(
    db: &Database,
    dispatcher: &D,
    user_id: serenity::UserId,
    duration: Duration,
    reason: &str,
) -> anyhow::Result<DispatchOutcome> {
    if let Err(source) = dispatcher
        .apply_timed_mute(user_id, duration, reason)
        .await
    {
        log_dispatch_failure(&source, user_id, "timed mute");
        return Ok(DispatchOutcome::Failed(source));
    }

    let entry = record_timeout(db, &member_key(user_id), now_unix_millis(), duration).await?;
    info!(
        user_id = %user_id,
        duration_ms = entry.duration_millis(),
        "timed mute applied"
    );

    Ok(DispatchOutcome::Muted(entry))
}

/// Kick a member. Kicks leave nothing in the ledger.
pub async fn kick_member<D: PunishmentDispatch>(
    dispatcher: &D,
    user_id: serenity::UserId,
    reason: &str,
) -> DispatchOutcome {
    match dispatcher.apply_kick(user_id, reason).await {
        Ok(()) => {
            info!(user_id = %user_id, "member kicked");
            DispatchOutcome::Removed
        }
        Err(source) => {
            log_dispatch_failure(&source, user_id, "kick");
            DispatchOutcome::Failed(source)
        }
    }
}

/// Permanently remove a member, for escalation and the manual ban command alike.
pub async fn ban_member<D: PunishmentDispatch>(
    dispatcher: &D,
    user_id: serenity::UserId,
    reason: &str,
) -> DispatchOutcome {
    match dispatcher.apply_permanent_removal(user_id, reason).await {
        Ok(()) => {
            info!(user_id = %user_id, "member banned");
            DispatchOutcome::Removed
        }
        Err(source) => {
            log_dispatch_failure(&source, user_id, "permanent removal");
            DispatchOutcome::Failed(source)
        }
    }
}

fn log_dispatch_failure(source: &anyhow::Error, user_id: serenity::UserId, action: &str) {
    if is_missing_permissions(source) {
        warn!(
            user_id = %user_id,
            action,
            "missing permissions to punish user (check role hierarchy)"
        );
    } else {
        error!(?source, user_id = %user_id, action, "punishment dispatch failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use poise::serenity_prelude as serenity;

    use super::{DispatchOutcome, apply_mute, ban_member, issue_warning, kick_member, member_key};
    use crate::moderation::dispatch::PunishmentDispatch;
    use warden_database::Database;
    use warden_database::impls::warnings::{remove_warnings, warning_history};
    use warden_database::model::escalation::EscalationAction;

    #[derive(Debug, PartialEq, Eq)]
    enum Call {
        Mute(u64, u128),
        Kick(u64),
        Ban(u64),
    }

    #[derive(Default)]
    struct ScriptedDispatch {
        fail: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedDispatch {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn record(&self, call: Call) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                anyhow::bail!("Missing Permissions");
            }
            Ok(())
        }

        fn take_calls(&self) -> Vec<Call> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    impl PunishmentDispatch for ScriptedDispatch {
        async fn apply_timed_mute(
            &self,
            user_id: serenity::UserId,
            duration: Duration,
            _reason: &str,
        ) -> anyhow::Result<()> {
            self.record(Call::Mute(user_id.get(), duration.as_millis()))
        }

        async fn apply_kick(&self, user_id: serenity::UserId, _reason: &str) -> anyhow::Result<()> {
            self.record(Call::Kick(user_id.get()))
        }

        async fn apply_permanent_removal(
            &self,
            user_id: serenity::UserId,
            _reason: &str,
        ) -> anyhow::Result<()> {
            self.record(Call::Ban(user_id.get()))
        }
    }

    const MEMBER_ID: u64 = 42;

    fn member() -> serenity::UserId {
        serenity::UserId::new(MEMBER_ID)
    }

    #[tokio::test]
    async fn escalates_through_every_tier() {
        let db = Database::open_in_memory().await.unwrap();
        let dispatch = ScriptedDispatch::default();

        let first = issue_warning(&db, &dispatch, member(), Some("spam")).await.unwrap();
        assert_eq!(first.warning.warn_count, 1);
        assert_eq!(first.action, EscalationAction::None);
        assert!(matches!(first.dispatch, DispatchOutcome::NotRequired));
        assert!(dispatch.take_calls().is_empty());

        let second = issue_warning(&db, &dispatch, member(), None).await.unwrap();
        assert_eq!(second.warning.warn_count, 2);
        assert_eq!(dispatch.take_calls(), vec![Call::Mute(42, 3_600_000)]);
        match second.dispatch {
            DispatchOutcome::Muted(entry) => assert_eq!(entry.duration_millis(), 3_600_000),
            other => panic!("expected a mute, got {other:?}"),
        }

        for _ in 3..=5 {
            issue_warning(&db, &dispatch, member(), None).await.unwrap();
        }
        assert_eq!(
            dispatch.take_calls(),
            vec![
                Call::Mute(42, 43_200_000),
                Call::Mute(42, 86_400_000),
                Call::Mute(42, 604_800_000),
            ]
        );

        let sixth = issue_warning(&db, &dispatch, member(), None).await.unwrap();
        assert_eq!(sixth.warning.warn_count, 6);
        assert_eq!(sixth.action, EscalationAction::PermanentRemoval);
        assert!(matches!(sixth.dispatch, DispatchOutcome::Removed));
        assert_eq!(dispatch.take_calls(), vec![Call::Ban(42)]);

        let history = warning_history(&db, &member_key(member())).await.unwrap();
        assert_eq!(history.warn_count, 6);
        assert_eq!(history.timeouts.len(), 4);
    }

    #[tokio::test]
    async fn failed_dispatch_keeps_the_warning() {
        let db = Database::open_in_memory().await.unwrap();
        let dispatch = ScriptedDispatch::failing();

        issue_warning(&db, &dispatch, member(), Some("first")).await.unwrap();
        let second = issue_warning(&db, &dispatch, member(), Some("second"))
            .await
            .unwrap();

        assert_eq!(second.warning.warn_count, 2);
        assert!(matches!(second.dispatch, DispatchOutcome::Failed(_)));
        assert_eq!(dispatch.take_calls(), vec![Call::Mute(42, 3_600_000)]);

        let history = warning_history(&db, &member_key(member())).await.unwrap();
        assert_eq!(history.warn_count, 2);
        assert_eq!(history.warnings.len(), 2);
        assert!(history.timeouts.is_empty());
    }

    #[tokio::test]
    async fn failed_removal_still_counts_the_sixth_warning() {
        let db = Database::open_in_memory().await.unwrap();
        let ok = ScriptedDispatch::default();
        for _ in 0..5 {
            issue_warning(&db, &ok, member(), None).await.unwrap();
        }

        let failing = ScriptedDispatch::failing();
        let sixth = issue_warning(&db, &failing, member(), None).await.unwrap();

        assert_eq!(sixth.action, EscalationAction::PermanentRemoval);
        assert!(matches!(sixth.dispatch, DispatchOutcome::Failed(_)));
        let history = warning_history(&db, &member_key(member())).await.unwrap();
        assert_eq!(history.warn_count, 6);
    }

    #[tokio::test]
    async fn escalation_follows_live_count_after_removal() {
        let db = Database::open_in_memory().await.unwrap();
        let dispatch = ScriptedDispatch::default();
        for _ in 0..5 {
            issue_warning(&db, &dispatch, member(), None).await.unwrap();
        }
        dispatch.take_calls();

        let removal = remove_warnings(&db, &member_key(member()), 2).await.unwrap();
        assert_eq!(removal.remaining, 3);

        let next = issue_warning(&db, &dispatch, member(), None).await.unwrap();

        assert_eq!(next.warning.warn_count, 4);
        assert_eq!(
            next.action,
            EscalationAction::TimedMute(Duration::from_secs(86_400))
        );
        assert_eq!(dispatch.take_calls(), vec![Call::Mute(42, 86_400_000)]);

        let history = warning_history(&db, &member_key(member())).await.unwrap();
        assert_eq!(history.timeouts.len(), 5);
    }

    #[tokio::test]
    async fn manual_mute_records_timeout_only_on_success() {
        let db = Database::open_in_memory().await.unwrap();

        let refused = apply_mute(
            &db,
            &ScriptedDispatch::failing(),
            member(),
            Duration::from_secs(600),
            "spam",
        )
        .await
        .unwrap();
        assert!(matches!(refused, DispatchOutcome::Failed(_)));

        let applied = apply_mute(
            &db,
            &ScriptedDispatch::default(),
            member(),
            Duration::from_secs(600),
            "spam",
        )
        .await
        .unwrap();
        assert!(matches!(applied, DispatchOutcome::Muted(_)));

        let history = warning_history(&db, &member_key(member())).await.unwrap();
        assert_eq!(history.warn_count, 0);
        assert_eq!(history.timeouts.len(), 1);
        assert_eq!(history.timeouts[0].duration_millis(), 600_000);
    }

    #[tokio::test]
    async fn direct_removals_report_the_platform_result() {
        let ok = ScriptedDispatch::default();
        assert!(matches!(
            kick_member(&ok, member(), "rude").await,
            DispatchOutcome::Removed
        ));
        assert!(matches!(
            ban_member(&ok, member(), "raid").await,
            DispatchOutcome::Removed
        ));
        assert_eq!(ok.take_calls(), vec![Call::Kick(42), Call::Ban(42)]);

        let refusing = ScriptedDispatch::failing();
        assert!(matches!(
            kick_member(&refusing, member(), "rude").await,
            DispatchOutcome::Failed(_)
        ));
        assert!(matches!(
            ban_member(&refusing, member(), "raid").await,
            DispatchOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn store_fault_aborts_before_any_punishment() {
        let db = Database::open_in_memory().await.unwrap();
        let dispatch = ScriptedDispatch::default();
        issue_warning(&db, &dispatch, member(), None).await.unwrap();
        db.close().await;

        let result = issue_warning(&db, &dispatch, member(), Some("second")).await;

        assert!(result.is_err());
        assert!(dispatch.take_calls().is_empty());
    }

    #[tokio::test]
    async fn mute_bookkeeping_fault_is_propagated() {
        let db = Database::open_in_memory().await.unwrap();
        let dispatch = ScriptedDispatch::default();
        db.close().await;

        let result = apply_mute(&db, &dispatch, member(), Duration::from_secs(60), "spam").await;

        assert!(result.is_err());
        assert_eq!(dispatch.take_calls(), vec![Call::Mute(42, 60_000)]);
    }
}
