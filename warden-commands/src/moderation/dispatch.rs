//! Punitive actions applied on the platform.
//!
//! Every call is fallible. Callers catch the failure, report it, and keep
//! whatever ledger writes already committed.

use std::future::Future;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;
use poise::serenity_prelude as serenity;
use warden_utils::formatting::truncate_for_display;

/// Discord's limit for audit log reasons.
const MAX_AUDIT_REASON_CHARS: usize = 512;

/// Platform side of escalation and the direct punishment commands.
pub trait PunishmentDispatch: Sync {
    fn apply_timed_mute(
        &self,
        user_id: serenity::UserId,
        duration: Duration,
        reason: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn apply_kick(
        &self,
        user_id: serenity::UserId,
        reason: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn apply_permanent_removal(
        &self,
        user_id: serenity::UserId,
        reason: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Dispatches through serenity's HTTP client against one guild.
#[derive(Clone, Copy)]
pub struct GuildDispatcher<'a> {
    http: &'a serenity::Http,
    guild_id: serenity::GuildId,
}

impl<'a> GuildDispatcher<'a> {
    pub fn new(http: &'a serenity::Http, guild_id: serenity::GuildId) -> Self {
        Self { http, guild_id }
    }
}

impl PunishmentDispatch for GuildDispatcher<'_> {
    async fn apply_timed_mute(
        &self,
        user_id: serenity::UserId,
        duration: Duration,
        reason: &str,
    ) -> anyhow::Result<()> {
        let until = mute_deadline(duration)?;
        let reason = audit_reason(reason);
        let edit = serenity::EditMember::new()
            .disable_communication_until_datetime(until)
            .audit_log_reason(&reason);

        self.guild_id.edit_member(self.http, user_id, edit).await?;
        Ok(())
    }

    async fn apply_kick(&self, user_id: serenity::UserId, reason: &str) -> anyhow::Result<()> {
        self.guild_id
            .kick_with_reason(self.http, user_id, &audit_reason(reason))
            .await?;
        Ok(())
    }

    async fn apply_permanent_removal(
        &self,
        user_id: serenity::UserId,
        reason: &str,
    ) -> anyhow::Result<()> {
        self.guild_id
            .ban_with_reason(self.http, user_id, 0, &audit_reason(reason))
            .await?;
        Ok(())
    }
}

fn audit_reason(reason: &str) -> String {
    truncate_for_display(reason, MAX_AUDIT_REASON_CHARS)
}

fn mute_deadline(duration: Duration) -> anyhow::Result<serenity::Timestamp> {
    let until = SystemTime::now()
        .checked_add(duration)
        .context("mute deadline overflows system time")?
        .duration_since(UNIX_EPOCH)
        .context("system clock is before the unix epoch")?;
    let until_secs = i64::try_from(until.as_secs()).context("mute deadline out of i64 range")?;

    Ok(serenity::Timestamp::from_unix_timestamp(until_secs)?)
}

/// True when the platform refused the action for lack of permissions or role hierarchy.
pub fn is_missing_permissions(source: &anyhow::Error) -> bool {
    matches!(
        source.downcast_ref::<serenity::Error>(),
        Some(serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}
