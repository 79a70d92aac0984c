use poise::serenity_prelude as serenity;

use warden_database::model::escalation::{EscalationAction, ScheduleEntry};
use warden_database::model::timeouts::TimeoutEntry;
use warden_utils::embed::{DEFAULT_EMBED_COLOR, PUNISHMENT_EMBED_COLOR, SCHEDULE_EMBED_COLOR};
use warden_utils::formatting::{
    discord_timestamp, display_reason, format_compact_duration, format_warning_count,
};

#[derive(Clone, Debug)]
pub struct TargetProfile {
    pub display_name: String,
    pub avatar_url: Option<String>,
}

pub fn target_profile_from_user(user: &serenity::User) -> TargetProfile {
    TargetProfile {
        display_name: user
            .global_name
            .clone()
            .unwrap_or_else(|| user.name.clone()),
        avatar_url: Some(user.face()),
    }
}

fn headed_embed(target_profile: &TargetProfile, heading: String, color: u32) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new().color(color);

    match target_profile.avatar_url.as_deref() {
        Some(url) => embed.author(serenity::CreateEmbedAuthor::new(heading).icon_url(url)),
        None => embed.title(heading),
    }
}

pub fn moderation_action_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    action_past_tense: &str,
    reason: Option<&str>,
    duration: Option<&str>,
) -> serenity::CreateEmbed {
    let reason = display_reason(reason.unwrap_or("No reason provided"));

    let mut lines = vec![
        format!("**Target :** <@{}>", target_user_id.get()),
        format!("**Reason :** {}", reason),
    ];
    if let Some(duration) = duration {
        lines.push(format!("**Duration :** {}", duration));
    }

    headed_embed(
        target_profile,
        format!("{} has been {}", target_profile.display_name, action_past_tense),
        DEFAULT_EMBED_COLOR,
    )
    .description(lines.join("\n"))
}

pub fn warning_issued_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    warn_count: u64,
    reason: &str,
) -> serenity::CreateEmbed {
    headed_embed(
        target_profile,
        format!("Warning for {}", target_profile.display_name),
        PUNISHMENT_EMBED_COLOR,
    )
    .description(format!(
        "<@{}> has been warned and now has **{}**.\n**Reason :** {}",
        target_user_id.get(),
        format_warning_count(warn_count),
        display_reason(reason)
    ))
    .timestamp(serenity::Timestamp::now())
}

/// Notice sent after escalation dispatched a punishment for `warn_count`.
pub fn escalation_embed(
    target_profile: &TargetProfile,
    target_user_id: serenity::UserId,
    warn_count: u64,
    action: EscalationAction,
) -> serenity::CreateEmbed {
    let (heading, body) = match action {
        EscalationAction::TimedMute(duration) => (
            format!("Timeout for {}", target_profile.display_name),
            format!(
                "<@{}> has been timed out for **{}** for reaching {}.",
                target_user_id.get(),
                format_compact_duration(duration.as_secs()),
                format_warning_count(warn_count)
            ),
        ),
        EscalationAction::PermanentRemoval => (
            format!("Ban for {}", target_profile.display_name),
            format!(
                "<@{}> has been banned for reaching {}.",
                target_user_id.get(),
                format_warning_count(warn_count)
            ),
        ),
        EscalationAction::None => (
            format!("Warning for {}", target_profile.display_name),
            format!("No punishment for {}.", format_warning_count(warn_count)),
        ),
    };

    headed_embed(target_profile, heading, PUNISHMENT_EMBED_COLOR)
        .description(body)
        .timestamp(serenity::Timestamp::now())
}

/// User-facing name of a punishment.
pub fn action_label(action: EscalationAction) -> String {
    match action {
        EscalationAction::None => "No punishment (warning only)".to_owned(),
        EscalationAction::TimedMute(duration) => {
            format!("Timeout for {}", format_compact_duration(duration.as_secs()))
        }
        EscalationAction::PermanentRemoval => "Ban (until appealed)".to_owned(),
    }
}

pub fn schedule_embed(schedule: &[ScheduleEntry]) -> serenity::CreateEmbed {
    let fields = schedule.iter().map(|entry| {
        (
            format_warning_count(entry.warn_count),
            action_label(entry.action),
            false,
        )
    });

    serenity::CreateEmbed::new()
        .color(SCHEDULE_EMBED_COLOR)
        .title("Penalty Schedule")
        .description("How many warnings lead to which punishment.")
        .fields(fields)
}

/// One history block per warning, numbered oldest first.
pub fn warning_history_block(index: usize, reason: &str, issued_at: u64) -> String {
    format!(
        "**#{}** • {}\n**Reason :** {}",
        index + 1,
        discord_timestamp(issued_at, 'f'),
        display_reason(reason)
    )
}

pub fn timeout_history_block(index: usize, entry: &TimeoutEntry, now_millis: u64) -> String {
    let state = if entry.is_active_at(now_millis) {
        " • **active**"
    } else {
        ""
    };

    format!(
        "**Timeout #{}**{}\n**From :** {}\n**To :** {}",
        index + 1,
        state,
        discord_timestamp(entry.started_at, 'f'),
        discord_timestamp(entry.ends_at, 'f')
    )
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn permission_denied_message() -> &'static str {
    "You are not permitted to use this command."
}

pub fn moderation_self_action_message(action: &str) -> String {
    format!("You can't {action} yourself.")
}

pub fn moderation_bot_target_message() -> &'static str {
    "You can't use moderation actions on bots or application accounts."
}

pub fn dispatch_failed_message(action: &str) -> String {
    format!("I couldn't {action} that user. Check role hierarchy and permissions.")
}
