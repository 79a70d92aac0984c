use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::dispatch::GuildDispatcher;
use crate::moderation::embeds::{
    dispatch_failed_message, guild_only_message, moderation_action_embed,
    moderation_bot_target_message, moderation_self_action_message, permission_denied_message,
    target_profile_from_user, usage_message,
};
use crate::moderation::escalation_check::{DispatchOutcome, apply_mute};
use warden_core::{Context, Error};
use warden_database::impls::warnings::DEFAULT_REASON;
use warden_utils::formatting::format_compact_duration;
use warden_utils::parse::parse_leading_timeout;
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "timeout",
    desc: "Timeout a user for a duration in seconds, minutes or hours.",
    category: "moderation",
    usage: "?timeout <user> <duration> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "The user to timeout"] user: Option<serenity::User>,
    #[description = "Duration then an optional reason (e.g. 10m spamming)"]
    #[rest]
    duration_and_reason: Option<String>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    if !has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MODERATE_MEMBERS,
    )
    .await?
    {
        ctx.say(permission_denied_message()).await?;
        return Ok(());
    }

    let (Some(user), Some(duration_and_reason)) = (user, duration_and_reason) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if user.bot {
        ctx.say(moderation_bot_target_message()).await?;
        return Ok(());
    }

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message("timeout")).await?;
        return Ok(());
    }

    let (duration, reason) = match parse_leading_timeout(&duration_and_reason) {
        Ok(parsed) => parsed,
        Err(source) => {
            ctx.say(format!(
                "Invalid duration: {}. Usage: `{}` (examples: 30s, 10m, 2h)",
                source, META.usage
            ))
            .await?;
            return Ok(());
        }
    };
    let duration_label = format_compact_duration(duration.as_secs());

    let case_reason = if reason.is_empty() {
        DEFAULT_REASON
    } else {
        reason
    };

    let dispatcher = GuildDispatcher::new(ctx.http(), guild_id);
    let outcome = apply_mute(&ctx.data().db, &dispatcher, user.id, duration, case_reason).await?;

    if let DispatchOutcome::Failed(_) = outcome {
        ctx.say(dispatch_failed_message("timeout")).await?;
        return Ok(());
    }

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(
        &target_profile,
        user.id,
        "timed out",
        Some(case_reason),
        Some(&duration_label),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
