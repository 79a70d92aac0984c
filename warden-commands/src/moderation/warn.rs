use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::dispatch::GuildDispatcher;
use crate::moderation::embeds::{
    dispatch_failed_message, escalation_embed, guild_only_message, moderation_bot_target_message,
    moderation_self_action_message, permission_denied_message, target_profile_from_user,
    usage_message, warning_issued_embed,
};
use crate::moderation::escalation_check::{DispatchOutcome, issue_warning};
use warden_core::{Context, Error};
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "warn",
    desc: "Warn a user; repeated warnings escalate to timeouts and a ban.",
    category: "moderation",
    usage: "?warn <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "The user to warn"] user: Option<serenity::User>,
    #[description = "Reason for warning"]
    #[rest]
    reason: Option<String>,
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

    let Some(user) = user else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if user.bot {
        ctx.say(moderation_bot_target_message()).await?;
        return Ok(());
    }

    if user.id == ctx.author().id {
        ctx.say(moderation_self_action_message("warn")).await?;
        return Ok(());
    }

    let dispatcher = GuildDispatcher::new(ctx.http(), guild_id);
    let outcome = issue_warning(&ctx.data().db, &dispatcher, user.id, reason.as_deref()).await?;

    let target_profile = target_profile_from_user(&user);
    let warn_count = outcome.warning.warn_count;
    ctx.send(poise::CreateReply::default().embed(warning_issued_embed(
        &target_profile,
        user.id,
        warn_count,
        &outcome.warning.reason,
    )))
    .await?;

    match outcome.dispatch {
        DispatchOutcome::NotRequired => {}
        DispatchOutcome::Muted(_) | DispatchOutcome::Removed => {
            ctx.send(poise::CreateReply::default().embed(escalation_embed(
                &target_profile,
                user.id,
                warn_count,
                outcome.action,
            )))
            .await?;
        }
        DispatchOutcome::Failed(_) => {
            let verb = match outcome.action.mute_duration() {
                Some(_) => "timeout",
                None => "ban",
            };
            ctx.say(format!(
                "{} The warning was still recorded.",
                dispatch_failed_message(verb)
            ))
            .await?;
        }
    }

    Ok(())
}
