use poise::serenity_prelude as serenity;
use tracing::info;

use crate::CommandMeta;
use crate::moderation::dispatch::GuildDispatcher;
use crate::moderation::embeds::{
    dispatch_failed_message, guild_only_message, moderation_action_embed,
    moderation_bot_target_message, moderation_self_action_message, permission_denied_message,
    target_profile_from_user, usage_message,
};
use crate::moderation::escalation_check::{DispatchOutcome, kick_member};
use warden_core::{Context, Error};
use warden_database::impls::warnings::DEFAULT_REASON;
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "kick",
    desc: "Kick a user from the server.",
    category: "moderation",
    usage: "?kick <user> [reason]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "The user to kick"] user: Option<serenity::User>,
    #[description = "Reason for the kick"]
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
        serenity::Permissions::KICK_MEMBERS,
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
        ctx.say(moderation_self_action_message("kick")).await?;
        return Ok(());
    }

    let case_reason = reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .unwrap_or(DEFAULT_REASON);

    let dispatcher = GuildDispatcher::new(ctx.http(), guild_id);
    if let DispatchOutcome::Failed(_) = kick_member(&dispatcher, user.id, case_reason).await {
        ctx.say(dispatch_failed_message("kick")).await?;
        return Ok(());
    }

    info!(user_id = %user.id, moderator_id = %ctx.author().id, "user kicked");

    let target_profile = target_profile_from_user(&user);
    let embed = moderation_action_embed(&target_profile, user.id, "kicked", Some(case_reason), None);
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}
