use poise::serenity_prelude as serenity;
use tracing::info;

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, permission_denied_message, usage_message};
use crate::moderation::escalation_check::member_key;
use warden_core::{Context, Error};
use warden_database::impls::warnings::remove_warnings;
use warden_utils::formatting::format_warning_count;
use warden_utils::parse::parse_removal_count;
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "unwarn",
    desc: "Remove a user's most recent warnings (default: 1).",
    category: "moderation",
    usage: "?unwarn <user> [count]",
};

#[poise::command(prefix_command, slash_command, category = "Moderation")]
pub async fn unwarn(
    ctx: Context<'_>,
    #[description = "The user to remove warnings from"] user: Option<serenity::User>,
    #[description = "How many of the newest warnings to remove"] count: Option<String>,
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
    let target_label = user
        .global_name
        .as_deref()
        .unwrap_or(&user.name)
        .to_owned();

    let requested = parse_removal_count(count.as_deref());
    let removal = remove_warnings(&ctx.data().db, &member_key(user.id), requested).await?;

    if removal.removed == 0 {
        ctx.say(format!("{} has no warnings to remove.", target_label))
            .await?;
        return Ok(());
    }

    info!(
        user_id = %user.id,
        moderator_id = %ctx.author().id,
        removed = removal.removed,
        remaining = removal.remaining,
        "warnings removed"
    );

    ctx.say(format!(
        "Removed {} from {}. They now have {}.",
        format_warning_count(removal.removed),
        target_label,
        format_warning_count(removal.remaining)
    ))
    .await?;

    Ok(())
}
