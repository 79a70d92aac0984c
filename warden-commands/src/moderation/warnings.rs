use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use crate::moderation::embeds::{
    guild_only_message, permission_denied_message, timeout_history_block, usage_message,
    warning_history_block,
};
use crate::moderation::escalation_check::member_key;
use crate::utility::embeds::page_out_of_range_message;
use warden_core::{Context, Error};
use warden_database::impls::warnings::{now_unix_millis, warning_history};
use warden_database::model::warnings::WarningHistory;
use warden_utils::embed::{EMBED_DESCRIPTION_LIMIT, PUNISHMENT_EMBED_COLOR, build_page_embed};
use warden_utils::formatting::format_warning_count;
use warden_utils::pagination::paginate_blocks;
use warden_utils::permissions::has_user_permission;

pub const META: CommandMeta = CommandMeta {
    name: "warnings",
    desc: "Show a user's warnings and timeout history.",
    category: "moderation",
    usage: "?warnings <user> [page]",
};

const BLOCKS_PER_PAGE: usize = 8;

#[poise::command(
    prefix_command,
    slash_command,
    aliases("warnlist"),
    category = "Moderation"
)]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "The user to check"] user: Option<serenity::User>,
    #[description = "Page number"] page: Option<usize>,
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

    let history = warning_history(&ctx.data().db, &member_key(user.id)).await?;
    let pages = history_pages(&history, now_unix_millis());

    let requested_page = page.unwrap_or(1);
    if requested_page == 0 || requested_page > pages.len() {
        ctx.say(page_out_of_range_message(requested_page, pages.len()))
            .await?;
        return Ok(());
    }

    let display_name = user.global_name.as_deref().unwrap_or(&user.name);
    let embed = build_page_embed(
        &format!("Warnings for {}", display_name),
        pages[requested_page - 1].clone(),
        requested_page,
        pages.len(),
        PUNISHMENT_EMBED_COLOR,
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

/// Render a history as page bodies: a total header, warnings oldest first, then timeouts.
fn history_pages(history: &WarningHistory, now_millis: u64) -> Vec<String> {
    let mut blocks = Vec::with_capacity(history.warnings.len() + history.timeouts.len() + 2);

    if history.warnings.is_empty() {
        blocks.push("**No warnings**\nThis user has no warnings.".to_owned());
    } else {
        blocks.extend(
            history
                .warnings
                .iter()
                .enumerate()
                .map(|(index, entry)| warning_history_block(index, &entry.reason, entry.issued_at)),
        );
    }

    if history.timeouts.is_empty() {
        blocks.push("**No timeouts**\nThis user has never been timed out.".to_owned());
    } else {
        blocks.extend(
            history
                .timeouts
                .iter()
                .enumerate()
                .map(|(index, entry)| timeout_history_block(index, entry, now_millis)),
        );
    }

    let header = format!("Total: **{}**", format_warning_count(history.warn_count));
    let body_budget = EMBED_DESCRIPTION_LIMIT - header.chars().count() - 2;
    paginate_blocks(&blocks, BLOCKS_PER_PAGE, body_budget)
        .into_iter()
        .map(|body| format!("{}\n\n{}", header, body))
        .collect()
}
