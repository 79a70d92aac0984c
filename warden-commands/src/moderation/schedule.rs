use crate::CommandMeta;
use crate::moderation::embeds::schedule_embed;
use warden_core::{Context, Error};
use warden_database::impls::escalation::schedule_table;

pub const META: CommandMeta = CommandMeta {
    name: "schedule",
    desc: "Show which punishment each warning count leads to.",
    category: "moderation",
    usage: "?schedule",
};

#[poise::command(
    prefix_command,
    slash_command,
    aliases("taryfikator"),
    category = "Moderation"
)]
pub async fn schedule(ctx: Context<'_>) -> Result<(), Error> {
    let embed = schedule_embed(&schedule_table());
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
