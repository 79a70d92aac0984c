use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_55_30;

/// Color for warnings and punishments.
pub const PUNISHMENT_EMBED_COLOR: u32 = 0xFF_00_00;

/// Color for the penalty schedule.
pub const SCHEDULE_EMBED_COLOR: u32 = 0xFF_A5_00;

/// Discord rejects embed descriptions longer than this many characters.
pub const EMBED_DESCRIPTION_LIMIT: usize = 4096;

/// Build a page of a listing with consistent styling.
///
/// The `Page x/y` footer is only shown when there is more than one page.
pub fn build_page_embed(
    title: &str,
    description: impl Into<String>,
    page: usize,
    total_pages: usize,
    color: u32,
) -> serenity::CreateEmbed {
    let page = page.max(1);
    let total_pages = total_pages.max(1);

    let builder = serenity::CreateEmbed::new()
        .title(title.to_owned())
        .color(color)
        .description(description);

    if total_pages > 1 {
        builder.footer(serenity::CreateEmbedFooter::new(format!(
            "Page {}/{}",
            page, total_pages
        )))
    } else {
        builder
    }
}
