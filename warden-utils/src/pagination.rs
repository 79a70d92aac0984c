use crate::formatting::truncate_for_display;

/// Number of pages needed for `total_items`; an empty listing still has one page.
pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    let pages = total_items.div_ceil(per_page);
    pages.max(1)
}

/// Half-open `[start, end)` item range for a 1-based page number.
pub fn page_window(total_items: usize, per_page: usize, page: usize) -> (usize, usize) {
    let per_page = per_page.max(1);
    let page = page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(total_items);
    let end = (start + per_page).min(total_items);
    (start, end)
}

const BLOCK_SEPARATOR: &str = "\n\n";

/// Join pre-rendered blocks into page bodies.
///
/// A page holds at most `per_page` blocks and at most `max_chars` characters.
/// A single block longer than `max_chars` is cut to fit on its own page.
pub fn paginate_blocks(blocks: &[String], per_page: usize, max_chars: usize) -> Vec<String> {
    let per_page = per_page.max(1);
    let separator_chars = BLOCK_SEPARATOR.chars().count();

    let mut pages = Vec::new();
    let mut page: Vec<String> = Vec::new();
    let mut page_chars = 0;

    for block in blocks {
        let block = truncate_for_display(block, max_chars);
        let block_chars = block.chars().count();

        if !page.is_empty()
            && (page.len() == per_page || page_chars + separator_chars + block_chars > max_chars)
        {
            pages.push(page.join(BLOCK_SEPARATOR));
            page.clear();
            page_chars = 0;
        }

        if !page.is_empty() {
            page_chars += separator_chars;
        }
        page_chars += block_chars;
        page.push(block);
    }

    if !page.is_empty() || pages.is_empty() {
        pages.push(page.join(BLOCK_SEPARATOR));
    }
    pages
}
