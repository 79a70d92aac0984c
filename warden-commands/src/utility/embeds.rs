use crate::CommandMeta;

pub fn unknown_category_message(wanted_category: &str, valid_categories: &[&str]) -> String {
    let valid = valid_categories
        .iter()
        .map(|category| display_category(category))
        .collect::<Vec<_>>();

    format!(
        "Unknown category: {}\nValid categories: {}",
        display_category(wanted_category),
        valid.join(", ")
    )
}

pub fn no_commands_message(category: Option<&str>) -> String {
    category.map_or_else(
        || "No commands are registered.".to_owned(),
        |category| format!("No commands found in category: {}", display_category(category)),
    )
}

pub fn page_out_of_range_message(requested_page: usize, total_pages: usize) -> String {
    format!("Page {requested_page} does not exist. Available pages: 1-{total_pages}.")
}

/// Render commands under bold category headings. Expects input sorted by category.
pub fn grouped_help_description(commands: &[&CommandMeta]) -> String {
    let mut sections: Vec<String> = Vec::new();
    let mut current_category: Option<&str> = None;

    for command in commands {
        if current_category != Some(command.category) {
            sections.push(format!("**{}**", display_category(command.category)));
            current_category = Some(command.category);
        }

        if let Some(section) = sections.last_mut() {
            section.push_str(&format!("\n`{}`: {}", command.usage, command.desc));
        }
    }

    if sections.is_empty() {
        return "No commands available.".to_owned();
    }

    sections.join("\n\n")
}

fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}
