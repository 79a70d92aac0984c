/// Format seconds into a compact human-readable duration (e.g. 59s, 1m, 1h, 1d, 1h 30m).
pub fn format_compact_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3_600;
    let minutes = (total_seconds % 3_600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        return if hours > 0 {
            format!("{}d {}h", days, hours)
        } else {
            format!("{}d", days)
        };
    }

    if hours > 0 {
        let mut parts = vec![format!("{}h", hours)];
        if minutes > 0 {
            parts.push(format!("{}m", minutes));
        }
        if seconds > 0 {
            parts.push(format!("{}s", seconds));
        }
        return parts.join(" ");
    }

    if minutes > 0 {
        return if seconds > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}m", minutes)
        };
    }

    format!("{}s", seconds)
}

/// "1 warning", "2 warnings", "0 warnings".
pub fn format_warning_count(count: u64) -> String {
    if count == 1 {
        "1 warning".to_owned()
    } else {
        format!("{} warnings", count)
    }
}

/// Render unix milliseconds as a Discord timestamp tag (`D` date, `f` date+time, `R` relative).
pub fn discord_timestamp(unix_millis: u64, style: char) -> String {
    format!("<t:{}:{}>", unix_millis / 1_000, style)
}

/// Break user mentions so echoed free text can't ping anyone.
pub fn sanitize_mentions(text: &str) -> String {
    text.replace('@', "@\u{200B}")
}

/// Longest reason echoed back in an embed.
pub const MAX_REASON_DISPLAY_CHARS: usize = 1024;

/// Cut `text` to at most `max_chars` characters, ending with an ellipsis when shortened.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut shortened: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}

/// Mention-safe reason, capped for display.
pub fn display_reason(reason: &str) -> String {
    truncate_for_display(&sanitize_mentions(reason), MAX_REASON_DISPLAY_CHARS)
}
