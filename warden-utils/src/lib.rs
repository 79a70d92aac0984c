/// Generic embed builders shared across commands.
pub mod embed;
/// Shared formatting helpers (durations, counts, timestamps).
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '?';
/// Page arithmetic for long listings.
pub mod pagination;
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
