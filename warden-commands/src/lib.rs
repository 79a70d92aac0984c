pub mod moderation;
pub mod utility;

use warden_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    moderation::warn::META,
    moderation::warnings::META,
    moderation::unwarn::META,
    moderation::timeout::META,
    moderation::kick::META,
    moderation::ban::META,
    moderation::schedule::META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        moderation::warn::warn(),
        moderation::warnings::warnings(),
        moderation::unwarn::unwarn(),
        moderation::timeout::timeout(),
        moderation::kick::kick(),
        moderation::ban::ban(),
        moderation::schedule::schedule(),
    ]
}

/// Usage line for a command name, if it is registered.
pub fn command_usage(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|meta| meta.name == name)
        .map(|meta| meta.usage)
}
