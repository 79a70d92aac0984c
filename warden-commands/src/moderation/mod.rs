pub mod ban;
pub mod dispatch;
pub(crate) mod embeds;
pub mod escalation_check;
pub mod kick;
pub mod schedule;
pub mod timeout;
pub mod unwarn;
pub mod warn;
pub mod warnings;
