pub mod escalation;
pub mod timeouts;
pub mod warnings;
