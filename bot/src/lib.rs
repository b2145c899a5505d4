pub mod api;
pub mod approval;
pub mod classify;
pub mod config;
pub mod messages;
pub mod watchdog;

#[cfg(test)]
pub(crate) mod mock;
