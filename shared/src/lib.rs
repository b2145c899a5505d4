mod identity;

#[cfg(feature = "github")]
pub mod github;

#[cfg(feature = "client")]
pub mod slack;

pub use identity::*;

pub type GithubHandle = String;

/// Slack member id, e.g. `U024BE7LH`.
pub type SlackId = String;
