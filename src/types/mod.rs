//! Core identifier types shared across the bot.

pub mod ids;

pub use ids::{DeliveryId, ORG_META_REPO, PrNumber, RepoId};
