//! Shared utility modules used across Tradechat components.

pub mod fuzzy;
