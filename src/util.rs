//! Shared utility modules used across Taxis components.

pub mod bounded;
