//! Command implementations

pub mod contacts;
pub mod events;
pub mod export;
pub mod info;
