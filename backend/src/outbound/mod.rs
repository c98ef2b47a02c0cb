//! Outbound adapters: persistence and blob storage.

pub mod blob;
pub mod persistence;
