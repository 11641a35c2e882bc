//! Data access layer: entities, pagination contract, the store abstraction
//! and its MongoDB implementation.

/// Persistent entity definitions.
pub mod models;
/// MongoDB implementation of the store.
pub mod mongodb;
/// Shared pagination types.
pub mod pagination;
/// Storage abstraction consumed by the service layer.
pub mod store;
/// Backend-agnostic storage errors.
pub mod storage;

#[cfg(test)]
pub mod memory;
