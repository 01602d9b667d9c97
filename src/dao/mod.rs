/// Storage trait over the entity collections and its backends.
pub mod collection_store;
/// Serde helpers for ids sent as strings or numbers.
pub mod entity_id;
/// Records and references exchanged with the backend.
pub mod models;
/// Storage error types shared by every backend.
pub mod storage;
