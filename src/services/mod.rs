/// OpenAPI documentation generation.
pub mod documentation;
/// List, read, write and delete operations shared by every collection.
pub mod entity_service;
/// Health check service.
pub mod health_service;
/// Paged list synchronization against a collection.
pub mod list_sync;
/// Match scheduling with double-booking checks.
pub mod match_service;
/// Player calendars.
pub mod player_service;
/// Store attachment and health supervision.
pub mod storage_supervisor;
/// Association picker lookups.
pub mod suggestion_service;
