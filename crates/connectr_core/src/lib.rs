//! Core data access for Connectr: people, events, attendance and typed
//! relationships, scoped per owner over a document store without joins.

pub mod assemble;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod resolver;
pub mod scope;
pub mod service;
pub mod store;

pub use assemble::{EventDetail, PersonDetail, RelatedPerson};
pub use config::CoreConfig;
pub use error::{CoreError, CoreResult, StoreError, StoreResult};
pub use logging::{default_log_level, init_from_config, init_logging, logging_status, LoggingError};
pub use model::{
    Attendance, AttendanceId, Event, EventId, NewEvent, NewPerson, Person, PersonId, Relationship,
    RelationshipId, RelationshipType,
};
pub use resolver::AssociationResolver;
pub use scope::{IdentityProvider, OwnerId, OwnerScope, StaticIdentity};
pub use service::connectr_service::ConnectrService;
pub use store::{
    Collection, CollectionStore, Document, MemoryCollectionStore, SqliteCollectionStore,
    StoreCall, TimeoutStore,
};

/// Minimal health-check API for embedding callers.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
