#![allow(dead_code)]

use connectr_core::{
    ConnectrService, MemoryCollectionStore, OwnerId, SqliteCollectionStore, StaticIdentity,
};

pub type SqliteService = ConnectrService<SqliteCollectionStore, StaticIdentity>;
pub type MemoryService = ConnectrService<MemoryCollectionStore, StaticIdentity>;

pub fn owner(raw: &str) -> OwnerId {
    OwnerId::parse(raw).unwrap()
}

pub fn sqlite_service(user: &str) -> SqliteService {
    sqlite_service_on(SqliteCollectionStore::open_in_memory().unwrap(), user)
}

/// Service for `user` over a store handle that may be shared with others.
pub fn sqlite_service_on(store: SqliteCollectionStore, user: &str) -> SqliteService {
    ConnectrService::new(store, StaticIdentity::signed_in(owner(user)))
}

pub fn memory_service(user: &str) -> MemoryService {
    ConnectrService::new(
        MemoryCollectionStore::new(),
        StaticIdentity::signed_in(owner(user)),
    )
}
