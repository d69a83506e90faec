//! SQLite-backed collection store.
//!
//! # Responsibility
//! - Persist all collections in one `documents` table with a JSON body.
//! - Run blocking SQLite work on tokio's blocking pool.
//!
//! # Invariants
//! - Every statement filters on `collection` and `owner_id`.
//! - The JSON body carries `userId`/`createdAt` next to entity fields so the
//!   persisted shape matches the document field naming.
//! - Result order is `seq` (insertion) unless an explicit order is requested;
//!   explicit orders tie-break on `seq`.

use super::{
    validate_field_name, Collection, CollectionStore, Document, Fields, OrderBy,
    CREATED_AT_FIELD, OWNER_FIELD,
};
use crate::db::{migrations, open_db, open_db_in_memory};
use crate::error::{StoreError, StoreResult};
use crate::scope::OwnerId;
use async_trait::async_trait;
use log::{debug, error};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// SQLite keeps the bound-variable limit well above this; chunking keeps
/// large id sets inside it regardless of build flags.
const GET_BY_IDS_CHUNK: usize = 500;

/// Document store over a single migrated SQLite connection.
#[derive(Clone)]
pub struct SqliteCollectionStore {
    conn: Arc<Mutex<Connection>>,
    lock_timeout: Option<Duration>,
}

impl SqliteCollectionStore {
    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `StoreError::Db` when the schema version is not current.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        migrations::ensure_current(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            lock_timeout: None,
        })
    }

    /// Gives up on a call that waited longer than `timeout` for the
    /// connection. The check runs after the lock is taken and before any
    /// statement, so a call that reports `Timeout` has written nothing.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    async fn with_conn<T, F>(
        &self,
        operation: &'static str,
        collection: Collection,
        work: F,
    ) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let started_at = Instant::now();
        let lock_timeout = self.lock_timeout;
        let result = tokio::task::spawn_blocking(move || {
            let guard = conn.lock().map_err(|_| StoreError::Poisoned)?;
            if let Some(timeout) = lock_timeout {
                if started_at.elapsed() > timeout {
                    return Err(StoreError::Timeout {
                        operation,
                        timeout_ms: timeout.as_millis(),
                    });
                }
            }
            work(&guard)
        })
        .await
        .map_err(StoreError::from)
        .and_then(|inner| inner);

        match &result {
            Ok(_) => debug!(
                "event=store_call module=store status=ok backend=sqlite op={operation} collection={} duration_ms={}",
                collection.name(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=store_call module=store status=error backend=sqlite op={operation} collection={} duration_ms={} error={err}",
                collection.name(),
                started_at.elapsed().as_millis()
            ),
        }
        result
    }
}

#[async_trait]
impl CollectionStore for SqliteCollectionStore {
    async fn insert(
        &self,
        collection: Collection,
        owner: &OwnerId,
        fields: Fields,
    ) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        let created_at_ms = chrono::Utc::now().timestamp_millis();
        let mut body = fields;
        body.insert(
            OWNER_FIELD.to_string(),
            Value::String(owner.as_str().to_string()),
        );
        body.insert(CREATED_AT_FIELD.to_string(), Value::from(created_at_ms));
        let body_text = serde_json::to_string(&body)?;
        let owner = owner.clone();
        let generated = id.clone();

        self.with_conn("insert", collection, move |conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, owner_id, created_at, body)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    collection.name(),
                    generated,
                    owner.as_str(),
                    created_at_ms,
                    body_text
                ],
            )?;
            Ok(())
        })
        .await?;

        Ok(id)
    }

    async fn list_owned(
        &self,
        collection: Collection,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        if let Some(order) = order_by {
            validate_field_name(order.field)?;
        }
        let sql = format!(
            "SELECT id, owner_id, created_at, body
             FROM documents
             WHERE collection = ?1
               AND owner_id = ?2
             {};",
            order_clause(order_by)
        );
        let owner = owner.clone();

        self.with_conn("list_owned", collection, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![collection.name(), owner.as_str()])?;
            let mut documents = Vec::new();
            while let Some(row) = rows.next()? {
                documents.push(parse_document_row(collection, row)?);
            }
            Ok(documents)
        })
        .await
    }

    async fn query_by_equality(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
        owner: &OwnerId,
        order_by: Option<OrderBy>,
    ) -> StoreResult<Vec<Document>> {
        validate_field_name(field)?;
        if let Some(order) = order_by {
            validate_field_name(order.field)?;
        }
        let bound = json_to_sql(value)?;
        let sql = equality_sql(collection, field, order_by);
        let owner = owner.clone();

        self.with_conn("query_by_equality", collection, move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let mut rows = stmt.query(params![owner.as_str(), bound])?;
            let mut documents = Vec::new();
            while let Some(row) = rows.next()? {
                documents.push(parse_document_row(collection, row)?);
            }
            Ok(documents)
        })
        .await
    }

    async fn get_by_ids(
        &self,
        collection: Collection,
        ids: &[String],
        owner: &OwnerId,
    ) -> StoreResult<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = ids.to_vec();
        let owner = owner.clone();

        self.with_conn("get_by_ids", collection, move |conn| {
            let mut ranked: Vec<(i64, Document)> = Vec::with_capacity(ids.len());
            for chunk in ids.chunks(GET_BY_IDS_CHUNK) {
                let placeholders = vec!["?"; chunk.len()].join(", ");
                let sql = format!(
                    "SELECT seq, id, owner_id, created_at, body
                     FROM documents
                     WHERE collection = ?
                       AND owner_id = ?
                       AND id IN ({placeholders});"
                );
                let mut bind_values: Vec<SqlValue> = Vec::with_capacity(chunk.len() + 2);
                bind_values.push(SqlValue::Text(collection.name().to_string()));
                bind_values.push(SqlValue::Text(owner.as_str().to_string()));
                bind_values.extend(chunk.iter().cloned().map(SqlValue::Text));

                let mut stmt = conn.prepare(&sql)?;
                let mut rows = stmt.query(params_from_iter(bind_values))?;
                while let Some(row) = rows.next()? {
                    let seq: i64 = row.get("seq")?;
                    ranked.push((seq, parse_document_row(collection, row)?));
                }
            }
            ranked.sort_by_key(|(seq, _)| *seq);
            Ok(ranked.into_iter().map(|(_, document)| document).collect())
        })
        .await
    }

    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
        owner: &OwnerId,
    ) -> StoreResult<Option<Document>> {
        let id = id.to_string();
        let owner = owner.clone();

        self.with_conn("get_by_id", collection, move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, created_at, body
                 FROM documents
                 WHERE collection = ?1
                   AND owner_id = ?2
                   AND id = ?3;",
            )?;
            let mut rows = stmt.query(params![collection.name(), owner.as_str(), id])?;
            match rows.next()? {
                Some(row) => Ok(Some(parse_document_row(collection, row)?)),
                None => Ok(None),
            }
        })
        .await
    }
}

/// Equality query with the collection and JSON path inlined as literals.
///
/// The link-field indexes are partial expression indexes; SQLite only
/// matches them when the query repeats the same literal text, so neither
/// value may be a bound parameter. Both are trusted: the collection name is
/// static and `field` passed `validate_field_name`.
fn equality_sql(collection: Collection, field: &str, order_by: Option<OrderBy>) -> String {
    format!(
        "SELECT id, owner_id, created_at, body
         FROM documents
         WHERE collection = '{collection}'
           AND owner_id = ?1
           AND json_extract(body, '$.{field}') = ?2
         {ordering};",
        collection = collection.name(),
        ordering = order_clause(order_by)
    )
}

/// Builds the ORDER BY clause; field names are validated by the caller.
fn order_clause(order_by: Option<OrderBy>) -> String {
    match order_by {
        Some(order) => format!(
            "ORDER BY json_extract(body, '$.{}') {}, seq ASC",
            order.field,
            if order.descending { "DESC" } else { "ASC" }
        ),
        None => "ORDER BY seq ASC".to_string(),
    }
}

fn parse_document_row(collection: Collection, row: &Row<'_>) -> StoreResult<Document> {
    let id: String = row.get("id")?;
    let owner_text: String = row.get("owner_id")?;
    let owner_id = OwnerId::parse(&owner_text).map_err(|_| {
        StoreError::corrupt(collection.name(), format!("document `{id}` has a blank owner"))
    })?;
    let created_at_ms: i64 = row.get("created_at")?;
    let body_text: String = row.get("body")?;

    let mut fields = match serde_json::from_str::<Value>(&body_text)? {
        Value::Object(map) => map,
        other => {
            return Err(StoreError::corrupt(
                collection.name(),
                format!("document `{id}` body is not an object: {other}"),
            ));
        }
    };
    fields.remove(OWNER_FIELD);
    fields.remove(CREATED_AT_FIELD);

    Ok(Document {
        id,
        owner_id,
        created_at_ms,
        fields,
    })
}

fn json_to_sql(value: &Value) -> StoreResult<SqlValue> {
    match value {
        Value::String(text) => Ok(SqlValue::Text(text.clone())),
        Value::Bool(flag) => Ok(SqlValue::Integer(i64::from(*flag))),
        Value::Number(number) => {
            if let Some(integer) = number.as_i64() {
                Ok(SqlValue::Integer(integer))
            } else if let Some(real) = number.as_f64() {
                Ok(SqlValue::Real(real))
            } else {
                Err(StoreError::InvalidQuery(format!(
                    "unsupported numeric filter value {number}"
                )))
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => Err(StoreError::InvalidQuery(
            format!("equality filters only accept scalar values, got {value}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{equality_sql, json_to_sql, SqliteCollectionStore};
    use crate::store::TimeoutStore;
    use std::sync::mpsc;
    use std::time::Duration;
    use crate::db::DbError;
    use crate::error::StoreError;
    use crate::store::{Collection, CollectionStore, OrderBy};
    use crate::scope::OwnerId;
    use rusqlite::Connection;
    use serde_json::{json, Value};

    fn fields(value: Value) -> crate::store::Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteCollectionStore::try_new(conn);
        assert!(matches!(
            result,
            Err(StoreError::Db(DbError::UninitializedConnection {
                actual_version: 0,
                ..
            }))
        ));
    }

    #[test]
    fn equality_filters_reject_non_scalars() {
        assert!(json_to_sql(&json!(null)).is_err());
        assert!(json_to_sql(&json!([1, 2])).is_err());
        assert!(json_to_sql(&json!("x")).is_ok());
    }

    #[tokio::test]
    async fn persisted_body_carries_owner_and_created_at() {
        let store = SqliteCollectionStore::open_in_memory().unwrap();
        let owner = OwnerId::parse("u1").unwrap();
        let id = store
            .insert(Collection::People, &owner, fields(json!({"firstName": "Ada"})))
            .await
            .unwrap();

        let conn = store.conn.lock().unwrap();
        let body: String = conn
            .query_row("SELECT body FROM documents WHERE id = ?1;", [&id], |row| {
                row.get(0)
            })
            .unwrap();
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["userId"], json!("u1"));
        assert!(body["createdAt"].is_i64());
        assert_eq!(body["firstName"], json!("Ada"));
    }

    #[tokio::test]
    async fn order_by_ties_keep_insertion_order() {
        let store = SqliteCollectionStore::open_in_memory().unwrap();
        let owner = OwnerId::parse("u1").unwrap();
        let mut ids = Vec::new();
        for (name, date) in [("a", 10), ("b", 20), ("c", 10)] {
            ids.push(
                store
                    .insert(
                        Collection::Events,
                        &owner,
                        fields(json!({"name": name, "date": date, "kind": "x"})),
                    )
                    .await
                    .unwrap(),
            );
        }

        let ordered = store
            .query_by_equality(
                Collection::Events,
                "kind",
                &json!("x"),
                &owner,
                Some(OrderBy::desc("date")),
            )
            .await
            .unwrap();
        let got: Vec<_> = ordered.into_iter().map(|doc| doc.id).collect();
        assert_eq!(got, vec![ids[1].clone(), ids[0].clone(), ids[2].clone()]);
    }

    #[test]
    fn link_queries_use_their_partial_indexes() {
        let store = SqliteCollectionStore::open_in_memory().unwrap();
        let conn = store.conn.lock().unwrap();
        let cases = [
            (Collection::Attendance, "eventID", "idx_attendance_event"),
            (Collection::Attendance, "personID", "idx_attendance_person"),
            (Collection::Relationships, "personA_ID", "idx_relationships_person_a"),
            (Collection::Relationships, "personB_ID", "idx_relationships_person_b"),
        ];

        for (collection, field, index) in cases {
            let sql = format!(
                "EXPLAIN QUERY PLAN {}",
                equality_sql(collection, field, None)
            );
            let mut stmt = conn.prepare(&sql).unwrap();
            let plan: Vec<String> = stmt
                .query_map(["u1", "x"], |row| row.get::<_, String>(3))
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();
            assert!(
                plan.iter().any(|detail| detail.contains(index)),
                "{field}: {plan:?}"
            );
        }
    }

    #[tokio::test]
    async fn insert_that_misses_its_lock_deadline_writes_nothing() {
        let store = SqliteCollectionStore::open_in_memory()
            .unwrap()
            .with_lock_timeout(Duration::from_millis(50));
        let owner = OwnerId::parse("u1").unwrap();

        let (locked_tx, locked_rx) = mpsc::channel();
        let held = store.conn.clone();
        let holder = std::thread::spawn(move || {
            let _guard = held.lock().unwrap();
            locked_tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(200));
        });
        locked_rx.recv().unwrap();

        let bounded = TimeoutStore::new(store.clone(), Duration::from_millis(50));
        let result = bounded
            .insert(Collection::People, &owner, fields(json!({"firstName": "Ada"})))
            .await;
        assert!(matches!(
            result,
            Err(StoreError::Timeout {
                operation: "insert",
                timeout_ms: 50,
            })
        ));

        holder.join().unwrap();
        let remaining = store
            .list_owned(Collection::People, &owner, None)
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
