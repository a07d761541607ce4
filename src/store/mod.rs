//! In-memory document store
//!
//! Records live for the lifetime of the process. The store is cheap to clone
//! and is handed to request handlers through `AppState`.

pub mod locks;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::types::{AppError, AppResult};

pub use locks::KeyedLocks;

/// Separator placed between text from consecutive uploads
pub const PART_SEPARATOR: &str = "\n\n";

pub fn already_exists(id: &Uuid) -> AppError {
    AppError::Conflict(format!(
        "UUID {id} already exists. Use PUT /api/v1/update/{id} to append data."
    ))
}

pub fn missing_for_update(id: &Uuid) -> AppError {
    AppError::NotFound(format!(
        "UUID {id} not found. Use POST /api/v1/upload/{id} to create it first."
    ))
}

pub fn not_found(id: &Uuid) -> AppError {
    AppError::NotFound(format!("UUID {id} not found."))
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub owner: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub part_count: u32,
    sequence: u64,
}

/// Listing entry: everything but the content
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub part_count: u32,
}

#[derive(Default)]
struct Inner {
    records: HashMap<Uuid, DocumentRecord>,
    next_sequence: u64,
}

#[derive(Clone, Default)]
pub struct DocumentStore {
    inner: Arc<RwLock<Inner>>,
    locks: KeyedLocks,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-identifier mutation locks
    pub fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    pub async fn contains(&self, id: &Uuid) -> bool {
        self.inner.read().await.records.contains_key(id)
    }

    pub async fn get(&self, id: &Uuid) -> Option<DocumentRecord> {
        self.inner.read().await.records.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Creates a record with a single part. Fails if the identifier is taken.
    pub async fn create(&self, id: Uuid, owner: String, content: String) -> AppResult<DocumentRecord> {
        let mut guard = self.inner.write().await;
        if guard.records.contains_key(&id) {
            return Err(already_exists(&id));
        }

        let sequence = guard.next_sequence;
        guard.next_sequence += 1;

        let record = DocumentRecord {
            owner,
            content,
            created_at: Utc::now(),
            part_count: 1,
            sequence,
        };
        guard.records.insert(id, record.clone());
        Ok(record)
    }

    /// Appends text as a new part of an existing record
    pub async fn append(&self, id: &Uuid, text: &str) -> AppResult<DocumentRecord> {
        let mut guard = self.inner.write().await;
        let record = guard.records.get_mut(id).ok_or_else(|| missing_for_update(id))?;

        record.content.push_str(PART_SEPARATOR);
        record.content.push_str(text);
        record.part_count += 1;
        Ok(record.clone())
    }

    pub async fn remove(&self, id: &Uuid) -> Option<DocumentRecord> {
        self.inner.write().await.records.remove(id)
    }

    /// All records in insertion order
    pub async fn list(&self) -> Vec<DocumentSummary> {
        let guard = self.inner.read().await;
        let mut entries: Vec<(&Uuid, &DocumentRecord)> = guard.records.iter().collect();
        entries.sort_by_key(|(_, record)| record.sequence);

        entries
            .into_iter()
            .map(|(id, record)| DocumentSummary {
                id: *id,
                owner: record.owner.clone(),
                created_at: record.created_at,
                part_count: record.part_count,
            })
            .collect()
    }
}
