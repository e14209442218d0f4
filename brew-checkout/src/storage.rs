//! redb-backed local state of the terminal
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `pending_payments` | `reference_id` | `PendingPaymentRecord` | GCash session recovery |
//! | `held_mirror` | `held_id` | `HeldTransaction` | Held sales shown offline |
//!
//! Values are JSON encoded. A pending-payment entry lives from intent
//! creation until its session reaches a terminal state.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use shared::models::HeldTransaction;
use shared::payment::PendingPaymentRecord;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// key = reference_id, value = JSON-serialized PendingPaymentRecord
const PENDING_PAYMENTS_TABLE: TableDefinition<&str, &[u8]> =
    TableDefinition::new("pending_payments");

/// key = held transaction id, value = JSON-serialized HeldTransaction
const HELD_MIRROR_TABLE: TableDefinition<i64, &[u8]> = TableDefinition::new("held_mirror");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore").finish_non_exhaustive()
    }
}

impl LocalStore {
    /// Open or create the database file
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        Self::init(db)
    }

    /// Volatile database, used by tests and by terminals without a data dir
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        Self::init(db)
    }

    fn init(db: Database) -> StorageResult<Self> {
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(PENDING_PAYMENTS_TABLE)?;
            let _ = write_txn.open_table(HELD_MIRROR_TABLE)?;
        }
        write_txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    // ========== Pending Payments ==========

    pub fn store_pending_payment(&self, record: &PendingPaymentRecord) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PENDING_PAYMENTS_TABLE)?;
            let value = serde_json::to_vec(record)?;
            table.insert(record.reference_id.as_str(), value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_pending_payment(&self, reference_id: &str) -> StorageResult<Option<PendingPaymentRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_PAYMENTS_TABLE)?;
        match table.get(reference_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Oldest first
    pub fn get_pending_payments(&self) -> StorageResult<Vec<PendingPaymentRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(PENDING_PAYMENTS_TABLE)?;

        let mut records = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            let record: PendingPaymentRecord = serde_json::from_slice(value.value())?;
            records.push(record);
        }
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    /// Returns whether an entry was removed
    pub fn remove_pending_payment(&self, reference_id: &str) -> StorageResult<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(PENDING_PAYMENTS_TABLE)?;
            table.remove(reference_id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    // ========== Held Mirror ==========

    /// Insert or overwrite in one transaction
    pub fn mirror_held(&self, held: &[HeldTransaction]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(HELD_MIRROR_TABLE)?;
            for record in held {
                let value = serde_json::to_vec(record)?;
                table.insert(record.id, value.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    /// Replace the whole mirror with the backend's current list
    pub fn replace_held(&self, held: &[HeldTransaction]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(HELD_MIRROR_TABLE)?;
            table.retain(|_, _| false)?;
            for record in held {
                let value = serde_json::to_vec(record)?;
                table.insert(record.id, value.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }

    pub fn get_held(&self) -> StorageResult<Vec<HeldTransaction>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(HELD_MIRROR_TABLE)?;

        let mut held = Vec::new();
        for result in table.iter()? {
            let (_, value) = result?;
            held.push(serde_json::from_slice(value.value())?);
        }
        Ok(held)
    }

    pub fn remove_held(&self, ids: &[i64]) -> StorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(HELD_MIRROR_TABLE)?;
            for id in ids {
                table.remove(*id)?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}
