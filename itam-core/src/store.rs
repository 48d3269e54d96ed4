//! In-memory record store.
//!
//! Each collection is an insertion-ordered [`Table`] behind its own
//! `RwLock`, with its own identifier sequence. Identifiers only ever grow,
//! so rows stay sorted by identifier and lookups can binary search.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::asset::Asset;
use crate::contract::{Contract, ContractFile, NewContractFile};
use crate::error::StoreError;
use crate::id::{IdSequence, RecordId};
use crate::interface::SystemInterface;
use crate::resource::{Keyed, Resource};

#[derive(Debug)]
struct Rows<T> {
    rows: Vec<T>,
    ids: IdSequence,
}

impl<T: Keyed> Rows<T> {
    fn position(&self, id: RecordId) -> Option<usize> {
        self.rows.binary_search_by_key(&id, Keyed::id).ok()
    }
}

/// One collection of records.
#[derive(Debug)]
pub struct Table<T> {
    inner: RwLock<Rows<T>>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(Rows { rows: Vec::new(), ids: IdSequence::new() }),
        }
    }
}

impl<T: Keyed + Clone> Table<T> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Rows<T>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Internal("collection read lock poisoned".to_owned()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Rows<T>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Internal("collection write lock poisoned".to_owned()))
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.rows.len())
    }

    fn all(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.read()?.rows.clone())
    }

    fn filtered(&self, mut keep: impl FnMut(&T) -> bool) -> Result<Vec<T>, StoreError> {
        Ok(self.read()?.rows.iter().filter(|row| keep(row)).cloned().collect())
    }

    fn find(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let rows = self.read()?;
        Ok(rows.position(id).map(|at| rows.rows[at].clone()))
    }

    /// Append a row built from the next identifier and the current rows.
    fn insert_with(&self, build: impl FnOnce(RecordId, &[T]) -> T) -> Result<T, StoreError> {
        let mut rows = self.write()?;
        let id = rows.ids.next_id();
        let row = build(id, &rows.rows);
        rows.rows.push(row.clone());
        Ok(row)
    }

    fn modify(&self, id: RecordId, edit: impl FnOnce(&mut T)) -> Result<Option<T>, StoreError> {
        let mut rows = self.write()?;
        let Some(at) = rows.position(id) else {
            return Ok(None);
        };
        let row = &mut rows.rows[at];
        edit(row);
        Ok(Some(row.clone()))
    }

    fn remove(&self, id: RecordId) -> Result<Option<T>, StoreError> {
        let mut rows = self.write()?;
        Ok(rows.position(id).map(|at| rows.rows.remove(at)))
    }
}

/// The four record collections of the service.
///
/// Owned by the gateway state and shared behind an `Arc`; all access goes
/// through the operations below.
#[derive(Debug, Default)]
pub struct RecordStore {
    pub(crate) assets: Table<Asset>,
    pub(crate) contracts: Table<Contract>,
    pub(crate) contract_files: Table<ContractFile>,
    pub(crate) interfaces: Table<SystemInterface>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records of kind `R` in insertion order.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the collection lock is poisoned.
    pub fn list<R: Resource>(&self) -> Result<Vec<R>, StoreError> {
        R::table(self).all()
    }

    /// Number of records of kind `R`.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the collection lock is poisoned.
    pub fn count<R: Resource>(&self) -> Result<usize, StoreError> {
        R::table(self).len()
    }

    /// The record of kind `R` with the given identifier.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub fn get<R: Resource>(&self, id: RecordId) -> Result<R, StoreError> {
        R::table(self).find(id)?.ok_or(StoreError::NotFound { kind: R::LABEL, id })
    }

    /// Store a new record built from `draft` and return it.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the collection lock is poisoned.
    pub fn create<R: Resource>(&self, draft: R::Draft) -> Result<R, StoreError> {
        let now = Utc::now();
        R::table(self).insert_with(|id, _| R::from_draft(id, draft, now))
    }

    /// Merge `patch` into the stored record and return the result.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub fn update<R: Resource>(&self, id: RecordId, patch: R::Patch) -> Result<R, StoreError> {
        let now = Utc::now();
        R::table(self)
            .modify(id, |record| record.apply_patch(patch, now))?
            .ok_or(StoreError::NotFound { kind: R::LABEL, id })
    }

    /// Remove a record and return what was stored.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such record exists.
    pub fn delete<R: Resource>(&self, id: RecordId) -> Result<R, StoreError> {
        R::table(self)
            .remove(id)?
            .ok_or(StoreError::NotFound { kind: R::LABEL, id })
    }

    /// Record a new file for `contract_id`.
    ///
    /// The file gets version `max(existing versions for the contract) + 1`,
    /// or 1 for the first file. Versions of other contracts are not
    /// consulted, and the contract itself need not exist.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the collection lock is poisoned.
    pub fn add_contract_file(
        &self,
        contract_id: RecordId,
        upload: NewContractFile,
    ) -> Result<ContractFile, StoreError> {
        let now = Utc::now();
        self.contract_files.insert_with(|id, existing| {
            let version = existing
                .iter()
                .filter(|f| f.contract_id == contract_id)
                .map(|f| f.version)
                .max()
                .unwrap_or(0)
                + 1;
            ContractFile {
                id,
                contract_id,
                file_name: upload.file_name,
                file_path: upload.file_path,
                version,
                uploaded_by: upload.uploaded_by,
                created_at: now,
            }
        })
    }

    /// Files attached to `contract_id`, newest version first.
    ///
    /// # Errors
    /// Returns [`StoreError::Internal`] if the collection lock is poisoned.
    pub fn contract_files(&self, contract_id: RecordId) -> Result<Vec<ContractFile>, StoreError> {
        let mut files = self.contract_files.filtered(|f| f.contract_id == contract_id)?;
        files.sort_by(|a, b| b.version.cmp(&a.version));
        Ok(files)
    }

    /// A single file record.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such file exists.
    pub fn get_contract_file(&self, id: RecordId) -> Result<ContractFile, StoreError> {
        self.contract_files
            .find(id)?
            .ok_or(StoreError::NotFound { kind: "File", id })
    }
}
