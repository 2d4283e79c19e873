// crates/formwell-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Form Store
// Description: Durable Formwell storage backed by SQLite WAL.
// Purpose: Persist definitions, translations, and records with integrity checks.
// Dependencies: formwell-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements every Formwell storage interface on `SQLite`.
//! Records persist as canonical JSON payloads with stored content hashes;
//! loads verify the hash and fail closed on corruption. Indexed columns
//! (category, status, language, owner, email) back the engine's query
//! surface, and the compound flag operations (clear default, deactivate
//! peers) run inside a single transaction so category invariants never
//! observe a partial state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use formwell_core::FieldType;
use formwell_core::FieldTypeKey;
use formwell_core::FormCategory;
use formwell_core::FormDefinition;
use formwell_core::FormId;
use formwell_core::FormStatus;
use formwell_core::Language;
use formwell_core::PatientId;
use formwell_core::PatientRecord;
use formwell_core::SignatureRecord;
use formwell_core::Submission;
use formwell_core::SubmissionId;
use formwell_core::Translation;
use formwell_core::hashing::DEFAULT_HASH_ALGORITHM;
use formwell_core::hashing::HashAlgorithm;
use formwell_core::hashing::canonical_json_bytes;
use formwell_core::hashing::hash_bytes;
use formwell_core::interfaces::DefinitionStore;
use formwell_core::interfaces::FieldTypeStore;
use formwell_core::interfaces::PatientStore;
use formwell_core::interfaces::SignatureError;
use formwell_core::interfaces::SignatureStore;
use formwell_core::interfaces::StoreError;
use formwell_core::interfaces::SubmissionStore;
use formwell_core::interfaces::TranslationStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` form store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with defaults for the given path.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteJournalMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Uniqueness conflict.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
        }
    }
}

impl From<SqliteStoreError> for SignatureError {
    fn from(error: SqliteStoreError) -> Self {
        Self::Store(error.to_string())
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed Formwell store with WAL support.
#[derive(Clone)]
pub struct SqliteStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens an `SQLite`-backed Formwell store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn open(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Runs a closure inside one transaction on the shared connection.
    fn with_tx<T>(
        &self,
        operate: impl FnOnce(&Transaction<'_>) -> Result<T, SqliteStoreError>,
    ) -> Result<T, SqliteStoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))?;
        let tx = guard.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let value = operate(&tx)?;
        tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(value)
    }
}

// ============================================================================
// SECTION: Payload Helpers
// ============================================================================

/// Serializes a record into its canonical payload and hash.
fn encode<T: Serialize>(record: &T) -> Result<(Vec<u8>, String), SqliteStoreError> {
    let payload =
        canonical_json_bytes(record).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, &payload);
    Ok((payload, digest.value))
}

/// Deserializes a payload after verifying its stored hash.
fn decode<T: DeserializeOwned>(
    payload: &[u8],
    stored_hash: &str,
    context: &str,
) -> Result<T, SqliteStoreError> {
    let digest = hash_bytes(DEFAULT_HASH_ALGORITHM, payload);
    if digest.value != stored_hash {
        return Err(SqliteStoreError::Corrupt(format!("hash mismatch for {context}")));
    }
    serde_json::from_slice(payload).map_err(|err| SqliteStoreError::Invalid(err.to_string()))
}

/// Returns the canonical hash algorithm label.
const fn hash_algorithm_label(algorithm: HashAlgorithm) -> &'static str {
    match algorithm {
        HashAlgorithm::Sha256 => "sha256",
    }
}

// ============================================================================
// SECTION: Definition Store
// ============================================================================

/// Loads one definition row inside a transaction.
fn load_definition(
    tx: &Transaction<'_>,
    id: &str,
) -> Result<Option<FormDefinition>, SqliteStoreError> {
    let row: Option<(Vec<u8>, String)> = tx
        .query_row(
            "SELECT payload, payload_hash FROM form_definitions WHERE form_id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    row.map(|(payload, hash)| decode(&payload, &hash, &format!("definition {id}"))).transpose()
}

/// Writes one definition row inside a transaction.
fn save_definition(
    tx: &Transaction<'_>,
    definition: &FormDefinition,
) -> Result<(), SqliteStoreError> {
    let (payload, hash) = encode(definition)?;
    tx.execute(
        "INSERT INTO form_definitions (form_id, category, status, is_active, is_default, \
         payload, payload_hash, hash_algorithm) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) \
         ON CONFLICT(form_id) DO UPDATE SET category = excluded.category, status = \
         excluded.status, is_active = excluded.is_active, is_default = excluded.is_default, \
         payload = excluded.payload, payload_hash = excluded.payload_hash, hash_algorithm = \
         excluded.hash_algorithm",
        params![
            definition.id.as_str(),
            definition.category.as_str(),
            definition.status.as_str(),
            i64::from(definition.is_active),
            i64::from(definition.is_default),
            payload,
            hash,
            hash_algorithm_label(DEFAULT_HASH_ALGORITHM)
        ],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Loads every definition in a category inside a transaction.
fn load_category(
    tx: &Transaction<'_>,
    category: FormCategory,
) -> Result<Vec<FormDefinition>, SqliteStoreError> {
    let mut statement = tx
        .prepare(
            "SELECT form_id, payload, payload_hash FROM form_definitions WHERE category = ?1 \
             ORDER BY form_id",
        )
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let rows = statement
        .query_map(params![category.as_str()], |row| {
            let id: String = row.get(0)?;
            let payload: Vec<u8> = row.get(1)?;
            let hash: String = row.get(2)?;
            Ok((id, payload, hash))
        })
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let mut definitions = Vec::new();
    for row in rows {
        let (id, payload, hash) = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        definitions.push(decode(&payload, &hash, &format!("definition {id}"))?);
    }
    Ok(definitions)
}

impl DefinitionStore for SqliteStore {
    fn insert(&self, definition: &FormDefinition) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            if load_definition(tx, definition.id.as_str())?.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "definition {} already exists",
                    definition.id
                )));
            }
            save_definition(tx, definition)
        })
        .map_err(StoreError::from)
    }

    fn update(&self, definition: &FormDefinition) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            if load_definition(tx, definition.id.as_str())?.is_none() {
                return Err(SqliteStoreError::Invalid(format!(
                    "definition {} does not exist",
                    definition.id
                )));
            }
            save_definition(tx, definition)
        })
        .map_err(StoreError::from)
    }

    fn delete(&self, id: &FormId) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM form_definitions WHERE form_id = ?1", params![id.as_str()])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get(&self, id: &FormId) -> Result<Option<FormDefinition>, StoreError> {
        self.with_tx(|tx| load_definition(tx, id.as_str())).map_err(StoreError::from)
    }

    fn list_by_category(
        &self,
        category: FormCategory,
    ) -> Result<Vec<FormDefinition>, StoreError> {
        self.with_tx(|tx| load_category(tx, category)).map_err(StoreError::from)
    }

    fn list_by_status(&self, status: FormStatus) -> Result<Vec<FormDefinition>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT form_id, payload, payload_hash FROM form_definitions WHERE status = \
                     ?1 ORDER BY form_id",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![status.as_str()], |row| {
                    let id: String = row.get(0)?;
                    let payload: Vec<u8> = row.get(1)?;
                    let hash: String = row.get(2)?;
                    Ok((id, payload, hash))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut definitions = Vec::new();
            for row in rows {
                let (id, payload, hash) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                definitions.push(decode(&payload, &hash, &format!("definition {id}"))?);
            }
            Ok(definitions)
        })
        .map_err(StoreError::from)
    }

    fn set_default(&self, keep: &FormId, category: FormCategory) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            if load_definition(tx, keep.as_str())?.is_none() {
                return Err(SqliteStoreError::Invalid(format!(
                    "definition {keep} does not exist"
                )));
            }
            for mut definition in load_category(tx, category)? {
                let should_hold = definition.id == *keep;
                if definition.is_default != should_hold {
                    definition.is_default = should_hold;
                    save_definition(tx, &definition)?;
                }
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn set_active(
        &self,
        keep: &FormId,
        category: FormCategory,
        deactivate_others: bool,
    ) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let Some(mut kept) = load_definition(tx, keep.as_str())? else {
                return Err(SqliteStoreError::Invalid(format!(
                    "definition {keep} does not exist"
                )));
            };
            if deactivate_others {
                for mut definition in load_category(tx, category)? {
                    if definition.id != *keep && definition.is_active {
                        definition.is_active = false;
                        save_definition(tx, &definition)?;
                    }
                }
            }
            kept.is_active = true;
            save_definition(tx, &kept)
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Translation Store
// ============================================================================

impl TranslationStore for SqliteStore {
    fn insert(&self, translation: &Translation) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM translations WHERE form_id = ?1 AND language = ?2",
                    params![translation.form_id.as_str(), translation.language.as_tag()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if existing.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "translation {}/{} already exists",
                    translation.form_id, translation.language
                )));
            }
            let (payload, hash) = encode(translation)?;
            tx.execute(
                "INSERT INTO translations (form_id, language, payload, payload_hash, \
                 hash_algorithm) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    translation.form_id.as_str(),
                    translation.language.as_tag(),
                    payload,
                    hash,
                    hash_algorithm_label(DEFAULT_HASH_ALGORITHM)
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn update(&self, translation: &Translation) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let (payload, hash) = encode(translation)?;
            let updated = tx
                .execute(
                    "UPDATE translations SET payload = ?3, payload_hash = ?4 WHERE form_id = ?1 \
                     AND language = ?2",
                    params![
                        translation.form_id.as_str(),
                        translation.language.as_tag(),
                        payload,
                        hash
                    ],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if updated == 0 {
                return Err(SqliteStoreError::Invalid(format!(
                    "translation {}/{} does not exist",
                    translation.form_id, translation.language
                )));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get(
        &self,
        form_id: &FormId,
        language: Language,
    ) -> Result<Option<Translation>, StoreError> {
        self.with_tx(|tx| {
            let row: Option<(Vec<u8>, String)> = tx
                .query_row(
                    "SELECT payload, payload_hash FROM translations WHERE form_id = ?1 AND \
                     language = ?2",
                    params![form_id.as_str(), language.as_tag()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            row.map(|(payload, hash)| {
                decode(&payload, &hash, &format!("translation {form_id}/{language}"))
            })
            .transpose()
        })
        .map_err(StoreError::from)
    }

    fn list_for_form(&self, form_id: &FormId) -> Result<Vec<Translation>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT language, payload, payload_hash FROM translations WHERE form_id = ?1 \
                     ORDER BY language",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![form_id.as_str()], |row| {
                    let language: String = row.get(0)?;
                    let payload: Vec<u8> = row.get(1)?;
                    let hash: String = row.get(2)?;
                    Ok((language, payload, hash))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut translations = Vec::new();
            for row in rows {
                let (language, payload, hash) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                translations.push(decode(
                    &payload,
                    &hash,
                    &format!("translation {form_id}/{language}"),
                )?);
            }
            Ok(translations)
        })
        .map_err(StoreError::from)
    }

    fn delete(&self, form_id: &FormId, language: Language) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "DELETE FROM translations WHERE form_id = ?1 AND language = ?2",
                params![form_id.as_str(), language.as_tag()],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Field Type Store
// ============================================================================

impl FieldTypeStore for SqliteStore {
    fn insert(&self, field_type: &FieldType) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM field_types WHERE key = ?1",
                    params![field_type.key.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if existing.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "field type {} already exists",
                    field_type.key
                )));
            }
            let (payload, hash) = encode(field_type)?;
            tx.execute(
                "INSERT INTO field_types (key, canonical_name, payload, payload_hash, \
                 hash_algorithm) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    field_type.key.as_str(),
                    field_type.canonical_name,
                    payload,
                    hash,
                    hash_algorithm_label(DEFAULT_HASH_ALGORITHM)
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get(&self, key: &FieldTypeKey) -> Result<Option<FieldType>, StoreError> {
        self.with_tx(|tx| {
            let row: Option<(Vec<u8>, String)> = tx
                .query_row(
                    "SELECT payload, payload_hash FROM field_types WHERE key = ?1",
                    params![key.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            row.map(|(payload, hash)| decode(&payload, &hash, &format!("field type {key}")))
                .transpose()
        })
        .map_err(StoreError::from)
    }

    fn list(&self) -> Result<Vec<FieldType>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare("SELECT key, payload, payload_hash FROM field_types ORDER BY key")
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![], |row| {
                    let key: String = row.get(0)?;
                    let payload: Vec<u8> = row.get(1)?;
                    let hash: String = row.get(2)?;
                    Ok((key, payload, hash))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut entries = Vec::new();
            for row in rows {
                let (key, payload, hash) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                entries.push(decode(&payload, &hash, &format!("field type {key}"))?);
            }
            Ok(entries)
        })
        .map_err(StoreError::from)
    }

    fn delete(&self, key: &FieldTypeKey) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM field_types WHERE key = ?1", params![key.as_str()])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

impl SubmissionStore for SqliteStore {
    fn insert(&self, submission: &Submission) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM submissions WHERE submission_id = ?1",
                    params![submission.id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if existing.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "submission {} already exists",
                    submission.id
                )));
            }
            let (payload, hash) = encode(submission)?;
            tx.execute(
                "INSERT INTO submissions (submission_id, patient_id, payload, payload_hash, \
                 hash_algorithm) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    submission.id.as_str(),
                    submission.patient_id.as_str(),
                    payload,
                    hash,
                    hash_algorithm_label(DEFAULT_HASH_ALGORITHM)
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn update(&self, submission: &Submission) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let (payload, hash) = encode(submission)?;
            let updated = tx
                .execute(
                    "UPDATE submissions SET patient_id = ?2, payload = ?3, payload_hash = ?4 \
                     WHERE submission_id = ?1",
                    params![
                        submission.id.as_str(),
                        submission.patient_id.as_str(),
                        payload,
                        hash
                    ],
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if updated == 0 {
                return Err(SqliteStoreError::Invalid(format!(
                    "submission {} does not exist",
                    submission.id
                )));
            }
            Ok(())
        })
        .map_err(StoreError::from)
    }

    fn get(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        self.with_tx(|tx| {
            let row: Option<(Vec<u8>, String)> = tx
                .query_row(
                    "SELECT payload, payload_hash FROM submissions WHERE submission_id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            row.map(|(payload, hash)| decode(&payload, &hash, &format!("submission {id}")))
                .transpose()
        })
        .map_err(StoreError::from)
    }

    fn list_for_patient(&self, patient_id: &PatientId) -> Result<Vec<Submission>, StoreError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT submission_id, payload, payload_hash FROM submissions WHERE \
                     patient_id = ?1 ORDER BY submission_id",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![patient_id.as_str()], |row| {
                    let id: String = row.get(0)?;
                    let payload: Vec<u8> = row.get(1)?;
                    let hash: String = row.get(2)?;
                    Ok((id, payload, hash))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut submissions = Vec::new();
            for row in rows {
                let (id, payload, hash) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                submissions.push(decode(&payload, &hash, &format!("submission {id}"))?);
            }
            Ok(submissions)
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Patient Store
// ============================================================================

/// Writes one patient row with its lookup columns inside a transaction.
fn save_patient(tx: &Transaction<'_>, record: &PatientRecord) -> Result<(), SqliteStoreError> {
    let (payload, hash) = encode(record)?;
    let email = record
        .canonical
        .email
        .as_deref()
        .map(|email| email.trim().to_ascii_lowercase());
    let first = record
        .canonical
        .first_name
        .as_deref()
        .map(|name| name.trim().to_ascii_lowercase());
    let last = record
        .canonical
        .last_name
        .as_deref()
        .map(|name| name.trim().to_ascii_lowercase());
    tx.execute(
        "INSERT INTO patients (patient_id, email, first_name, last_name, birth_date, \
         created_at, payload, payload_hash, hash_algorithm) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, \
         ?8, ?9) ON CONFLICT(patient_id) DO UPDATE SET email = excluded.email, first_name = \
         excluded.first_name, last_name = excluded.last_name, birth_date = excluded.birth_date, \
         created_at = excluded.created_at, payload = excluded.payload, payload_hash = \
         excluded.payload_hash, hash_algorithm = excluded.hash_algorithm",
        params![
            record.id.as_str(),
            email,
            first,
            last,
            record.canonical.birth_date,
            record.created_at.as_unix_millis(),
            payload,
            hash,
            hash_algorithm_label(DEFAULT_HASH_ALGORITHM)
        ],
    )
    .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Collects patient rows produced by a lookup statement.
fn collect_patients(
    rows: impl Iterator<Item = Result<(String, Vec<u8>, String), rusqlite::Error>>,
) -> Result<Vec<PatientRecord>, SqliteStoreError> {
    let mut patients = Vec::new();
    for row in rows {
        let (id, payload, hash) = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        patients.push(decode(&payload, &hash, &format!("patient {id}"))?);
    }
    Ok(patients)
}

impl PatientStore for SqliteStore {
    fn allocate_id(&self) -> Result<PatientId, StoreError> {
        self.with_tx(|tx| {
            tx.execute(
                "UPDATE sequences SET value = value + 1 WHERE name = 'patient'",
                params![],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let value: i64 = tx
                .query_row(
                    "SELECT value FROM sequences WHERE name = 'patient'",
                    params![],
                    |row| row.get(0),
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(PatientId::new(format!("patient-{value}")))
        })
        .map_err(StoreError::from)
    }

    fn insert(&self, record: &PatientRecord) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM patients WHERE patient_id = ?1",
                    params![record.id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if existing.is_some() {
                return Err(SqliteStoreError::Conflict(format!(
                    "patient {} already exists",
                    record.id
                )));
            }
            save_patient(tx, record)
        })
        .map_err(StoreError::from)
    }

    fn update(&self, record: &PatientRecord) -> Result<(), StoreError> {
        self.with_tx(|tx| {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM patients WHERE patient_id = ?1",
                    params![record.id.as_str()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            if existing.is_none() {
                return Err(SqliteStoreError::Invalid(format!(
                    "patient {} does not exist",
                    record.id
                )));
            }
            save_patient(tx, record)
        })
        .map_err(StoreError::from)
    }

    fn get(&self, id: &PatientId) -> Result<Option<PatientRecord>, StoreError> {
        self.with_tx(|tx| {
            let row: Option<(Vec<u8>, String)> = tx
                .query_row(
                    "SELECT payload, payload_hash FROM patients WHERE patient_id = ?1",
                    params![id.as_str()],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            row.map(|(payload, hash)| decode(&payload, &hash, &format!("patient {id}")))
                .transpose()
        })
        .map_err(StoreError::from)
    }

    fn find_by_email(&self, email: &str) -> Result<Vec<PatientRecord>, StoreError> {
        let needle = email.trim().to_ascii_lowercase();
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT patient_id, payload, payload_hash FROM patients WHERE email = ?1 \
                     ORDER BY created_at",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![needle], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            collect_patients(rows)
        })
        .map_err(StoreError::from)
    }

    fn find_by_identity(
        &self,
        first_name: &str,
        last_name: &str,
        birth_date: &str,
    ) -> Result<Vec<PatientRecord>, StoreError> {
        let first = first_name.trim().to_ascii_lowercase();
        let last = last_name.trim().to_ascii_lowercase();
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT patient_id, payload, payload_hash FROM patients WHERE first_name = \
                     ?1 AND last_name = ?2 AND birth_date = ?3 ORDER BY created_at",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![first, last, birth_date], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            collect_patients(rows)
        })
        .map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Signature Store
// ============================================================================

impl SignatureStore for SqliteStore {
    fn store(&self, record: &SignatureRecord, bytes: &[u8]) -> Result<(), SignatureError> {
        self.with_tx(|tx| {
            let (payload, hash) = encode(record)?;
            tx.execute(
                "INSERT INTO signatures (signature_id, patient_id, submission_id, captured_at, \
                 payload, payload_hash, hash_algorithm, content) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
                 ?7, ?8) ON CONFLICT(signature_id) DO UPDATE SET payload = excluded.payload, \
                 payload_hash = excluded.payload_hash, content = excluded.content",
                params![
                    record.id.as_str(),
                    record.patient_id.as_str(),
                    record.submission_id.as_str(),
                    record.captured_at.as_unix_millis(),
                    payload,
                    hash,
                    hash_algorithm_label(DEFAULT_HASH_ALGORITHM),
                    bytes
                ],
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            Ok(())
        })
        .map_err(SignatureError::from)
    }

    fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<SignatureRecord>, SignatureError> {
        self.with_tx(|tx| {
            let mut statement = tx
                .prepare(
                    "SELECT signature_id, payload, payload_hash FROM signatures WHERE patient_id \
                     = ?1 ORDER BY captured_at",
                )
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let rows = statement
                .query_map(params![patient_id.as_str()], |row| {
                    let id: String = row.get(0)?;
                    let payload: Vec<u8> = row.get(1)?;
                    let hash: String = row.get(2)?;
                    Ok((id, payload, hash))
                })
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            let mut signatures = Vec::new();
            for row in rows {
                let (id, payload, hash) =
                    row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
                signatures.push(decode(&payload, &hash, &format!("signature {id}"))?);
            }
            Ok(signatures)
        })
        .map_err(SignatureError::from)
    }
}

// ============================================================================
// SECTION: Connection Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            config.journal_mode.pragma_value()
        ))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS form_definitions (
                    form_id TEXT PRIMARY KEY,
                    category TEXT NOT NULL,
                    status TEXT NOT NULL,
                    is_active INTEGER NOT NULL,
                    is_default INTEGER NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_form_definitions_category
                    ON form_definitions (category);
                CREATE INDEX IF NOT EXISTS idx_form_definitions_status
                    ON form_definitions (status);
                CREATE TABLE IF NOT EXISTS translations (
                    form_id TEXT NOT NULL,
                    language TEXT NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    PRIMARY KEY (form_id, language)
                );
                CREATE TABLE IF NOT EXISTS field_types (
                    key TEXT PRIMARY KEY,
                    canonical_name TEXT NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS submissions (
                    submission_id TEXT PRIMARY KEY,
                    patient_id TEXT NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_submissions_patient
                    ON submissions (patient_id);
                CREATE TABLE IF NOT EXISTS patients (
                    patient_id TEXT PRIMARY KEY,
                    email TEXT,
                    first_name TEXT,
                    last_name TEXT,
                    birth_date TEXT,
                    created_at INTEGER NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_patients_email ON patients (email);
                CREATE INDEX IF NOT EXISTS idx_patients_identity
                    ON patients (first_name, last_name, birth_date);
                CREATE TABLE IF NOT EXISTS signatures (
                    signature_id TEXT PRIMARY KEY,
                    patient_id TEXT NOT NULL,
                    submission_id TEXT NOT NULL,
                    captured_at INTEGER NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    content BLOB NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_signatures_patient
                    ON signatures (patient_id);
                CREATE TABLE IF NOT EXISTS sequences (
                    name TEXT PRIMARY KEY,
                    value INTEGER NOT NULL
                );
                INSERT INTO sequences (name, value) VALUES ('patient', 0);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
