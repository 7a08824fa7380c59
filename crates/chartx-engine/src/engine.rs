//! Engine: settings, state store, term validator, and patient cache bundled
//! behind one value the caller owns for a session.

#![allow(clippy::result_large_err)]

use crate::cache::PatientCache;
use crate::commands::reconcile::reconcile_document;
use crate::commands::recover::recover;
use crate::settings::{EngineSettings, TermCheck};
use chartx_core::errors::CxError;
use chartx_core::model::{OperationResult, OperationState, PatientRecord, RecoveryOutcome};
use chartx_core::parse_document;
use chartx_core::policy::{AcceptAllTerms, TermValidator, VocabularyTermValidator};
use chartx_core_types::OperationId;
use chartx_store::errors::Result;
use chartx_store::repo::read;
use chartx_store::{db, migrations, FsStateStore, StateStore};
use rusqlite::Connection;
use serde_json::Value;

pub struct Engine {
    settings: EngineSettings,
    state_store: Box<dyn StateStore>,
    validator: Box<dyn TermValidator>,
    cache: PatientCache,
}

impl Engine {
    /// Build an engine from settings, with a file state store under
    /// `settings.state_dir`
    pub fn new(settings: EngineSettings) -> Self {
        let state_store = Box::new(FsStateStore::new(settings.state_dir.clone()));
        let validator: Box<dyn TermValidator> = match settings.term_check {
            TermCheck::Off => Box::new(AcceptAllTerms),
            TermCheck::Rules => Box::new(VocabularyTermValidator::new()),
        };
        Self {
            settings,
            state_store,
            validator,
            cache: PatientCache::new(),
        }
    }

    /// Replace the term validator
    pub fn with_validator(mut self, validator: impl TermValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Replace the state store
    pub fn with_state_store(mut self, state_store: impl StateStore + 'static) -> Self {
        self.state_store = Box::new(state_store);
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn cache(&self) -> &PatientCache {
        &self.cache
    }

    /// Open a configured, migrated connection; one per call
    pub fn connect(&self) -> Result<Connection> {
        let mut conn = db::open(&self.settings.db_path)?;
        db::configure(&conn, self.settings.busy_timeout_ms)?;
        migrations::apply_migrations(&mut conn)?;
        Ok(conn)
    }

    /// Apply pending migrations and list every applied one
    pub fn migrate(&self) -> Result<Vec<String>> {
        let conn = self.connect()?;
        migrations::applied_migrations(&conn)
    }

    /// Reconcile one Table Operation Document
    ///
    /// # Errors
    /// `InvalidInput` before any connection is opened; otherwise see
    /// [`reconcile_document`].
    pub fn reconcile(&mut self, document: &Value) -> Result<OperationResult> {
        let doc = parse_document(document).map_err(|e| {
            tracing::warn!(error = %e, "Rejected table operation document");
            CxError::from(e)
        })?;

        let mut conn = self.connect()?;
        let result = reconcile_document(
            &doc,
            &mut conn,
            self.state_store.as_ref(),
            self.validator.as_ref(),
        )?;

        self.cache.invalidate(doc.email());
        if let Some(patient_id) = result.patient_id {
            self.cache.invalidate_patient(patient_id);
        }
        Ok(result)
    }

    /// Recover a retained operation
    pub fn recover(&mut self, operation_id: OperationId) -> RecoveryOutcome {
        let mut conn = match self.connect() {
            Ok(conn) => conn,
            Err(err) => {
                return RecoveryOutcome::Error {
                    code: err.code().to_string(),
                    message: err.to_string(),
                }
            }
        };

        let outcome = recover(operation_id, &mut conn, self.state_store.as_ref());

        if let RecoveryOutcome::Recovered { patient_id } = &outcome {
            self.cache.invalidate_patient(*patient_id);
        }
        outcome
    }

    /// Ids of retained snapshots
    pub fn pending(&self) -> Result<Vec<OperationId>> {
        self.state_store.list()
    }

    /// One retained snapshot, if present
    pub fn pending_state(&self, operation_id: OperationId) -> Result<Option<OperationState>> {
        self.state_store.load(operation_id)
    }

    /// Patient summary, served from the cache when present
    pub fn patient_record(&mut self, email: &str) -> Result<Option<PatientRecord>> {
        let email = email.trim();
        if let Some(record) = self.cache.get(email) {
            return Ok(Some(record.clone()));
        }

        let conn = self.connect()?;
        let record = read::load_patient_record(&conn, email)?;
        if let Some(record) = &record {
            self.cache.insert(email, record.clone());
        }
        Ok(record)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("settings", &self.settings)
            .field("cached_patients", &self.cache.len())
            .finish()
    }
}
