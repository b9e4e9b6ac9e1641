//! # fieldsync app
//!
//! Sales goals and promoter attendance, stored locally and synced by hand
//! to one remote document per module.
//!
//! This crate provides:
//! - The store schema and the `sales` and `attendance` sync modules
//! - Typed records with validation
//! - Services for promoters, goals, sales, attendance, schedules and documents
//! - Monthly goal progress
//! - Sync engines and a dispatcher sharing one sync lock
//!
//! ```rust,ignore
//! let app = App::open(Path::new("./data"), StoreConfig::default())?;
//! let ana = app.promoters().add(&Promoter::new("Ana", "Centro"))?;
//! app.save_credentials(Module::Sales, "abc123", "token")?;
//! app.sync_engine(Module::Sales, Arc::new(client))?.push().await?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod dashboard;
mod error;
mod model;
mod modules;
mod schema;
mod services;

pub use cache::PromoterDirectory;
pub use dashboard::{monthly_progress, MonthlyProgress, Progress};
pub use error::{AppError, AppResult};
pub use model::{AttendanceEvidence, DocType, Document, Goal, Promoter, Sale, Schedule};
pub use modules::Module;
pub use schema::{
    app_schema, BRANCH_INDEX, CONFIG, DATE_INDEX, DOCUMENTS, EVIDENCES, GOALS, GOAL_KEY_INDEX, PROMOTERS,
    SALES, SCHEDULES, SCHEMA_VERSION,
};
pub use services::{
    AttendanceService, CascadeReport, DocumentService, GoalService, PromoterService, SaleService,
    ScheduleService,
};

use fieldsync_core::{Store, StoreConfig};
use fieldsync_sync_engine::{RemoteDocumentClient, SyncCredentials, SyncDispatcher, SyncEngine, SyncLock};
use std::path::Path;
use std::sync::Arc;

/// An opened application store.
///
/// Every service borrows the same store. Sync engines built from one `App`
/// share a single lock, since both modules write `promoters`.
pub struct App {
    store: Arc<Store>,
    sync_lock: SyncLock,
    directory: PromoterDirectory,
}

impl App {
    /// Opens or creates the store in `path`, upgrading older schemas.
    pub fn open(path: &Path, config: StoreConfig) -> AppResult<Self> {
        let store = Store::open(path, app_schema(), config)?;
        let report = store.upgrade_report();
        if !report.is_noop() {
            tracing::info!(from = report.from_version, to = report.to_version, "application store upgraded");
        }
        Ok(Self::from_store(Arc::new(store)))
    }

    /// Opens an in-memory store.
    pub fn open_in_memory() -> AppResult<Self> {
        Ok(Self::from_store(Arc::new(Store::open_in_memory(app_schema())?)))
    }

    /// Wraps an already opened store.
    #[must_use]
    pub fn from_store(store: Arc<Store>) -> Self {
        Self {
            store,
            sync_lock: SyncLock::new(),
            directory: PromoterDirectory::new(),
        }
    }

    /// Returns the store.
    #[must_use]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Promoter operations.
    #[must_use]
    pub fn promoters(&self) -> PromoterService<'_> {
        PromoterService::new(&self.store)
    }

    /// Goal operations.
    #[must_use]
    pub fn goals(&self) -> GoalService<'_> {
        GoalService::new(&self.store)
    }

    /// Sale operations.
    #[must_use]
    pub fn sales(&self) -> SaleService<'_> {
        SaleService::new(&self.store)
    }

    /// Attendance operations.
    #[must_use]
    pub fn attendance(&self) -> AttendanceService<'_> {
        AttendanceService::new(&self.store)
    }

    /// Schedule operations.
    #[must_use]
    pub fn schedules(&self) -> ScheduleService<'_> {
        ScheduleService::new(&self.store)
    }

    /// Document operations.
    #[must_use]
    pub fn documents(&self) -> DocumentService<'_> {
        DocumentService::new(&self.store)
    }

    /// Cached promoter list.
    #[must_use]
    pub fn directory(&self) -> &PromoterDirectory {
        &self.directory
    }

    /// Computes goal progress for a month.
    pub fn monthly_progress(&self, month: u32, year: i32) -> AppResult<MonthlyProgress> {
        monthly_progress(&self.store, month, year)
    }

    /// Stores the remote document id and token of a module.
    ///
    /// # Errors
    ///
    /// `Validation` if either value is blank.
    pub fn save_credentials(&self, module: Module, document_id: &str, token: &str) -> AppResult<()> {
        let credentials = SyncCredentials::new(document_id, token)
            .ok_or_else(|| AppError::validation("document id and token are both required"))?;
        credentials.save(&self.store, &module.sync_spec())?;
        tracing::info!(%module, "remote credentials saved");
        Ok(())
    }

    /// Reads the stored credentials of a module.
    ///
    /// # Errors
    ///
    /// `Sync(ConfigMissing)` if they were never saved.
    pub fn load_credentials(&self, module: Module) -> AppResult<SyncCredentials> {
        Ok(SyncCredentials::load(&self.store, &module.sync_spec())?)
    }

    /// Builds the sync engine of a module.
    pub fn sync_engine<C: RemoteDocumentClient>(&self, module: Module, client: Arc<C>) -> AppResult<SyncEngine<C>> {
        let engine = SyncEngine::new(Arc::clone(&self.store), module.sync_spec(), client)?;
        Ok(engine.with_lock(self.sync_lock.clone()))
    }

    /// Builds a dispatcher with an engine for every module.
    pub fn dispatcher<C: RemoteDocumentClient>(&self, client: Arc<C>) -> AppResult<SyncDispatcher<C>> {
        let mut dispatcher = SyncDispatcher::new();
        for module in Module::ALL {
            dispatcher.register(self.sync_engine(module, Arc::clone(&client))?);
        }
        Ok(dispatcher)
    }

    /// Closes the store. Further operations fail.
    pub fn close(&self) -> AppResult<()> {
        Ok(self.store.close()?)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("store", &self.store)
            .field("syncing", &self.sync_lock.is_held())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_credentials_are_rejected() {
        let app = App::open_in_memory().unwrap();
        assert!(matches!(
            app.save_credentials(Module::Sales, "  ", "token"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(app.load_credentials(Module::Sales), Err(AppError::Sync(_))));
    }

    #[test]
    fn credentials_are_per_module() {
        let app = App::open_in_memory().unwrap();
        app.save_credentials(Module::Sales, " doc-1 ", "tok").unwrap();

        let sales = app.load_credentials(Module::Sales).unwrap();
        assert_eq!(sales.document_id, "doc-1");
        assert!(app.load_credentials(Module::Attendance).is_err());
    }
}
