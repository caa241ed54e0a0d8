//! Engine facade wiring the schema context, backing store, cache, and lock.

pub mod query;
pub mod validation;

mod crud;
mod relation;

pub use query::{apply_options, ListOptions, SortOrder};
pub use validation::{check_key_order, resolve_value, ResolveError};


use crate::cache::TableCache;
use crate::config::DbConfig;
use crate::error::DbError;
use crate::lock::StoreLock;
use crate::response::Response;
use crate::schema::{normalize_fields, SchemaContext, TableConfig, ID_COLUMN};
use crate::store::GridStore;
use crate::style::{self, Palette};

/// Engine facade owning every component.
///
/// All public operations return a [`Response`] envelope; errors never cross
/// the boundary as `Err` or as a panic.
#[derive(Debug)]
pub struct Database {
    config: DbConfig,
    context: SchemaContext,
    store: GridStore,
    cache: TableCache,
    lock: StoreLock,
    creation: Response,
}

impl Database {
    /// Initializes the engine against a fresh in-memory store.
    pub fn init(config: DbConfig) -> Self {
        tracing::info!(database = %config.database_name, "initializing engine");
        Self {
            config,
            context: SchemaContext::new(),
            store: GridStore::new(),
            cache: TableCache::new(),
            lock: StoreLock::new(),
            creation: Response::ok(),
        }
    }

    /// Result of engine construction.
    pub fn creation_result(&self) -> Response {
        self.creation.clone()
    }

    /// Ensures the backing sheets exist and registers the config when new.
    ///
    /// Idempotent: re-creating an existing table, or one already in context,
    /// still reports success. A follow-up [`Database::put_table_into_context`]
    /// on the same config is the call that reports the conflict.
    pub fn create_table(&self, config: &TableConfig) -> Response {
        match self.create_table_inner(config) {
            Ok(()) => Response::ok(),
            Err(e) => e.into(),
        }
    }

    fn create_table_inner(&self, config: &TableConfig) -> Result<(), DbError> {
        // Normalize first so storage never sees a malformed config
        let fields = normalize_fields(&config.table_name, &config.fields)?;
        let headers: Vec<String> = std::iter::once(ID_COLUMN.to_string())
            .chain(fields.iter().map(|f| f.name.clone()))
            .collect();

        self.lock.with_lock(|| {
            let capacity = self.config.initial_table_capacity;
            self.store.ensure_sheet(&config.table_name, &headers, capacity);
            self.store
                .ensure_sheet(&config.history_table_name, &headers, capacity);
        });

        match self.context.register(config) {
            Ok(()) => {
                tracing::info!(table = %config.table_name, "table created and registered");
                Ok(())
            }
            Err(DbError::TableAlreadyRegistered(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Registers a table config exactly once per engine instance.
    ///
    /// A second registration of the same table name is a conflict (500): it
    /// indicates a caller or config bug, not bad input.
    pub fn put_table_into_context(&self, config: &TableConfig) -> Response {
        match self.context.register(config) {
            Ok(()) => {
                tracing::info!(table = %config.table_name, "table registered");
                Response::ok()
            }
            Err(e) => e.into(),
        }
    }

    /// Applies a named color scheme to a table's sheet metadata.
    pub fn apply_color_scheme(&self, table: &str, scheme: &str) -> Response {
        match self.apply_color_scheme_inner(table, scheme) {
            Ok(palette) => match serde_json::to_value(palette) {
                Ok(data) => Response::ok_with_data(data),
                Err(e) => DbError::Storage(e.to_string()).into(),
            },
            Err(e) => e.into(),
        }
    }

    fn apply_color_scheme_inner(
        &self,
        table: &str,
        scheme: &str,
    ) -> Result<&'static Palette, DbError> {
        self.context.get(table)?;
        let palette = style::scheme_by_name(scheme)
            .ok_or_else(|| DbError::UnknownColorScheme(scheme.to_string()))?;
        self.lock.with_lock(|| {
            self.store
                .with_sheet_mut(table, |sheet| sheet.palette = Some(palette.clone()))
        })?;
        tracing::debug!(table, scheme, "color scheme applied");
        Ok(palette)
    }

    /// Forcibly clears any held store lock.
    ///
    /// The store is immediately usable for reads and writes afterwards.
    pub fn release_locks(&self) -> Response {
        self.lock.release();
        Response::ok()
    }
}
