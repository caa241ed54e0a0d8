//! Schema-enforced data-access engine over a flat sheet-style row store.
//!
//! Provides typed CRUD with per-field default and validation policy,
//! relationship management (foreign-key lookups and engine-generated
//! junction tables with cascading delete and orphan repair), an optional
//! read-through cache, coarse store locking, and formula-injection
//! sanitization of persisted strings.
//!
//! Every public operation on [`Database`] returns a [`Response`] envelope;
//! failures are status codes, never panics or `Err` across the boundary.

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod lock;
pub mod response;
pub mod sanitize;
pub mod schema;
pub mod store;
pub mod style;
pub mod value;

pub use config::DbConfig;
pub use engine::{Database, ListOptions, SortOrder};
pub use error::DbError;
pub use response::Response;
pub use schema::{DefaultValue, FieldDef, FieldSpec, FieldType, ManyToManyRequest, TableConfig};
