pub mod api;
pub mod binder;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod models;
pub mod service;

pub use binder::{ChangeBus, DocumentBinder, EditState};
pub use config::AppConfig;
pub use db::create_pool;
pub use editor::{LineEditor, LineKey};
pub use error::AppError;
pub use service::{DocumentStore, HttpDocumentStore, PgDocumentStore};
