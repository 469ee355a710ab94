pub mod http_store;
pub mod pg_store;
pub mod report;
pub mod store;

pub use http_store::HttpDocumentStore;
pub use pg_store::PgDocumentStore;
pub use report::{export_csv_bytes, write_export_csv};
pub use store::DocumentStore;
