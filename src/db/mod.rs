pub mod pool;
pub mod queries;
pub mod queries_catalog;

pub use pool::create_pool;
pub use queries::*;
pub use queries_catalog::*;
