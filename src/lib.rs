pub mod aggregate;
pub mod compose;
pub mod config;
pub mod derive;
pub mod error;
pub mod fpl_fetch;
pub mod http_cache;
pub mod http_client;
pub mod pipeline;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod summary_export;
