pub mod api;
pub mod authz;
pub mod client;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod navigation;
pub mod pipeline;
pub mod session;
pub mod storage;
pub mod utils;

// Re-export commonly used items for tests
pub use client::{create_client, create_client_with_routes, create_default_client, KbClient};
pub use config::ClientConfig;
pub use errors::{ClientError, ClientResult};
pub use session::{FetchOutcome, SessionSnapshot, SessionStore};
