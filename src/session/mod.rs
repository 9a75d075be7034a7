//! Session state: the bearer token, the current user and everything derived
//! from them.

mod snapshot;
mod store;

pub use snapshot::SessionSnapshot;
pub use store::{FetchOutcome, SessionStore};
