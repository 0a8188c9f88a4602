//! Session-aware client SDK for the subscription API.
//!
//! The embedding app talks to [`ApiClient`]; token storage and HTTP are
//! behind traits so they can be swapped (and scripted in tests).

pub mod api;
pub mod error;
pub mod session;
pub mod store;
pub mod transport;

pub use api::ApiClient;
pub use error::ClientError;
pub use session::{Session, StoredSession};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
