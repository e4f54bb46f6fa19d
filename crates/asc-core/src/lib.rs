//! App Store Connect API client with signed-token authentication.
//!
//! - `config`: credentials from a JSON file plus `ASC_*` overrides
//! - `auth`: ES256 token minting
//! - `transport`: the HTTP seam
//! - `client`: typed calls with one refresh-and-retry on 401
//! - `resources`: pass-through JSON:API envelopes

pub mod auth;
pub mod client;
pub mod config;
pub mod resources;
pub mod transport;

pub use auth::{ApiCredential, AuthError, BearerToken, Clock, SystemClock, TokenSigner};
pub use client::{ApiError, AppStoreClient};
pub use config::{AscConfig, ConfigError};
pub use resources::{NewApp, NewVersion, Platform, Resource};
pub use transport::{ApiRequest, ApiResponse, Transport, TransportError, UreqTransport};
