//! # API Module
//!
//! HTTP endpoints of the short-lived server that receives the OAuth redirect
//! during `tunemap auth`.
//!
//! - [`callback`] completes the authorization-code flow: it takes the `code`
//!   Spotify appends to the redirect URI and exchanges it, together with the
//!   PKCE verifier held in shared state, for a token.
//! - [`health`] reports that the server is up, with name, version and
//!   whether a token is already cached.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use tunemap::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
