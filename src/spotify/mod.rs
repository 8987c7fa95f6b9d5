//! # Spotify Integration Module
//!
//! Everything tunemap needs from the Spotify Web API, behind a narrow surface.
//!
//! ```text
//! CLI (fetch)
//!      ↓
//! resolver / fetcher  ──uses──▶  TrackCatalog (trait)
//!                                     ↓
//!                               SpotifyCatalog
//!                                     ↓
//!                         Session (token + HTTP client)
//!                                     ↓
//!                              Spotify Web API
//! ```
//!
//! - [`auth`] runs the one-shot authorization-code flow with PKCE and
//!   exchanges or refreshes tokens.
//! - [`Session`] is the explicitly constructed authenticated handle. It is
//!   opened once from the stored token and passed to the catalog.
//! - [`TrackCatalog`] exposes exactly `resolve(query)` and
//!   `fetch_features(id)`; [`SpotifyCatalog`] implements it with
//!   `GET /search` and `GET /audio-features/{id}`.
//!
//! ## Failure policy
//!
//! Calls run strictly one after another, paced by a fixed interval and bounded
//! by a per-request timeout. A failed call yields a typed error which the
//! caller records in its report; nothing is retried.

pub mod auth;
mod catalog;
mod session;

pub use catalog::{SpotifyCatalog, TrackCatalog, parse_features, parse_search};
pub use session::Session;
