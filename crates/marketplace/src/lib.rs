//! DriveX marketplace client core.
//!
//! Catalog search, listing submission and deletion, the owner dashboard and
//! account workflows, running against a backend gateway (document store,
//! blob store, auth provider). Rendering and routing belong to the embedding
//! application; workflows report user-visible messages through a
//! [`notice::Notifier`].
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use drivex_marketplace::backend::AuthProvider;
//! use drivex_marketplace::backend::firebase::FirebaseBackend;
//! use drivex_marketplace::config::MarketplaceConfig;
//! use drivex_marketplace::notice::TracingNotifier;
//! use drivex_marketplace::session::Session;
//! use drivex_marketplace::state::MarketplaceState;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MarketplaceConfig::from_env()?;
//! let _guard = drivex_marketplace::telemetry::init(&config);
//!
//! let backend = FirebaseBackend::new(&config)?;
//! let session = Session::new();
//! tokio::spawn({
//!     let session = session.clone();
//!     let events = backend.subscribe();
//!     async move { session.follow(events).await }
//! });
//!
//! let state = MarketplaceState::new(backend, session, Arc::new(TracingNotifier));
//! let mut catalog = state.catalog();
//! catalog.reload().await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod account;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod listings;
pub mod models;
pub mod notice;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod validation;
