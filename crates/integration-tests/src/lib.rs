//! Integration tests for DriveX.
//!
//! Scenario tests of the marketplace workflows against the in-memory
//! backend. No Firebase project or network access is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p drivex-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `catalog_search` - reload, free-text search, category filter, detail lookup
//! - `listing_submission` - image uploads, validation, publish
//! - `listing_deletion` - owner check, partial image failures, owner dashboard
//! - `session_and_account` - session resolution, sign-in, registration

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use drivex_marketplace::backend::memory::InMemoryBackend;
use drivex_marketplace::backend::{AuthProvider, AuthSubscription};
use drivex_marketplace::listings::ListingForm;
use drivex_marketplace::models::{ImageReference, ListingFields, SessionIdentity};
use drivex_marketplace::notice::NoticeLog;
use drivex_marketplace::session::Session;
use drivex_marketplace::state::MarketplaceState;

/// Marketplace state over an in-memory backend, with recorded notices.
pub struct TestContext {
    pub state: MarketplaceState<InMemoryBackend>,
    pub notices: NoticeLog,
    events: AuthSubscription,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Fresh backend; the session is still unresolved.
    #[must_use]
    pub fn new() -> Self {
        let backend = InMemoryBackend::new();
        let events = backend.subscribe();
        let notices = NoticeLog::new();
        let state = MarketplaceState::new(backend, Session::new(), Arc::new(notices.clone()));
        Self {
            state,
            notices,
            events,
        }
    }

    /// Fresh backend with `uid` signed in and the session synced.
    #[must_use]
    pub fn signed_in(uid: &str) -> Self {
        let mut ctx = Self::new();
        let identity = SessionIdentity::new(uid, Some(format!("User {uid}")), None);
        ctx.backend().set_user(Some(identity));
        ctx.sync_session();
        ctx
    }

    #[must_use]
    pub fn backend(&self) -> &InMemoryBackend {
        self.state.gateway()
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.state.session()
    }

    /// Apply auth events published so far to the session.
    pub fn sync_session(&mut self) -> usize {
        self.state.session().drain(&mut self.events)
    }
}

/// Noon on the given day of May 2024.
#[must_use]
pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, n, 12, 0, 0).unwrap()
}

/// A stored listing body, normalized the way submission stores it.
#[must_use]
pub fn listing(name: &str, model: &str, body: &str, created_at: DateTime<Utc>) -> ListingFields {
    let name = name.to_uppercase();
    let model = model.to_uppercase();
    ListingFields {
        search_name: format!("{name} {model}"),
        name,
        model,
        body_type: body.to_string(),
        created_at,
        ..ListingFields::default()
    }
}

/// A listing owned by `owner` with one image per name, each stored in the
/// backend's blob store.
#[must_use]
pub fn owned_listing(
    backend: &InMemoryBackend,
    owner: &str,
    created_at: DateTime<Utc>,
    image_names: &[&str],
) -> ListingFields {
    use drivex_marketplace::backend::BlobPath;

    let images = image_names
        .iter()
        .map(|name| {
            let path = BlobPath::new(owner.into(), *name);
            let url = backend.put_blob(&path, vec![0xFF, 0xD8], "image/jpeg");
            ImageReference {
                uid: owner.into(),
                name: (*name).to_string(),
                url,
            }
        })
        .collect();

    ListingFields {
        owner_id: owner.into(),
        images,
        ..listing("Fiat", "Uno", "Hatchback", created_at)
    }
}

/// A listing form that passes validation.
#[must_use]
pub fn valid_form() -> ListingForm {
    ListingForm {
        name: "Ferrari".to_string(),
        model: "sf90".to_string(),
        version: "3.9 V8 Turbo PHEV Stradale".to_string(),
        year: "2021/2022".to_string(),
        odometer: "23.000km".to_string(),
        price: "R$ 5.550.000,00".to_string(),
        city: "Uberlândia".to_string(),
        state: "MG".to_string(),
        phone: "34999998888".to_string(),
        description: "Impecável, revisões em dia".to_string(),
        fuel: "Gasolina".to_string(),
        color: "Vermelho".to_string(),
        body_type: "Esportivo".to_string(),
        plate_end: "7".to_string(),
        transmission: "Automático".to_string(),
        tax_paid: "Sim".to_string(),
        single_owner: "Sim".to_string(),
        trade_accepted: "Não".to_string(),
        licensed: "Sim".to_string(),
        armored: "Não".to_string(),
        inspections: "Sim".to_string(),
    }
}
