use std::sync::{Arc, Weak};
use std::time::Duration;

use anyhow::Context;
use sqlx::PgPool;

use summit_catalog::{PackageId, SelectionSet, Toggle};
use summit_core::{DomainError, DomainResult, DraftId};
use summit_infra::{
    AppConfig, CatalogLoader, CatalogState, FileStorage, InMemoryFileStorage, InMemoryPackageStore,
    InMemoryRegistrationStore, InMemorySessionStore, LocalFileStorage, PackageStore, Persistence,
    PostgresPackageStore, PostgresRegistrationStore, RegistrationStore, SessionStore, SubmissionPipeline,
    SubmissionResult,
};
use summit_registration::{RegistrationType, Wizard};

/// Server-side state of one browser session: the wizard and the comparison selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession {
    pub wizard: Wizard,
    pub selection: SelectionSet,
}

impl DraftSession {
    pub fn new(registration_type: RegistrationType) -> Self {
        Self {
            wizard: Wizard::new(registration_type),
            selection: SelectionSet::new(),
        }
    }
}

type DynPackageStore = Arc<dyn PackageStore>;
type DynFileStorage = Arc<dyn FileStorage>;
type DynRegistrationStore = Arc<dyn RegistrationStore>;

/// Everything the handlers need, shared behind an `Arc`.
pub struct AppServices {
    catalog: CatalogLoader<DynPackageStore>,
    pipeline: SubmissionPipeline<DynFileStorage, DynRegistrationStore>,
    sessions: InMemorySessionStore<DraftId, DraftSession>,
}

impl AppServices {
    pub fn new(
        packages: DynPackageStore,
        storage: DynFileStorage,
        registrations: DynRegistrationStore,
        logo_bucket: impl Into<String>,
    ) -> Self {
        Self {
            catalog: CatalogLoader::new(packages),
            pipeline: SubmissionPipeline::new(storage, registrations, logo_bucket),
            sessions: InMemorySessionStore::new(),
        }
    }

    /// Discard draft sessions left idle for longer than `ttl`.
    pub fn with_session_idle_ttl(mut self, ttl: Duration) -> Self {
        self.sessions = InMemorySessionStore::with_idle_ttl(ttl);
        self
    }

    /// Fully in-memory wiring (tests/dev).
    pub fn in_memory(
        packages: Arc<InMemoryPackageStore>,
        storage: Arc<InMemoryFileStorage>,
        registrations: Arc<InMemoryRegistrationStore>,
    ) -> Self {
        Self::new(packages, storage, registrations, summit_infra::config::DEFAULT_LOGO_BUCKET)
    }

    pub fn catalog_state(&self) -> CatalogState {
        self.catalog.state()
    }

    pub async fn reload_catalog(&self) -> CatalogState {
        self.catalog.load().await
    }

    pub fn is_submitting(&self) -> bool {
        self.pipeline.is_loading()
    }

    pub fn create_session(&self, registration_type: RegistrationType) -> (DraftId, DraftSession) {
        let id = DraftId::new();
        let session = DraftSession::new(registration_type);
        self.sessions.upsert(id, session.clone());
        tracing::info!(draft_id = %id, registration_type = registration_type.as_str(), "draft session started");
        (id, session)
    }

    /// Drop idle sessions now rather than on their next access.
    pub fn evict_idle_sessions(&self) -> usize {
        let evicted = self.sessions.evict_expired();
        if evicted > 0 {
            tracing::info!(evicted, remaining = self.sessions.len(), "evicted idle draft sessions");
        }
        evicted
    }

    pub fn session(&self, id: &DraftId) -> DomainResult<DraftSession> {
        self.sessions.get(id).ok_or_else(|| missing(id))
    }

    pub fn discard_session(&self, id: &DraftId) -> DomainResult<()> {
        self.sessions.remove(id).map(|_| ()).ok_or_else(|| missing(id))
    }

    /// Apply a fallible change to a session and return the updated session.
    ///
    /// The session is left untouched when `f` fails.
    pub fn with_session<T>(
        &self,
        id: &DraftId,
        f: impl FnOnce(&mut DraftSession) -> DomainResult<T>,
    ) -> DomainResult<(T, DraftSession)> {
        self.sessions
            .update(id, |session| {
                let mut next = session.clone();
                let out = f(&mut next)?;
                *session = next.clone();
                Ok((out, next))
            })
            .unwrap_or_else(|| Err(missing(id)))
    }

    /// Toggle a package in the session's comparison selection.
    ///
    /// Once the catalog has loaded, ids it does not contain are refused.
    pub fn toggle_selection(&self, id: &DraftId, package_id: PackageId) -> DomainResult<(Toggle, DraftSession)> {
        if let CatalogState::Loaded { packages, .. } = self.catalog.state() {
            if !packages.iter().any(|p| p.id == package_id) {
                return Err(DomainError::not_found(format!("package '{package_id}'")));
            }
        }
        self.with_session(id, |session| Ok(session.selection.toggle(package_id)))
    }

    /// Submit the session's draft; the session is discarded once the registration is stored.
    pub async fn submit(&self, id: &DraftId) -> DomainResult<SubmissionResult> {
        let session = self.session(id)?;
        session.wizard.ensure_submittable()?;

        let result = self.pipeline.submit(session.wizard.draft()).await;
        if result.is_success() {
            self.sessions.remove(id);
        }
        Ok(result)
    }
}

/// Periodically evict idle sessions. The task ends once the services are dropped.
pub fn spawn_session_sweeper(services: &Arc<AppServices>, every: Duration) -> tokio::task::JoinHandle<()> {
    let services: Weak<AppServices> = Arc::downgrade(services);
    tokio::spawn(async move {
        let mut sweep = tokio::time::interval(every);
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        sweep.tick().await;
        loop {
            sweep.tick().await;
            let Some(services) = services.upgrade() else {
                tracing::debug!("session sweeper stopping");
                break;
            };
            services.evict_idle_sessions();
        }
    })
}

fn missing(id: &DraftId) -> DomainError {
    DomainError::not_found(format!("draft {id}"))
}

/// Wire stores from configuration and load the catalog once.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let storage: DynFileStorage = Arc::new(LocalFileStorage::new(config.storage_root.clone()));

    let (packages, registrations): (DynPackageStore, DynRegistrationStore) = match &config.persistence {
        Persistence::InMemory { packages_seed } => {
            let packages = match packages_seed {
                Some(path) => InMemoryPackageStore::from_seed_file(path)
                    .await
                    .with_context(|| format!("failed to seed packages from {}", path.display()))?,
                None => {
                    tracing::warn!("no PACKAGES_SEED_FILE set; package catalog starts empty");
                    InMemoryPackageStore::new()
                }
            };
            let packages: DynPackageStore = Arc::new(packages);
            let registrations: DynRegistrationStore = Arc::new(InMemoryRegistrationStore::new());
            (packages, registrations)
        }
        Persistence::Postgres { database_url } => {
            let pool = PgPool::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            let packages: DynPackageStore = Arc::new(PostgresPackageStore::new(pool.clone()));
            let registrations: DynRegistrationStore = Arc::new(PostgresRegistrationStore::new(pool));
            (packages, registrations)
        }
    };

    let services = AppServices::new(packages, storage, registrations, config.logo_bucket.clone())
        .with_session_idle_ttl(config.session_idle_ttl);
    services.reload_catalog().await;
    Ok(services)
}
