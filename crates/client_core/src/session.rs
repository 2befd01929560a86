//! Who is looking at the page, resolved once per page load.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::domain::{Role, SessionUser};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{with_timeout, CurrentUserSource};

/// Read-only view of the signed-in identity, shared by every component that needs it.
///
/// Until the current-user fetch resolves, and whenever it fails, the session reads as a guest.
#[derive(Debug, Clone, Default)]
pub struct Session {
    user: Arc<RwLock<Option<SessionUser>>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.user.read().await.clone()
    }

    pub async fn role(&self) -> Role {
        self.user
            .read()
            .await
            .as_ref()
            .map(|user| user.role)
            .unwrap_or_default()
    }

    async fn assign(&self, user: SessionUser) {
        *self.user.write().await = Some(user);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInit {
    SignedIn(SessionUser),
    Guest,
    AlreadyInitialized,
}

pub struct SessionController {
    session: Session,
    source: Arc<dyn CurrentUserSource>,
    timeout: Duration,
    started: AtomicBool,
}

impl SessionController {
    pub fn new(session: Session, source: Arc<dyn CurrentUserSource>, timeout: Duration) -> Self {
        Self {
            session,
            source,
            timeout,
            started: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Issues the single current-user request for this page load.
    ///
    /// Failures and timeouts are logged and leave the session as a guest. Later calls return
    /// [`SessionInit::AlreadyInitialized`] without touching the collaborator.
    pub async fn initialize(&self) -> SessionInit {
        if self.started.swap(true, Ordering::SeqCst) {
            debug!("session: current user already requested for this page load");
            return SessionInit::AlreadyInitialized;
        }

        info!("session: fetching current user");
        let fetched = with_timeout(
            "current user fetch",
            self.timeout,
            self.source.fetch_current_user(),
        )
        .await;

        match fetched {
            Ok(Some(user)) if user.role.is_signed_in() => {
                info!(user_id = user.id.0, role = ?user.role, "session: signed in");
                self.session.assign(user.clone()).await;
                SessionInit::SignedIn(user)
            }
            Ok(_) => {
                info!("session: no signed-in user");
                SessionInit::Guest
            }
            Err(err) => {
                warn!("session: current user fetch failed, continuing as guest: {err:#}");
                SessionInit::Guest
            }
        }
    }

    /// Runs [`initialize`](Self::initialize) in the background so the caller can render the
    /// guest view straight away.
    pub fn spawn_initialize(self: &Arc<Self>) -> JoinHandle<SessionInit> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.initialize().await })
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
