use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;

use crate::authz::{Permission, PermissionEngine};
use crate::errors::{ClientError, ClientResult};
use crate::models::UserProfile;
use crate::pipeline::RequestPipeline;
use crate::storage::TokenStorage;
use crate::utils::token_fingerprint;

use super::snapshot::SessionSnapshot;

/// Result of a `fetch_user_info` call that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The identity was applied to the session.
    Applied(UserProfile),
    /// A newer fetch or session mutation was issued while this one was in
    /// flight; its result was discarded.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<UserProfile>,
    /// Bumped by every mutation and every identity fetch.
    generation: u64,
    /// Set once an unauthorized redirect has fired for the current credential.
    redirect_fired: bool,
}

impl SessionState {
    fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn clear(&mut self) {
        self.token = None;
        self.user = None;
        self.bump();
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            token: self.token.clone(),
            user: self.user.clone(),
        }
    }
}

struct Inner {
    state: RwLock<SessionState>,
    storage: Arc<dyn TokenStorage>,
}

/// Owner of the token and the current user.
///
/// Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("SessionStore")
            .field("token", &state.token.as_deref().map(token_fingerprint))
            .field("user_id", &state.user.as_ref().map(|u| u.id))
            .field("generation", &state.generation)
            .finish()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState::default()),
                storage,
            }),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.read().snapshot()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.read().token.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().user.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.snapshot().is_admin()
    }

    pub fn can_manage_kb(&self) -> bool {
        self.snapshot().can_manage_kb()
    }

    pub fn can(&self, permission: Permission) -> bool {
        PermissionEngine::new().check(&self.snapshot(), permission)
    }

    /// Hydrate the token from durable storage and, if one exists, start the
    /// identity fetch in the background. Never waits on the network.
    pub fn init(
        &self,
        pipeline: &RequestPipeline,
    ) -> ClientResult<Option<JoinHandle<ClientResult<FetchOutcome>>>> {
        let Some(token) = self.inner.storage.load()? else {
            tracing::debug!("no stored token, starting logged out");
            return Ok(None);
        };

        {
            let mut state = self.inner.state.write();
            state.token = Some(token.clone());
            state.redirect_fired = false;
            state.bump();
        }
        tracing::info!(token = %token_fingerprint(&token), "hydrated stored token, fetching identity");

        let store = self.clone();
        let pipeline = pipeline.clone();
        let handle = tokio::spawn(async move {
            let outcome = store.fetch_user_info(&pipeline).await;
            if let Err(err) = &outcome {
                tracing::warn!(error = %err, "background identity fetch failed");
            }
            outcome
        });

        Ok(Some(handle))
    }

    /// Install a token and user together after a successful login.
    pub fn set_auth(&self, token: impl Into<String>, user: UserProfile) -> ClientResult<()> {
        let token = token.into();
        let mut state = self.inner.state.write();
        self.inner.storage.save(&token)?;

        tracing::info!(
            token = %token_fingerprint(&token),
            user_id = user.id,
            is_admin = user.is_admin,
            "session established"
        );
        state.token = Some(token);
        state.user = Some(user);
        state.redirect_fired = false;
        state.bump();
        Ok(())
    }

    /// Set or clear the persisted token without touching the user.
    pub fn set_token(&self, token: Option<&str>) -> ClientResult<()> {
        let mut state = self.inner.state.write();
        match token {
            Some(token) => {
                self.inner.storage.save(token)?;
                state.token = Some(token.to_string());
                state.redirect_fired = false;
                state.bump();
                tracing::debug!(token = %token_fingerprint(token), "token set");
            }
            None => {
                state.token = None;
                state.bump();
                self.inner.storage.remove()?;
                tracing::debug!("token cleared");
            }
        }
        Ok(())
    }

    /// Set or clear the current user. The admin and KB flags follow the user.
    pub fn set_user(&self, user: Option<UserProfile>) {
        let mut state = self.inner.state.write();
        match &user {
            Some(user) => tracing::debug!(user_id = user.id, is_admin = user.is_admin, "user set"),
            None => tracing::debug!("user cleared"),
        }
        state.user = user;
        state.bump();
    }

    /// Reset token and user and drop the persisted token. Idempotent.
    ///
    /// The in-memory session is always wiped, even if the durable token
    /// cannot be removed.
    pub fn clear_user(&self) {
        let mut state = self.inner.state.write();
        self.clear_locked(&mut state);
    }

    pub fn logout(&self) {
        tracing::info!("logout");
        self.clear_user();
    }

    /// Wipe the session after an unauthorized response.
    ///
    /// Returns `true` only for the first invalidation since the last
    /// credential was installed, so the caller redirects exactly once.
    pub fn invalidate(&self) -> bool {
        let mut state = self.inner.state.write();
        self.invalidate_locked(&mut state)
    }

    /// Like [`invalidate`](Self::invalidate), but only if the session still
    /// holds `sent`, the token the rejected request carried.
    ///
    /// A 401 for a token that has since been replaced says nothing about the
    /// current session and is ignored.
    pub fn invalidate_if_current(&self, sent: Option<&str>) -> bool {
        let mut state = self.inner.state.write();
        if state.token.as_deref() != sent {
            tracing::debug!(
                sent = ?sent.map(token_fingerprint),
                current = ?state.token.as_deref().map(token_fingerprint),
                "ignoring 401 for a replaced token"
            );
            return false;
        }
        self.invalidate_locked(&mut state)
    }

    fn invalidate_locked(&self, state: &mut SessionState) -> bool {
        self.clear_locked(state);
        let first = !std::mem::replace(&mut state.redirect_fired, true);
        tracing::info!(first, "session invalidated by unauthorized response");
        first
    }

    /// Read the current identity and apply it, unless a newer fetch or
    /// mutation was issued meanwhile.
    ///
    /// On a definitive failure the session is cleared before the error is
    /// returned, so no token outlives a failed identity check.
    pub async fn fetch_user_info(&self, pipeline: &RequestPipeline) -> ClientResult<FetchOutcome> {
        let (generation, has_token) = {
            let mut state = self.inner.state.write();
            let generation = state.bump();
            (generation, state.token.is_some())
        };

        if !has_token {
            self.clear_if_current(generation);
            return Err(ClientError::auth("no token present"));
        }

        tracing::debug!(generation, "fetching identity");
        let result = pipeline
            .get_json::<UserProfile>(&pipeline.config().identity_endpoint)
            .await;

        let mut state = self.inner.state.write();
        if state.generation != generation {
            tracing::debug!(
                generation,
                latest = state.generation,
                ok = result.is_ok(),
                "discarding superseded identity response"
            );
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(user) => {
                tracing::info!(generation, user_id = user.id, is_admin = user.is_admin, "identity applied");
                state.user = Some(user.clone());
                Ok(FetchOutcome::Applied(user))
            }
            Err(err) => {
                self.clear_locked(&mut state);
                tracing::warn!(generation, error = %err, "identity fetch failed, session cleared");
                Err(err)
            }
        }
    }

    fn clear_if_current(&self, generation: u64) {
        let mut state = self.inner.state.write();
        if state.generation == generation {
            self.clear_locked(&mut state);
        }
    }

    /// Caller holds the write lock; memory and disk change together.
    fn clear_locked(&self, state: &mut SessionState) {
        state.clear();
        if let Err(err) = self.inner.storage.remove() {
            tracing::warn!(error = %err, "failed to remove persisted token");
        }
    }
}
