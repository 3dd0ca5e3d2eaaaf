// Console session state and the retry-once policy
//
// The console session can expire silently. The only way to notice is an
// operation failing with the "not authenticated" message, so every console
// call runs inside `with_session`: log in if needed, run, and on that one
// failure log in again and run exactly once more.

use std::future::Future;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::Error;

#[derive(Debug, Default)]
struct SessionState {
    logged_in: bool,
    /// Bumped on every successful login.
    generation: u64,
}

/// Tracks whether the console session is live and serializes logins.
///
/// The login round trip runs while the state lock is held, so concurrent
/// callers that find the session expired wait for one login instead of
/// each performing their own. Cookies are handled by the HTTP client's
/// jar; this type never looks at them.
#[derive(Debug, Default)]
pub struct SessionAuthenticator {
    state: Mutex<SessionState>,
}

impl SessionAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_logged_in(&self) -> bool {
        self.state.lock().await.logged_in
    }

    /// Log in unless already logged in. Returns the session generation.
    pub async fn ensure_session<L, F>(&self, login: L) -> Result<u64, Error>
    where
        L: FnOnce() -> F,
        F: Future<Output = Result<(), Error>>,
    {
        let mut state = self.state.lock().await;
        if state.logged_in {
            return Ok(state.generation);
        }

        debug!("console session not established, logging in");
        login().await?;
        state.logged_in = true;
        state.generation += 1;
        Ok(state.generation)
    }

    /// Log in unconditionally, replacing any current session.
    pub async fn relogin<L, F>(&self, login: L) -> Result<u64, Error>
    where
        L: FnOnce() -> F,
        F: Future<Output = Result<(), Error>>,
    {
        let mut state = self.state.lock().await;
        state.logged_in = false;
        login().await?;
        state.logged_in = true;
        state.generation += 1;
        Ok(state.generation)
    }

    /// Mark `generation` as expired. A newer session is left alone.
    pub async fn invalidate(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.logged_in && state.generation == generation {
            state.logged_in = false;
        }
    }

    /// Run `op` with a live session, retrying once after a re-login if it
    /// fails with the not-authenticated message.
    ///
    /// Any other error, and any error from the retry, is returned as is.
    pub async fn with_session<L, LF, O, OF, T>(&self, login: L, op: O) -> Result<T, Error>
    where
        L: Fn() -> LF,
        LF: Future<Output = Result<(), Error>>,
        O: Fn() -> OF,
        OF: Future<Output = Result<T, Error>>,
    {
        let generation = self.ensure_session(&login).await?;
        match op().await {
            Err(err) if err.is_not_authenticated() => {
                warn!("console session expired, logging in again");
                self.invalidate(generation).await;
                self.ensure_session(&login).await?;
                op().await
            }
            other => other,
        }
    }
}
