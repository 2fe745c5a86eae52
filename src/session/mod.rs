//! Bearer-token session state.
//!
//! The token lives in a file under the config directory; what happens on an
//! auth failure is an injected `on_unauthorized` hook, so callers (and tests)
//! decide what "go to login" means.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Where the bearer token is persisted between invocations.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self);
}

/// Token persisted as a single file under the user config directory.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default location under the user config directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(crate::global::token_file()?))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim().to_string();
        if token.is_empty() {
            None
        } else {
            Some(token)
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        std::fs::write(&self.path, token).context("Failed to write token file")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
            {
                warn!("Failed to restrict token file permissions: {}", e);
            }
        }

        Ok(())
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove token file: {}", e);
            }
        }
    }
}

/// In-memory store, used by tests and one-shot flows.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) {
        *self.token.lock().unwrap() = None;
    }
}

pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Authenticated session handle shared by every API call.
///
/// On the first auth failure the stored token is cleared and the hook runs;
/// concurrent 401s race on the flag, so both happen exactly once per session.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
    on_unauthorized: Option<UnauthorizedHook>,
    expired: Arc<AtomicBool>,
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self {
            store,
            on_unauthorized: None,
            expired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_unauthorized_hook(mut self, hook: UnauthorizedHook) -> Self {
        self.on_unauthorized = Some(hook);
        self
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        self.expired.store(false, Ordering::SeqCst);
        self.store.save(token)
    }

    /// Explicit sign-out. Unlike `handle_unauthorized`, does not run the hook.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Tear down the session after a missing or rejected token.
    pub fn handle_unauthorized(&self) {
        if !self.expired.swap(true, Ordering::SeqCst) {
            self.store.clear();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }
    }
}
