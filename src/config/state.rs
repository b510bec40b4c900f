// Application state module
// Environment handle passed to every handler invocation

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::captcha::{AllowAll, CaptchaVerifier};
use crate::notify::{LogNotifier, UsageNotifier};
use crate::save::store::{MemoryStore, SaveStore};
use crate::save::{PlainGenerator, SaveGenerator};

use super::types::Config;

/// Shared application state: configuration plus collaborator handles.
/// Constructed once at startup; read-only during dispatch.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn SaveStore>,
    pub generator: Arc<dyn SaveGenerator>,
    pub captcha: Arc<dyn CaptchaVerifier>,
    pub notifier: Arc<dyn UsageNotifier>,

    // Cached config value for fast access without locks
    pub cached_access_log: AtomicBool,
}

impl AppState {
    /// Create `AppState` with the default in-process collaborators.
    pub fn new(config: Config) -> Self {
        let access_log = config.logging.access_log;
        Self {
            config,
            store: Arc::new(MemoryStore::default()),
            generator: Arc::new(PlainGenerator),
            captcha: Arc::new(AllowAll),
            notifier: Arc::new(LogNotifier),
            cached_access_log: AtomicBool::new(access_log),
        }
    }
}
