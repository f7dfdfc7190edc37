//! Background warmup worker for the todo backend
//!
//! The HTTP listener starts without waiting for the database. This worker
//! keeps calling `init` on the store until it succeeds or the retry budget
//! runs out, publishing its progress through a shared `WarmupStatus`.

use crate::config::WarmupConfig;
use crate::storage::{StoreError, TodoStore};
use log::{error, info, warn};
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time;

/// Where the warmup worker currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmupState {
    Retrying,
    Ready,
    Failed,
}

impl fmt::Display for WarmupState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupState::Retrying => write!(f, "retrying"),
            WarmupState::Ready => write!(f, "ready"),
            WarmupState::Failed => write!(f, "failed"),
        }
    }
}

/// Raised when the backend never became ready
#[derive(Debug, Error)]
pub enum WarmupError {
    #[error("Backend initialization failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

/// Warmup progress shared between the worker and request handlers
#[derive(Debug)]
pub struct WarmupStatus {
    state: AtomicU8,
    attempts: AtomicU32,
}

impl Default for WarmupStatus {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(Self::RETRYING),
            attempts: AtomicU32::new(0),
        }
    }
}

impl WarmupStatus {
    const RETRYING: u8 = 0;
    const READY: u8 = 1;
    const FAILED: u8 = 2;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WarmupState {
        match self.state.load(Ordering::Acquire) {
            Self::READY => WarmupState::Ready,
            Self::FAILED => WarmupState::Failed,
            _ => WarmupState::Retrying,
        }
    }

    /// Initialization attempts made so far
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.state() == WarmupState::Ready
    }

    fn record_attempt(&self) -> u32 {
        self.attempts.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn set(&self, state: WarmupState) {
        let raw = match state {
            WarmupState::Retrying => Self::RETRYING,
            WarmupState::Ready => Self::READY,
            WarmupState::Failed => Self::FAILED,
        };
        self.state.store(raw, Ordering::Release);
    }
}

/// Bounded-retry initializer for a todo store
pub struct WarmupWorker {
    store: Arc<dyn TodoStore>,
    status: Arc<WarmupStatus>,
    max_attempts: u32,
    retry_interval: Duration,
}

impl WarmupWorker {
    pub fn new(store: Arc<dyn TodoStore>, config: &WarmupConfig, status: Arc<WarmupStatus>) -> Self {
        Self {
            store,
            status,
            max_attempts: config.max_attempts.max(1),
            retry_interval: Duration::from_secs(config.retry_interval_secs),
        }
    }

    /// Override the delay between attempts
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    pub fn status(&self) -> Arc<WarmupStatus> {
        Arc::clone(&self.status)
    }

    /// Run until the backend is initialized or the budget is spent.
    ///
    /// Returns the number of attempts it took. Only this task sleeps between
    /// attempts.
    pub async fn run(&self) -> Result<u32, WarmupError> {
        let backend = self.store.backend();
        loop {
            info!("Attempting to initialize {} backend", backend);
            let attempt = self.status.record_attempt();

            let err = match self.store.init().await {
                Ok(()) => {
                    self.status.set(WarmupState::Ready);
                    info!("{} backend ready after {} attempt(s)", backend, attempt);
                    return Ok(attempt);
                }
                Err(e) => e,
            };

            if attempt >= self.max_attempts {
                self.status.set(WarmupState::Failed);
                error!("Retried {} times, giving up on {} backend: {}", attempt, backend, err);
                return Err(WarmupError::Exhausted { attempts: attempt, source: err });
            }

            warn!(
                "Failed to initialize {} backend, attempt {}/{}: {}",
                backend, attempt, self.max_attempts, err
            );
            time::sleep(self.retry_interval).await;
        }
    }
}
