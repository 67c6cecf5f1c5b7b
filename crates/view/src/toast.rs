use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// How long the staff dashboard keeps a toast up.
pub const DASHBOARD_TOAST: Duration = Duration::from_secs(3);
/// How long guest pages keep a toast up.
pub const GUEST_TOAST: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
}

type Slot = Arc<Mutex<Option<(u64, Toast)>>>;

/// Holds at most one toast and dismisses it after `ttl`.
///
/// Showing a new toast cancels the pending dismissal of the previous one, and
/// dropping the `Toaster` cancels whatever is pending. Must be used from
/// inside a tokio runtime.
#[derive(Debug)]
pub struct Toaster {
    slot: Slot,
    generation: u64,
    dismissal: Option<JoinHandle<()>>,
    ttl: Duration,
}

fn lock(slot: &Slot) -> MutexGuard<'_, Option<(u64, Toast)>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Toaster {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            generation: 0,
            dismissal: None,
            ttl,
        }
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Error, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.show(ToastKind::Info, message);
    }

    pub fn show(&mut self, kind: ToastKind, message: impl Into<String>) {
        self.cancel_pending();
        self.generation += 1;
        let generation = self.generation;
        let toast = Toast {
            kind,
            message: message.into(),
        };
        debug!(?kind, message = %toast.message, "toast shown");
        *lock(&self.slot) = Some((generation, toast));

        let slot = Arc::clone(&self.slot);
        let ttl = self.ttl;
        self.dismissal = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut current = lock(&slot);
            // Only clear the toast this timer was started for.
            if matches!(current.as_ref(), Some((g, _)) if *g == generation) {
                *current = None;
                debug!("toast dismissed");
            }
        }));
    }

    pub fn current(&self) -> Option<Toast> {
        lock(&self.slot).as_ref().map(|(_, t)| t.clone())
    }

    pub fn dismiss(&mut self) {
        self.cancel_pending();
        *lock(&self.slot) = None;
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.dismissal.take() {
            handle.abort();
        }
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
