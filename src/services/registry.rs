use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::services::form_controller::{ReservationFormController, DEFAULT_SUBMISSION_TIMEOUT};
use crate::services::submission::ReservationSubmitter;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_OPEN_FORMS: usize = 10_000;

struct FormEntry {
    controller: Arc<ReservationFormController>,
    last_touched: Instant,
}

type Forms = HashMap<String, FormEntry>;

// Open reservation forms, one per visitor session
pub struct FormRegistry {
    forms: Mutex<Forms>,
    submitter: Arc<dyn ReservationSubmitter>,
    success_display: Duration,
    submission_timeout: Duration,
    idle_ttl: Duration,
    max_open: usize,
}

impl FormRegistry {
    pub fn new(submitter: Arc<dyn ReservationSubmitter>, success_display: Duration) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            submitter,
            success_display,
            submission_timeout: DEFAULT_SUBMISSION_TIMEOUT,
            idle_ttl: DEFAULT_IDLE_TTL,
            max_open: DEFAULT_MAX_OPEN_FORMS,
        }
    }

    pub fn with_submission_timeout(mut self, timeout: Duration) -> Self {
        self.submission_timeout = timeout;
        self
    }

    /// Forms untouched for longer than `ttl` are closed on the next sweep
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = ttl;
        self
    }

    pub fn with_max_open(mut self, max_open: usize) -> Self {
        self.max_open = max_open;
        self
    }

    fn forms(&self) -> MutexGuard<'_, Forms> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_id() -> String {
        format!("{:016x}", rand::thread_rng().gen::<u64>())
    }

    /// Open a fresh, empty form and return its id.
    ///
    /// Returns `None` when the registry is full even after dropping idle
    /// forms.
    pub fn open(&self) -> Option<(String, Arc<ReservationFormController>)> {
        self.evict_idle();

        let mut forms = self.forms();
        if forms.len() >= self.max_open {
            warn!("Refusing to open reservation form: {} forms already open", forms.len());
            return None;
        }

        let controller = Arc::new(
            ReservationFormController::new(Arc::clone(&self.submitter), self.success_display)
                .with_submission_timeout(self.submission_timeout),
        );

        let mut id = Self::generate_id();
        while forms.contains_key(&id) {
            id = Self::generate_id();
        }
        forms.insert(
            id.clone(),
            FormEntry {
                controller: Arc::clone(&controller),
                last_touched: Instant::now(),
            },
        );

        info!("Opened reservation form {} ({} open)", id, forms.len());
        Some((id, controller))
    }

    /// Look up a form and mark it as recently used
    pub fn get(&self, id: &str) -> Option<Arc<ReservationFormController>> {
        let mut forms = self.forms();
        let entry = forms.get_mut(id)?;
        entry.last_touched = Instant::now();
        Some(Arc::clone(&entry.controller))
    }

    /// Remove a form and stop its pending work. Returns false if unknown.
    pub fn close(&self, id: &str) -> bool {
        let removed = self.forms().remove(id);
        match removed {
            Some(entry) => {
                entry.controller.teardown();
                info!("Closed reservation form {}", id);
                true
            }
            None => {
                debug!("No reservation form with id {}", id);
                false
            }
        }
    }

    /// Close every form idle for longer than the TTL; returns how many
    pub fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<FormEntry> = {
            let mut forms = self.forms();
            let ids: Vec<String> = forms
                .iter()
                .filter(|(_, entry)| now.duration_since(entry.last_touched) > self.idle_ttl)
                .map(|(id, _)| id.clone())
                .collect();
            ids.iter().filter_map(|id| forms.remove(id)).collect()
        };

        for entry in &expired {
            entry.controller.teardown();
        }
        if !expired.is_empty() {
            info!("Evicted {} idle reservation forms", expired.len());
        }
        expired.len()
    }

    /// Run [`Self::evict_idle`] every `every` until the handle is aborted
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                registry.evict_idle();
            }
        })
    }

    pub fn close_all(&self) {
        let drained: Vec<_> = self.forms().drain().collect();
        for (_, entry) in &drained {
            entry.controller.teardown();
        }
        info!("Closed {} reservation forms", drained.len());
    }

    pub fn len(&self) -> usize {
        self.forms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
