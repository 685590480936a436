//! Application state shared by all handlers.

use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::srs::Scheduler;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// The scheduler holds no mutable state, so one instance serves every request
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            scheduler: Arc::new(Scheduler::new(config)),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}
