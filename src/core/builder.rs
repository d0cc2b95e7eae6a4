use std::sync::Arc;

use crate::{config::ProcessConfig, core::supervisor::Supervisor, subscribers::Subscribe};

/// Builder for a [`Supervisor`].
pub struct SupervisorBuilder {
    cfg: ProcessConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    pub fn new(cfg: ProcessConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Replaces the default [`LogWriter`](crate::LogWriter) sink.
    ///
    /// An empty list keeps the default.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    pub fn build(self) -> Arc<Supervisor> {
        Arc::new(Supervisor::new_internal(self.cfg, self.subscribers))
    }
}
