//! Executor registry: job_type name to work function.
//!
//! An unregistered job_type is a data error, not a code error; the
//! dispatcher fails such jobs instead of crashing.

use hyperbio_core::JobExecutor;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn JobExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor under its job_type, replacing any previous
    /// registration for that type.
    pub fn register(&mut self, executor: Arc<dyn JobExecutor>) {
        self.executors
            .insert(executor.job_type().to_string(), executor);
    }

    pub fn get(&self, job_type: &str) -> Option<Arc<dyn JobExecutor>> {
        self.executors.get(job_type).cloned()
    }

    pub fn job_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedExecutor;
    use std::time::Duration;

    #[test]
    fn register_and_lookup() {
        let mut registry = ExecutorRegistry::new();
        registry.register(Arc::new(SimulatedExecutor::new(
            "nightly_refresh",
            Duration::from_millis(1),
        )));

        assert!(registry.get("nightly_refresh").is_some());
        assert!(registry.get("unregistered_type").is_none());
        assert_eq!(registry.job_types(), vec!["nightly_refresh"]);
    }
}
