//! Job dispatch for hyperbio.
//!
//! One `tick` claims at most one job from the store, runs the executor
//! registered for its job_type, and records the terminal outcome.
//! Ticks are caller-driven; there is no background loop. Concurrent
//! ticks are safe because the store's claim is atomic.

pub mod dispatcher;
pub mod registry;
pub mod sim;

pub use dispatcher::Dispatcher;
pub use registry::ExecutorRegistry;
pub use sim::SimulatedExecutor;
