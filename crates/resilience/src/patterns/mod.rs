//! Resilience patterns composed by the executor

pub mod circuit_breaker;
pub mod rate_limiter;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, State as CircuitState};
pub use rate_limiter::MinIntervalThrottle;
pub use retry::RetryPolicy;
