//! Shared utilities.
//!
//! Currently just the process-wide request limiter: a per-host admission
//! gate installed once at startup and shared by every outbound request for
//! the process lifetime.

mod limiter;

pub use limiter::HostLimiter;
