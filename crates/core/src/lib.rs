//! Lockstep Core Library
//!
//! Ordered pattern capture over a live stream of text lines, typically the
//! stdout of a long-running external process.
//!
//! Log lines from such a process arrive in a guaranteed relative order (a
//! "routes started" summary always follows a "context started" banner), so a
//! session matches its patterns strictly in sequence: each incoming line is
//! tested against the *current* pattern only, and a later-stage pattern
//! appearing early is ignored. On a match, the pattern's named capture
//! groups are copied into an accumulating record and the session advances.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     CaptureSession                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  matchers: [MatcherSpec, ...]   insertion order = match  │
//! │  cursor   ───────────────────►  next matcher to satisfy  │
//! │  record   name → value          grows only, never shrinks│
//! ├──────────────────────────────────────────────────────────┤
//! │  producer side          │  consumer side                 │
//! │    feed(line)           │    await_completion(timeout)   │
//! │    close()              │    snapshot()                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The producer is usually one of the pumps in [`stream`], feeding lines
//! from an `AsyncBufRead` or a `Stream`; the consumer parks on
//! [`CaptureSession::await_completion`] until every pattern has matched
//! once, the line source closes, or the timeout elapses.

pub mod error;
pub mod matcher;
pub mod session;
pub mod spec;
pub mod stream;

// Re-export commonly used types
pub use error::{Error, Result};
pub use matcher::MatcherSpec;
pub use session::{CaptureRecord, CaptureSession};
pub use spec::{CaptureSpec, PatternSpec};
pub use stream::{pump_reader, pump_stream, spawn_reader};

/// Lockstep version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
