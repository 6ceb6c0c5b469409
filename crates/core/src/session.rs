//! Capture session - ordered matching state and the completion wait

use std::pin::pin;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::matcher::MatcherSpec;

/// The accumulated capture groups of a session, in first-insertion order.
///
/// Immutable once returned from [`CaptureSession::await_completion`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CaptureRecord {
    #[serde(flatten)]
    groups: IndexMap<String, String>,
}

impl CaptureRecord {
    /// Value captured for a named group, if any
    pub fn get(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }

    /// Number of captured groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether nothing has been captured
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over `(name, value)` pairs in capture order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug)]
struct SessionState {
    matchers: Vec<MatcherSpec>,
    cursor: usize,
    groups: IndexMap<String, String>,
    started: bool,
    closed: bool,
    completed: Option<CaptureRecord>,
}

impl SessionState {
    fn is_complete(&self) -> bool {
        self.cursor >= self.matchers.len()
    }
}

/// Stateful tracker of progress through an ordered list of matchers
/// against a live line stream.
///
/// Single-producer/single-consumer: one task feeds lines as they arrive
/// (see [`crate::stream`]), one task parks on [`await_completion`]. The
/// cursor only advances, the record only grows, and once the cursor passes
/// the last matcher the session is terminal and further lines are ignored.
///
/// [`await_completion`]: CaptureSession::await_completion
pub struct CaptureSession {
    state: Mutex<SessionState>,
    notify: Notify,
}

impl CaptureSession {
    /// Create an empty session. An empty matcher list is immediately
    /// terminal; register matchers before feeding lines.
    pub fn new() -> Self {
        Self::with_matchers(Vec::new())
    }

    /// Create a session with its full matcher list up front
    pub fn with_matchers(matchers: Vec<MatcherSpec>) -> Self {
        Self {
            state: Mutex::new(SessionState {
                matchers,
                cursor: 0,
                groups: IndexMap::new(),
                started: false,
                closed: false,
                completed: None,
            }),
            notify: Notify::new(),
        }
    }

    /// Append matchers, defining the required match order.
    ///
    /// Fails with [`Error::Configuration`] once streaming has started:
    /// mutating the order mid-stream would make the cursor meaningless.
    pub fn register<I>(&self, matchers: I) -> Result<()>
    where
        I: IntoIterator<Item = MatcherSpec>,
    {
        let mut state = self.state.lock();
        if state.started || state.completed.is_some() {
            return Err(Error::Configuration(
                "matchers cannot be registered after streaming has started".to_string(),
            ));
        }
        state.matchers.extend(matchers);
        Ok(())
    }

    /// Feed one line. Tests the line against the matcher at the cursor
    /// only; a line matching a later matcher is ignored, preserving the
    /// ordering semantics. Returns whether the cursor advanced.
    ///
    /// No-ops on a terminal session. Never blocks and performs no I/O.
    pub fn feed(&self, line: &str) -> bool {
        let mut state = self.state.lock();
        state.started = true;

        if state.is_complete() || state.closed {
            trace!(line, "session terminal, line ignored");
            return false;
        }

        let Some(captured) = state.matchers[state.cursor].try_match(line) else {
            trace!(line, cursor = state.cursor, "no match at cursor");
            return false;
        };

        debug!(matcher = %state.matchers[state.cursor], line, "pattern matched");
        for (name, value) in captured {
            // duplicate names across matchers: last match wins
            state.groups.insert(name, value);
        }
        state.cursor += 1;

        let done = state.is_complete();
        if done {
            state.completed = Some(CaptureRecord {
                groups: state.groups.clone(),
            });
        }
        drop(state);

        if done {
            self.notify.notify_waiters();
        }
        true
    }

    /// Mark the end of the underlying line source. Idempotent; a session
    /// that already completed stays completed.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!(
            matched = state.cursor,
            expected = state.matchers.len(),
            "line source closed"
        );
        drop(state);

        self.notify.notify_waiters();
    }

    /// Wait until every matcher has matched once, the line source closes,
    /// or the timeout elapses.
    ///
    /// Success returns the record and caches it: calling again returns the
    /// identical record without waiting. A closed source fails with
    /// [`Error::StreamClosed`], expiry with [`Error::Timeout`] - distinct,
    /// so callers can tell "process exited early" from "process hung".
    /// The session is left intact on failure; [`snapshot`] exposes the
    /// partial record for diagnostics.
    ///
    /// [`snapshot`]: CaptureSession::snapshot
    pub async fn await_completion(&self, timeout: Duration) -> Result<CaptureRecord> {
        let deadline = Instant::now() + timeout;

        loop {
            // Register for wakeups before checking state, so a completion
            // landing between the check and the await is not lost.
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            {
                let mut state = self.state.lock();
                if let Some(record) = &state.completed {
                    return Ok(record.clone());
                }
                if state.is_complete() {
                    // empty matcher list: terminal from the start
                    let record = CaptureRecord {
                        groups: state.groups.clone(),
                    };
                    state.completed = Some(record.clone());
                    return Ok(record);
                }
                if state.closed {
                    return Err(Error::StreamClosed {
                        matched: state.cursor,
                        expected: state.matchers.len(),
                    });
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                let state = self.state.lock();
                // a match can land as the timer fires; prefer the result
                if let Some(record) = &state.completed {
                    return Ok(record.clone());
                }
                return Err(Error::Timeout {
                    millis: timeout.as_millis() as u64,
                    matched: state.cursor,
                    expected: state.matchers.len(),
                });
            }
        }
    }

    /// The current, possibly partial, record. Intended for diagnostics
    /// after a failed wait; the overall capture is still failed.
    pub fn snapshot(&self) -> CaptureRecord {
        CaptureRecord {
            groups: self.state.lock().groups.clone(),
        }
    }

    /// Number of matchers satisfied so far
    pub fn matched_count(&self) -> usize {
        self.state.lock().cursor
    }

    /// Total number of registered matchers
    pub fn expected_count(&self) -> usize {
        self.state.lock().matchers.len()
    }

    /// Whether every matcher has matched
    pub fn is_complete(&self) -> bool {
        self.state.lock().is_complete()
    }

    /// Whether the line source has been closed
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(pattern: &str) -> MatcherSpec {
        MatcherSpec::new(pattern).unwrap()
    }

    #[test]
    fn test_feed_advances_on_match_only() {
        let session = CaptureSession::with_matchers(vec![matcher(r"ready (?P<port>\d+)")]);

        assert!(!session.feed("starting up"));
        assert_eq!(session.matched_count(), 0);

        assert!(session.feed("ready 8080"));
        assert_eq!(session.matched_count(), 1);
        assert!(session.is_complete());
        assert_eq!(session.snapshot().get("port"), Some("8080"));
    }

    #[test]
    fn test_terminal_session_ignores_lines() {
        let session = CaptureSession::with_matchers(vec![matcher(r"ready (?P<port>\d+)")]);

        assert!(session.feed("ready 8080"));
        assert!(!session.feed("ready 9090"));
        assert_eq!(session.snapshot().get("port"), Some("8080"));
    }

    #[test]
    fn test_register_after_feed_is_rejected() {
        let session = CaptureSession::with_matchers(vec![matcher("a")]);
        session.feed("anything");

        let err = session.register(vec![matcher("b")]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_register_before_feed_extends_order() {
        let session = CaptureSession::new();
        session.register(vec![matcher("first")]).unwrap();
        session.register(vec![matcher("second")]).unwrap();
        assert_eq!(session.expected_count(), 2);
    }

    #[test]
    fn test_record_serializes_as_flat_map() {
        let session = CaptureSession::with_matchers(vec![matcher(r"v=(?P<v>\d+)")]);
        session.feed("v=7");

        let json = serde_json::to_string(&session.snapshot()).unwrap();
        assert_eq!(json, r#"{"v":"7"}"#);
    }
}
