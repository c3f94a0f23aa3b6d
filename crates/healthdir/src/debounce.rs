//! Trailing-edge debounce for search input.
//!
//! With no delay configured every input fires immediately. With a delay,
//! only the last input of a burst fires, once the delay has passed without
//! further input.

use std::time::Duration;

use tokio::time::Instant;

/// Collapses bursts of search input into one.
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    delay: Option<Duration>,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    /// Create a debouncer. `None` or a zero delay disables debouncing.
    #[must_use]
    pub fn new(delay: Option<Duration>) -> Self {
        Self {
            delay: delay.filter(|d| !d.is_zero()),
            pending: None,
        }
    }

    /// Feed one input event at `now`.
    ///
    /// Returns the text to search for right away when debouncing is off.
    pub fn push(&mut self, text: impl Into<String>, now: Instant) -> Option<String> {
        let text = text.into();
        match self.delay {
            None => Some(text),
            Some(delay) => {
                self.pending = Some((text, now + delay));
                None
            }
        }
    }

    /// When the pending input becomes due, if there is one.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// Take the pending input if it is due at `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if *at <= now => self.pending.take().map(|(text, _)| text),
            _ => None,
        }
    }

    /// Take the pending input regardless of its deadline.
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_delay_fires_immediately() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(None);
        assert_eq!(debouncer.push("ubs", now).as_deref(), Some("ubs"));
        assert!(debouncer.deadline().is_none());

        let mut zero = Debouncer::new(Some(Duration::ZERO));
        assert_eq!(zero.push("ubs", now).as_deref(), Some("ubs"));
    }

    #[test]
    fn test_burst_collapses_to_last() {
        let start = Instant::now();
        let delay = Duration::from_millis(200);
        let mut debouncer = Debouncer::new(Some(delay));

        assert!(debouncer.push("u", start).is_none());
        assert!(debouncer.push("ub", start + Duration::from_millis(50)).is_none());
        assert!(debouncer.push("ubs", start + Duration::from_millis(100)).is_none());

        assert!(debouncer.take_due(start + Duration::from_millis(250)).is_none());
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(300))
        );
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(300)).as_deref(),
            Some("ubs")
        );
        assert!(debouncer.deadline().is_none());
    }

    #[test]
    fn test_flush_takes_pending() {
        let mut debouncer = Debouncer::new(Some(Duration::from_secs(10)));
        debouncer.push("vacina", Instant::now());
        assert_eq!(debouncer.flush().as_deref(), Some("vacina"));
        assert!(debouncer.flush().is_none());
    }
}
