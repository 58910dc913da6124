//! Client-side session helpers: remote-plane smoothing, outbound
//! update throttling, bounded chat history, and reconnect pacing.
//!
//! Nothing here talks to a socket; callers feed in received messages
//! and clock readings and act on what comes back.

pub mod interpolate;

use std::collections::VecDeque;
use std::time::Duration;

use crate::lobby::room::ChatMessage;

pub use interpolate::{RemoteFleet, RemotePlane};

/// How many chat lines the client keeps
pub const CHAT_LOG_CAPACITY: usize = 50;

/// Minimum spacing between outbound player updates
pub const UPDATE_INTERVAL_MS: u64 = 50;

/// Bounded chat history; oldest lines fall off the front
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: VecDeque<ChatMessage>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == CHAT_LOG_CAPACITY {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Cleared on every room join so history never leaks across rooms
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Latches once the aircraft has genuinely left the ground, so UI
/// cues keyed to "has flown" don't flicker during a bumpy roll.
/// Sets above 50 ft; resets only after settling below 10 ft without
/// climbing.
#[derive(Debug, Default)]
pub struct TakeoffLatch {
    airborne: bool,
}

impl TakeoffLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest altitude and vertical speed; returns the
    /// latched state.
    pub fn observe(&mut self, altitude_ft: f32, vertical_speed_fpm: f32) -> bool {
        if altitude_ft > 50.0 && !self.airborne {
            self.airborne = true;
        } else if altitude_ft < 10.0 && self.airborne && vertical_speed_fpm < 50.0 {
            self.airborne = false;
        }
        self.airborne
    }

    pub fn has_taken_off(&self) -> bool {
        self.airborne
    }
}

/// Caps the outbound player-update rate to one message per interval
#[derive(Debug)]
pub struct UpdateThrottle {
    interval_ms: u64,
    last_sent: Option<u64>,
}

impl UpdateThrottle {
    pub fn new() -> Self {
        Self {
            interval_ms: UPDATE_INTERVAL_MS,
            last_sent: None,
        }
    }

    /// Returns true when enough time has passed to send again, and
    /// marks the send as taken.
    pub fn try_send(&mut self, now_millis: u64) -> bool {
        match self.last_sent {
            Some(last) if now_millis.saturating_sub(last) < self.interval_ms => false,
            _ => {
                self.last_sent = Some(now_millis);
                true
            }
        }
    }
}

impl Default for UpdateThrottle {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-backoff reconnect pacing: a bounded number of attempts with
/// a constant delay between them
#[derive(Debug)]
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(1000),
            attempts: 0,
        }
    }

    /// Delay before the next attempt, or None once the budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay)
    }

    /// Call after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chat_line(n: u64) -> ChatMessage {
        ChatMessage {
            id: format!("{}-test", n),
            sender_id: Uuid::new_v4(),
            sender_name: "Player_test".to_string(),
            text: format!("line {}", n),
            timestamp: n,
            room_id: "AB12CD".to_string(),
        }
    }

    #[test]
    fn chat_log_keeps_only_the_newest_lines() {
        let mut log = ChatLog::new();
        for n in 0..60 {
            log.push(chat_line(n));
        }
        assert_eq!(log.len(), CHAT_LOG_CAPACITY);
        assert_eq!(log.messages().next().map(|m| m.timestamp), Some(10));
        assert_eq!(log.messages().last().map(|m| m.timestamp), Some(59));
    }

    #[test]
    fn chat_log_clears_between_rooms() {
        let mut log = ChatLog::new();
        log.push(chat_line(1));
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn throttle_allows_first_send_immediately() {
        let mut throttle = UpdateThrottle::new();
        assert!(throttle.try_send(1_000));
    }

    #[test]
    fn throttle_blocks_inside_the_interval() {
        let mut throttle = UpdateThrottle::new();
        assert!(throttle.try_send(1_000));
        assert!(!throttle.try_send(1_040));
        assert!(throttle.try_send(1_050));
        // The blocked call must not push the window forward
        assert!(!throttle.try_send(1_060));
    }

    #[test]
    fn takeoff_latch_sets_above_fifty_feet_and_holds() {
        let mut latch = TakeoffLatch::new();
        assert!(!latch.observe(10.0, 200.0));
        assert!(latch.observe(60.0, 500.0));
        // Holds through the whole flight envelope
        assert!(latch.observe(4000.0, 0.0));
        assert!(latch.observe(30.0, -300.0));
    }

    #[test]
    fn takeoff_latch_resets_only_after_settling() {
        let mut latch = TakeoffLatch::new();
        latch.observe(60.0, 500.0);

        // Low but still climbing: a touch-and-go keeps the latch
        assert!(latch.observe(5.0, 200.0));
        assert!(!latch.observe(5.0, 0.0));
    }

    #[test]
    fn reconnect_budget_is_five_fixed_delays() {
        let mut policy = ReconnectPolicy::new();
        for _ in 0..5 {
            assert_eq!(policy.next_delay(), Some(Duration::from_millis(1000)));
        }
        assert_eq!(policy.next_delay(), None);

        policy.reset();
        assert!(policy.next_delay().is_some());
    }
}
