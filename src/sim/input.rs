//! Maps raw key events to the normalized control input
//!
//! The presentation layer forwards key transitions; the mapper keeps a
//! held-keys set and produces a sanitized [`ControlInput`] for the
//! integrator. Two throttle policies exist: `Instant` snaps the lever
//! between 0 and 100 on key transitions, `Ramped` slews it at a fixed
//! rate per second while the key is held, evaluated every tick so
//! throttle and control-surface changes can overlap smoothly.

use std::collections::HashSet;

use crate::sim::state::ControlInput;

/// Logical flight controls, one per key binding
/// (W/S, arrows, A/D, F, G, Space)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKey {
    ThrottleUp,
    ThrottleDown,
    ElevatorDown,
    ElevatorUp,
    RudderLeft,
    RudderRight,
    AileronLeft,
    AileronRight,
    FlapsCycle,
    GearToggle,
    Brake,
}

/// Throttle lever policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrottleMode {
    /// Snap to 0/100 on key transitions
    Instant,
    /// Slew at `rate` percent per second while held
    Ramped { rate: f32 },
}

impl Default for ThrottleMode {
    fn default() -> Self {
        Self::Instant
    }
}

/// Translates key transitions into control input
#[derive(Debug, Clone, Default)]
pub struct InputMapper {
    mode: ThrottleMode,
    held: HashSet<ControlKey>,
    input: ControlInput,
}

impl InputMapper {
    pub fn new(mode: ThrottleMode) -> Self {
        Self {
            mode,
            held: HashSet::new(),
            input: ControlInput::default(),
        }
    }

    /// Key pressed. Discrete controls (flaps, gear) act on this edge;
    /// level controls are recomputed from the held set.
    pub fn key_down(&mut self, key: ControlKey) {
        let was_held = !self.held.insert(key);

        match key {
            // Repeat events from a held key must not re-trigger edges
            ControlKey::FlapsCycle if !was_held => {
                self.input.flaps = (self.input.flaps + 1) % 4;
            }
            ControlKey::GearToggle if !was_held => {
                self.input.gear_down = !self.input.gear_down;
            }
            ControlKey::ThrottleUp => {
                if matches!(self.mode, ThrottleMode::Instant) {
                    self.input.throttle = 100.0;
                }
            }
            ControlKey::ThrottleDown => {
                if matches!(self.mode, ThrottleMode::Instant) {
                    self.input.throttle = 0.0;
                }
            }
            _ => {}
        }

        self.refresh_level_controls();
    }

    /// Key released
    pub fn key_up(&mut self, key: ControlKey) {
        self.held.remove(&key);

        if key == ControlKey::ThrottleUp && matches!(self.mode, ThrottleMode::Instant) {
            self.input.throttle = 0.0;
        }

        self.refresh_level_controls();
    }

    /// Advance per-tick input state. Must be called once per
    /// integration tick; in ramped mode this is where the throttle
    /// lever moves.
    pub fn tick(&mut self, dt_millis: f32) {
        if let ThrottleMode::Ramped { rate } = self.mode {
            let dt = dt_millis / 1000.0;
            if self.held.contains(&ControlKey::ThrottleUp) {
                self.input.throttle += rate * dt;
            }
            if self.held.contains(&ControlKey::ThrottleDown) {
                self.input.throttle -= rate * dt;
            }
        }

        self.refresh_level_controls();
        self.input.sanitize();
    }

    /// Current control input, sanitized for the integrator
    pub fn input(&self) -> ControlInput {
        let mut input = self.input;
        input.sanitize();
        input
    }

    /// Write back a throttle value mutated by the integrator's lever
    /// decay so the mapper stays the single owner of the record
    pub fn set_throttle(&mut self, throttle: f32) {
        self.input.throttle = throttle;
        self.input.sanitize();
    }

    fn refresh_level_controls(&mut self) {
        self.input.elevator = axis(
            &self.held,
            ControlKey::ElevatorUp,
            ControlKey::ElevatorDown,
        );
        self.input.rudder = axis(&self.held, ControlKey::RudderLeft, ControlKey::RudderRight);
        self.input.aileron = axis(
            &self.held,
            ControlKey::AileronLeft,
            ControlKey::AileronRight,
        );
        self.input.brake = self.held.contains(&ControlKey::Brake);
    }
}

fn axis(held: &HashSet<ControlKey>, positive: ControlKey, negative: ControlKey) -> f32 {
    match (held.contains(&positive), held.contains(&negative)) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}
