//! Fixed-timestep flight dynamics integration
//!
//! `FlightDynamics::advance` is a deterministic function of
//! (state, input, dt). It never fails; out-of-range results are clamped.
//! Lift acts purely vertically and drag purely along the runway axis,
//! a simplified body-frame approximation rather than full 6-DOF.

use crate::sim::state::{ControlInput, PlaneState, Vec3};

/// Tuning constants for the simulated airframe.
///
/// Defaults approximate a narrow-body airliner. This is the single
/// canonical parameter set; tune here, not at call sites.
#[derive(Debug, Clone, Copy)]
pub struct AircraftParams {
    pub mass_kg: f32,
    pub wing_area_m2: f32,
    pub max_thrust_n: f32,
    pub air_density: f32,
    /// Throttle lever spring-back in percent per second while the lever
    /// is between detents. The input mapper re-asserts held throttle
    /// every tick, so decay only bites once the key is released.
    pub throttle_decay_rate: f32,
    /// Attitude rates in degrees per second at full deflection
    pub pitch_rate_deg: f32,
    pub roll_rate_deg: f32,
    pub yaw_rate_deg: f32,
    pub max_pitch_deg: f32,
    pub max_roll_deg: f32,
    /// Fuel burn in percent per second at full throttle, scaled by
    /// throttle percent
    pub fuel_burn_rate: f32,
    pub brake_coefficient: f32,
    /// Altitude below which ground interaction applies (meters)
    pub ground_contact_m: f32,
    pub ground_friction: f32,
    /// Throttle percent above which rolling friction is suppressed
    pub high_throttle_pct: f32,
    /// Upper bound on a single integration step (seconds)
    pub max_step_secs: f32,
    pub gravity: f32,
}

impl Default for AircraftParams {
    fn default() -> Self {
        Self {
            mass_kg: 78_000.0,
            wing_area_m2: 122.4,
            max_thrust_n: 120_000.0,
            air_density: 1.225,
            throttle_decay_rate: 30.0,
            pitch_rate_deg: 40.0,
            roll_rate_deg: 50.0,
            yaw_rate_deg: 20.0,
            max_pitch_deg: 30.0,
            max_roll_deg: 45.0,
            fuel_burn_rate: 0.000_05,
            brake_coefficient: 0.3,
            ground_contact_m: 0.5,
            ground_friction: 0.02,
            high_throttle_pct: 50.0,
            max_step_secs: 0.05,
            gravity: 9.81,
        }
    }
}

/// The per-tick integrator
#[derive(Debug, Clone, Copy, Default)]
pub struct FlightDynamics {
    params: AircraftParams,
}

impl FlightDynamics {
    pub fn new(params: AircraftParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AircraftParams {
        &self.params
    }

    /// Advance `state` by `dt_millis` of simulated time.
    ///
    /// The step is clamped to `max_step_secs` so frame hitches never
    /// integrate an oversized force impulse. Throttle decay writes back
    /// into `input`, matching a spring-loaded lever.
    pub fn advance(&self, state: &mut PlaneState, input: &mut ControlInput, dt_millis: f32) {
        let dt = (dt_millis / 1000.0).clamp(0.0, self.params.max_step_secs);

        self.decay_throttle(input, dt);
        self.apply_aerodynamics(state, input, dt);
        self.apply_engine(state, input, dt);
        self.apply_attitude(state, input, dt);
        self.integrate_position(state, dt);
        self.apply_ground(state, input, dt);
        self.derive_scalars(state);
    }

    fn decay_throttle(&self, input: &mut ControlInput, dt: f32) {
        if input.throttle > 0.0 && input.throttle < 100.0 {
            input.throttle = (input.throttle - self.params.throttle_decay_rate * dt).max(0.0);
        }
    }

    fn apply_aerodynamics(&self, state: &mut PlaneState, input: &ControlInput, dt: f32) {
        // No meaningful airflow below walking pace
        if state.speed_kmh < 1.0 {
            return;
        }

        let speed_ms = state.speed_kmh / 3.6;
        let dynamic = 0.5 * self.params.air_density * speed_ms * speed_ms * self.params.wing_area_m2;

        // Angle of attack approximated by pitch
        let aoa = state.pitch_deg.to_radians();

        let mut cl = 0.2 + 2.0 * std::f32::consts::PI * aoa;
        cl += input.flaps as f32 * 0.3;
        cl = cl.clamp(-1.5, 1.5);

        let mut cd = 0.02;
        cd += input.flaps as f32 * 0.04;
        if input.gear_down {
            cd += 0.05;
        }
        cd += 0.02 * aoa * aoa;
        cd = cd.max(0.01);

        let lift = dynamic * cl;
        let drag = dynamic * cd;

        state.velocity.y += lift * dt / self.params.mass_kg;
        state.velocity.z -= drag * dt / self.params.mass_kg;
    }

    fn apply_engine(&self, state: &mut PlaneState, input: &ControlInput, dt: f32) {
        let thrust = self.params.max_thrust_n * (input.throttle / 100.0);
        let heading = state.heading_deg.to_radians();

        state.velocity.x += heading.sin() * thrust * dt / self.params.mass_kg;
        state.velocity.z += heading.cos() * thrust * dt / self.params.mass_kg;

        if input.throttle > 0.0 {
            state.fuel_percent =
                (state.fuel_percent - dt * input.throttle * self.params.fuel_burn_rate).max(0.0);
        }

        if input.brake && state.speed_kmh > 0.0 {
            let brake_force = self.params.brake_coefficient * state.speed_kmh;
            let scale = (1.0 - brake_force * dt / self.params.mass_kg).max(0.0);
            state.velocity.x *= scale;
            state.velocity.y *= scale;
            state.velocity.z *= scale;
        }
    }

    fn apply_attitude(&self, state: &mut PlaneState, input: &ControlInput, dt: f32) {
        state.pitch_deg += input.elevator * self.params.pitch_rate_deg * dt;
        state.roll_deg += input.aileron * self.params.roll_rate_deg * dt;
        state.heading_deg += input.rudder * self.params.yaw_rate_deg * dt;

        state.pitch_deg = state
            .pitch_deg
            .clamp(-self.params.max_pitch_deg, self.params.max_pitch_deg);
        state.roll_deg = state
            .roll_deg
            .clamp(-self.params.max_roll_deg, self.params.max_roll_deg);
        state.heading_deg = state.heading_deg.rem_euclid(360.0);

        state.velocity.y -= self.params.gravity * dt;
    }

    fn integrate_position(&self, state: &mut PlaneState, dt: f32) {
        state.position.x += state.velocity.x * dt;
        state.position.y += state.velocity.y * dt;
        state.position.z += state.velocity.z * dt;
    }

    fn apply_ground(&self, state: &mut PlaneState, input: &ControlInput, dt: f32) {
        if state.position.y > self.params.ground_contact_m {
            return;
        }

        state.position.y = self.params.ground_contact_m;

        if state.velocity.y < 0.0 {
            state.velocity.y = 0.0;
        }

        // Rolling friction unless braking or spooled up
        if !input.brake && input.throttle < self.params.high_throttle_pct {
            let scale = 1.0 - self.params.ground_friction * dt;
            state.velocity.x *= scale;
            state.velocity.y *= scale;
            state.velocity.z *= scale;
        }

        // Wings level out while rolling on the gear
        if state.roll_deg.abs() > 5.0 {
            state.roll_deg *= 0.95;
        }
    }

    fn derive_scalars(&self, state: &mut PlaneState) {
        state.speed_kmh = state.velocity.length() * 3.6;
        state.altitude_m = state.position.y.max(0.0);
        state.vertical_speed_ms = state.velocity.y;
        state.rotation = Vec3::new(
            state.pitch_deg.to_radians(),
            state.heading_deg.to_radians(),
            state.roll_deg.to_radians(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn full_throttle() -> ControlInput {
        ControlInput {
            throttle: 100.0,
            ..ControlInput::default()
        }
    }

    fn assert_within_invariants(state: &PlaneState) {
        assert!(state.position.is_finite());
        assert!(state.velocity.is_finite());
        assert!(state.pitch_deg.is_finite() && (-30.0..=30.0).contains(&state.pitch_deg));
        assert!(state.roll_deg.is_finite() && (-45.0..=45.0).contains(&state.roll_deg));
        assert!(state.heading_deg.is_finite());
        assert!((0.0..360.0).contains(&state.heading_deg));
        assert!((0.0..=100.0).contains(&state.fuel_percent));
        assert!(state.altitude_m >= 0.0);
    }

    #[test]
    fn zero_time_step_leaves_state_unchanged() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = ControlInput::default();
        let before = state;

        dynamics.advance(&mut state, &mut input, 0.0);

        assert_relative_eq!(state.position.y, before.position.y);
        assert_relative_eq!(state.velocity.y, before.velocity.y);
        assert_relative_eq!(state.heading_deg, before.heading_deg);
        assert_relative_eq!(state.fuel_percent, before.fuel_percent);
    }

    #[test]
    fn oversized_frame_time_is_clamped() {
        let dynamics = FlightDynamics::default();
        let mut slow = PlaneState::spawned();
        let mut clamped = PlaneState::spawned();
        let mut input_a = full_throttle();
        let mut input_b = full_throttle();

        // A five-second hitch must integrate the same impulse as a
        // single 50 ms step.
        dynamics.advance(&mut slow, &mut input_a, 5000.0);
        dynamics.advance(&mut clamped, &mut input_b, 50.0);

        assert_relative_eq!(slow.velocity.x, clamped.velocity.x);
        assert_relative_eq!(slow.velocity.z, clamped.velocity.z);
    }

    #[test]
    fn invariants_hold_across_varied_input() {
        let dynamics = FlightDynamics::default();
        let cases = [
            (100.0, 1.0, 0.0, 0.0, 0, false),
            (100.0, -1.0, 1.0, -1.0, 3, true),
            (50.0, 0.5, -1.0, 1.0, 2, false),
            (0.0, -1.0, 0.3, -0.7, 1, true),
        ];

        for (throttle, elevator, rudder, aileron, flaps, brake) in cases {
            let mut state = PlaneState::spawned();
            let mut input = ControlInput {
                throttle,
                elevator,
                rudder,
                aileron,
                flaps,
                gear_down: true,
                brake,
            };
            for _ in 0..2000 {
                // Throttle decay winds the lever down; re-assert it the
                // way a held key would.
                input.throttle = throttle;
                dynamics.advance(&mut state, &mut input, 16.0);
                assert_within_invariants(&state);
            }
        }
    }

    #[test]
    fn ground_contact_clamps_altitude_and_sink() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        state.position.y = 0.1;
        state.velocity.y = -20.0;
        let mut input = ControlInput::default();

        dynamics.advance(&mut state, &mut input, 16.0);

        assert!(state.altitude_m >= dynamics.params().ground_contact_m);
        assert!(state.vertical_speed_ms >= 0.0);
    }

    #[test]
    fn fuel_burns_monotonically_under_power() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = full_throttle();
        let mut previous = state.fuel_percent;

        for _ in 0..500 {
            input.throttle = 100.0;
            dynamics.advance(&mut state, &mut input, 50.0);
            assert!(state.fuel_percent <= previous);
            assert!(state.fuel_percent >= 0.0);
            previous = state.fuel_percent;
        }
    }

    #[test]
    fn fuel_constant_at_idle() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = ControlInput::default();

        for _ in 0..200 {
            dynamics.advance(&mut state, &mut input, 50.0);
        }

        assert_relative_eq!(state.fuel_percent, 100.0);
    }

    #[test]
    fn heading_wraps_into_compass_range() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = ControlInput {
            rudder: 1.0,
            ..ControlInput::default()
        };

        for _ in 0..5000 {
            input.rudder = 1.0;
            dynamics.advance(&mut state, &mut input, 50.0);
            assert!((0.0..360.0).contains(&state.heading_deg));
        }
    }

    #[test]
    fn throttle_lever_springs_back_when_released() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = ControlInput {
            throttle: 60.0,
            ..ControlInput::default()
        };

        dynamics.advance(&mut state, &mut input, 50.0);

        assert!(input.throttle < 60.0);
        assert!(input.throttle >= 0.0);
    }

    #[test]
    fn full_throttle_accelerates_down_the_runway() {
        let dynamics = FlightDynamics::default();
        let mut state = PlaneState::spawned();
        let mut input = full_throttle();

        for _ in 0..600 {
            input.throttle = 100.0;
            dynamics.advance(&mut state, &mut input, 16.0);
        }

        assert!(state.speed_kmh > 50.0);
        // Spawn heading is 270, so thrust points along -X
        assert!(state.position.x < -1.0);
    }
}
