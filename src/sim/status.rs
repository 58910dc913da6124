//! Flight status classification
//!
//! Evaluated redundantly on the simulation owner and on the display
//! layer from the same inputs, so it must stay a pure decision ladder.
//! Inputs arrive in display units: km/h, feet, feet per minute.

use serde::{Deserialize, Serialize};

/// Speed above which a ground run counts as a takeoff roll (km/h)
pub const TAKEOFF_ROLL_KMH: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Parked,
    Taxiing,
    Takeoff,
    Climbing,
    Cruising,
    Descending,
    Landing,
    RolledOut,
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Parked => "parked",
            Self::Taxiing => "taxiing",
            Self::Takeoff => "takeoff",
            Self::Climbing => "climbing",
            Self::Cruising => "cruising",
            Self::Descending => "descending",
            Self::Landing => "landing",
            Self::RolledOut => "rolled_out",
        };
        f.write_str(label)
    }
}

/// Classify the current flight phase. First match wins, top to bottom.
///
/// The landing check runs before the altitude bands so a sinking
/// approach below 200 ft reads as landing rather than as the band it
/// happens to fall in.
pub fn classify(
    speed_kmh: f32,
    altitude_ft: f32,
    vertical_speed_fpm: f32,
    throttle_pct: f32,
) -> FlightStatus {
    if speed_kmh == 0.0 && throttle_pct == 0.0 {
        return FlightStatus::Parked;
    }

    if altitude_ft < 200.0 && vertical_speed_fpm < -50.0 {
        return FlightStatus::Landing;
    }

    if speed_kmh > 0.0 && altitude_ft < 50.0 {
        return if speed_kmh < TAKEOFF_ROLL_KMH {
            FlightStatus::Taxiing
        } else {
            FlightStatus::Takeoff
        };
    }

    if altitude_ft > 50.0 && altitude_ft < 5000.0 {
        if vertical_speed_fpm > 100.0 {
            return FlightStatus::Climbing;
        }
        if vertical_speed_fpm < -100.0 {
            return FlightStatus::Descending;
        }
        return if altitude_ft < 1000.0 {
            FlightStatus::Climbing
        } else {
            FlightStatus::Cruising
        };
    }

    if altitude_ft > 5000.0 {
        if vertical_speed_fpm < -100.0 {
            return FlightStatus::Descending;
        }
        return FlightStatus::Cruising;
    }

    if altitude_ft < 50.0 && speed_kmh > 50.0 {
        return FlightStatus::RolledOut;
    }

    FlightStatus::Cruising
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stationary_with_idle_throttle_is_parked() {
        assert_eq!(classify(0.0, 0.0, 0.0, 0.0), FlightStatus::Parked);
    }

    #[test]
    fn slow_ground_run_is_taxiing() {
        assert_eq!(classify(60.0, 10.0, 0.0, 30.0), FlightStatus::Taxiing);
    }

    #[test]
    fn fast_ground_run_is_takeoff() {
        assert_eq!(classify(150.0, 10.0, 0.0, 100.0), FlightStatus::Takeoff);
    }

    #[test]
    fn sinking_at_cruise_altitude_is_descending() {
        assert_eq!(
            classify(600.0, 10_000.0, -500.0, 40.0),
            FlightStatus::Descending
        );
    }

    #[test]
    fn low_sinking_approach_is_landing() {
        assert_eq!(classify(220.0, 100.0, -80.0, 20.0), FlightStatus::Landing);
    }

    #[test]
    fn initial_climb_without_strong_vertical_speed_is_climbing() {
        assert_eq!(classify(280.0, 600.0, 50.0, 80.0), FlightStatus::Climbing);
    }

    #[test]
    fn mid_band_level_flight_is_cruising() {
        assert_eq!(classify(500.0, 3000.0, 0.0, 60.0), FlightStatus::Cruising);
    }

    #[test]
    fn high_level_flight_is_cruising() {
        assert_eq!(classify(700.0, 12_000.0, 0.0, 70.0), FlightStatus::Cruising);
    }

    #[test]
    fn strong_climb_in_mid_band() {
        assert_eq!(classify(400.0, 2000.0, 800.0, 90.0), FlightStatus::Climbing);
    }
}
