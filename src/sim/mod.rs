//! Flight simulation core
//!
//! Pure, deterministic pieces shared by the server and the client:
//! the control-input record, the fixed-timestep flight dynamics
//! integrator, the key-event mapper that feeds it, and the flight
//! status classifier evaluated on both sides of the wire.

pub mod dynamics;
pub mod input;
pub mod state;
pub mod status;

pub use dynamics::{AircraftParams, FlightDynamics};
pub use input::{ControlKey, InputMapper, ThrottleMode};
pub use state::{ControlInput, PlaneState, Vec3};
pub use status::{classify, FlightStatus};
