//! Obstacle course navigation
//!
//! Finite state controller for the obstacle section: follow the red path,
//! dodge obstacles found by the range sensor, curve back onto the path, and
//! pick up or drop off the payload in the zones.
//!
//! # States
//! ```text
//!            zone (not carrying)        zone (carrying)
//!     PickUp <------------- FollowPath -------------> DropOff
//!       |                   ^  |    |  ^                 |
//!       +-------------------+  |    |  +-----------------+
//!                     obstacle |    | path lost
//!                              v    v
//!     DodgeAway -> ClearPast -> ArcRecover <-> FailsafeSearch
//!                                   |               |
//!                                   +--> path <-----+
//! ```
//!
//! After a dodge the robot is offset from the path and may be parallel to
//! it, so recovery curves toward the side opposite the dodge instead of
//! driving straight. If the arc does not find the path in time, a short
//! alternating search takes over and then hands back to the arc.
//!
//! # Usage
//! ```ignore
//! let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
//! loop {
//!     let snapshot = SensorSnapshot::sample(&mut sensors).await;
//!     let directive = navigation::step(&snapshot, Instant::now(), &mut ctx);
//!     directive.apply(&mut drive, &mut gripper);
//!     ticker.next().await;
//! }
//! ```

mod context;
mod controller;
mod state;

pub use context::{ControllerContext, INITIAL_DODGE_DIRECTION};
pub use controller::step;
pub use state::{InvalidState, ManipulationPhase, NavigationState, Outcome};
