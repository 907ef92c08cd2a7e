//! Controller context
//!
//! Everything the obstacle course controller remembers between cycles. The
//! context has one owner (the cycle driver) and is only changed through
//! [`super::step`] and the section operations below.
//!
//! State entry bookkeeping lives here so that a transition, a restore and a
//! reset all go through the same code.

use embassy_time::Instant;

use crate::config::NavigationConfig;
use crate::directive::{ActuatorDirective, GripperPosition, TurnDirection};

use super::state::{InvalidState, ManipulationPhase, NavigationState, Outcome};

/// Dodge direction before the first dodge; the first dodge flips it
pub const INITIAL_DODGE_DIRECTION: TurnDirection = TurnDirection::Right;

/// Mutable controller state for one obstacle course run
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerContext {
    config: NavigationConfig,
    pub(super) state: NavigationState,
    /// Side of the most recent dodge
    pub(super) dodge_direction: TurnDirection,
    /// True between a pickup and the next drop-off
    pub(super) carrying_payload: bool,
    /// End of the current arc recovery
    pub(super) recovery_deadline: Option<Instant>,
    /// Index of the current failsafe step
    pub(super) failsafe_attempt: u8,
    /// End of the current timed action (dodge, clear, failsafe step, manipulation phase)
    pub(super) phase_deadline: Option<Instant>,
    pub(super) manipulation: ManipulationPhase,
    /// Set after a manipulation; the zone underneath is ignored until the path shows again
    pub(super) zone_latched: bool,
    /// Failsafe exhaustions since the path was last seen
    pub(super) recovery_rounds: u8,
    pub(super) drop_offs: u8,
    pub(super) outcome: Outcome,
    /// A bad raw state was restored; the next step stops and heals
    pub(super) fault_pending: bool,
}

impl ControllerContext {
    /// Fresh context at section entry
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config,
            state: NavigationState::FollowPath,
            dodge_direction: INITIAL_DODGE_DIRECTION,
            carrying_payload: false,
            recovery_deadline: None,
            failsafe_attempt: 0,
            phase_deadline: None,
            manipulation: ManipulationPhase::Release,
            zone_latched: false,
            recovery_rounds: 0,
            drop_offs: 0,
            outcome: Outcome::Running,
            fault_pending: false,
        }
    }

    /// Section reset: back to `FollowPath` with all bookkeeping cleared
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Re-enters a state given as a raw value
    ///
    /// Valid values run the regular entry bookkeeping. `PickUp` and
    /// `DropOff` are picked by the payload flag, whichever was asked for.
    /// An invalid value makes the next step stop the robot and fall back to
    /// `FollowPath`.
    pub fn restore_state(&mut self, raw: u8, now: Instant) -> Result<NavigationState, InvalidState> {
        match NavigationState::try_from(raw) {
            Ok(state) => {
                self.fault_pending = false;
                self.enter(state, now);
                Ok(self.state)
            }
            Err(e) => {
                self.fault_pending = true;
                Err(e)
            }
        }
    }

    /// False while the controller decides on time alone
    ///
    /// No sensors are polled during dodges, clearing drives, gripper
    /// sequences, in the terminal state and on the healing cycle after a
    /// fault.
    pub fn needs_sensors(&self) -> bool {
        !self.fault_pending
            && matches!(
                self.state,
                NavigationState::FollowPath
                    | NavigationState::ArcRecover
                    | NavigationState::FailsafeSearch
            )
    }

    pub fn config(&self) -> &NavigationConfig {
        &self.config
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn dodge_direction(&self) -> TurnDirection {
        self.dodge_direction
    }

    pub fn carrying_payload(&self) -> bool {
        self.carrying_payload
    }

    pub fn recovery_deadline(&self) -> Option<Instant> {
        self.recovery_deadline
    }

    pub fn failsafe_attempt(&self) -> u8 {
        self.failsafe_attempt
    }

    pub fn manipulation_phase(&self) -> Option<ManipulationPhase> {
        self.state.is_manipulating().then_some(self.manipulation)
    }

    pub fn zone_latched(&self) -> bool {
        self.zone_latched
    }

    pub fn recovery_rounds(&self) -> u8 {
        self.recovery_rounds
    }

    pub fn drop_offs(&self) -> u8 {
        self.drop_offs
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Side the recovery arc and failsafe pivots turn toward
    pub fn recovery_direction(&self) -> TurnDirection {
        self.dodge_direction.opposite()
    }

    pub(super) fn phase_elapsed(&self, now: Instant) -> bool {
        self.phase_deadline.map_or(true, |deadline| now >= deadline)
    }

    pub(super) fn recovery_expired(&self, now: Instant) -> bool {
        self.recovery_deadline.map_or(true, |deadline| now > deadline)
    }

    fn enter(&mut self, state: NavigationState, now: Instant) -> ActuatorDirective {
        match state {
            NavigationState::FollowPath => self.enter_follow_path(),
            NavigationState::DodgeAway => self.enter_dodge(now),
            NavigationState::ClearPast => self.enter_clear_past(now),
            NavigationState::ArcRecover => self.enter_arc(now),
            NavigationState::PickUp | NavigationState::DropOff => self.enter_zone(now),
            NavigationState::FailsafeSearch => self.enter_failsafe(now),
            NavigationState::Complete => self.enter_complete(Outcome::Finished),
        }
    }

    pub(super) fn enter_follow_path(&mut self) -> ActuatorDirective {
        self.state = NavigationState::FollowPath;
        self.recovery_deadline = None;
        self.phase_deadline = None;
        self.recovery_rounds = 0;
        ActuatorDirective::forward(self.config.cruise_speed)
    }

    pub(super) fn enter_dodge(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::DodgeAway;
        self.dodge_direction = self.dodge_direction.opposite();
        self.phase_deadline = Some(now + self.config.dodge_turn);
        self.dodge_directive()
    }

    pub(super) fn dodge_directive(&self) -> ActuatorDirective {
        ActuatorDirective::Pivot {
            direction: self.dodge_direction,
            speed: self.config.turn_speed,
        }
    }

    pub(super) fn enter_clear_past(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::ClearPast;
        self.phase_deadline = Some(now + self.config.clear_forward);
        ActuatorDirective::forward(self.config.cruise_speed)
    }

    pub(super) fn enter_arc(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::ArcRecover;
        self.phase_deadline = None;
        self.recovery_deadline = Some(now + self.config.recovery_timeout);
        self.arc_directive()
    }

    pub(super) fn arc_directive(&self) -> ActuatorDirective {
        ActuatorDirective::arc(
            self.recovery_direction(),
            self.config.arc_inner_speed,
            self.config.arc_outer_speed,
        )
    }

    pub(super) fn enter_failsafe(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::FailsafeSearch;
        self.recovery_deadline = None;
        self.failsafe_attempt = 0;
        self.start_failsafe_attempt(now)
    }

    pub(super) fn start_failsafe_attempt(&mut self, now: Instant) -> ActuatorDirective {
        let length = if self.failsafe_attempt % 2 == 0 {
            self.config.failsafe_turn_for(self.failsafe_attempt)
        } else {
            self.config.failsafe_forward
        };
        self.phase_deadline = Some(now + length);
        self.failsafe_directive()
    }

    /// Even attempts pivot toward the expected path side, odd ones step forward
    pub(super) fn failsafe_directive(&self) -> ActuatorDirective {
        if self.failsafe_attempt % 2 == 0 {
            ActuatorDirective::Pivot {
                direction: self.recovery_direction(),
                speed: self.config.turn_speed,
            }
        } else {
            ActuatorDirective::forward(self.config.slow_speed)
        }
    }

    /// Pickup when empty handed, drop-off when carrying
    pub(super) fn enter_zone(&mut self, now: Instant) -> ActuatorDirective {
        if self.carrying_payload {
            self.enter_drop_off(now)
        } else {
            self.enter_pick_up(now)
        }
    }

    fn enter_pick_up(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::PickUp;
        self.recovery_deadline = None;
        self.manipulation = ManipulationPhase::Release;
        self.phase_deadline = Some(now + self.config.release_settle);
        self.manipulation_directive()
    }

    fn enter_drop_off(&mut self, now: Instant) -> ActuatorDirective {
        self.state = NavigationState::DropOff;
        self.recovery_deadline = None;
        self.manipulation = ManipulationPhase::Release;
        self.carrying_payload = false;
        self.phase_deadline = Some(now + self.config.drop_settle);
        self.manipulation_directive()
    }

    pub(super) fn enter_grasp(&mut self, now: Instant) -> ActuatorDirective {
        self.manipulation = ManipulationPhase::Grasp;
        self.carrying_payload = true;
        self.phase_deadline = Some(now + self.config.grasp_settle);
        self.manipulation_directive()
    }

    pub(super) fn enter_back_off(&mut self, now: Instant) -> ActuatorDirective {
        self.manipulation = ManipulationPhase::BackOff;
        self.phase_deadline = Some(now + self.config.back_off);
        self.manipulation_directive()
    }

    pub(super) fn manipulation_directive(&self) -> ActuatorDirective {
        match self.manipulation {
            ManipulationPhase::Release => ActuatorDirective::Grip(GripperPosition::Open),
            ManipulationPhase::Grasp => ActuatorDirective::Grip(GripperPosition::Closed),
            ManipulationPhase::BackOff => ActuatorDirective::backward(self.config.slow_speed),
        }
    }

    pub(super) fn enter_complete(&mut self, outcome: Outcome) -> ActuatorDirective {
        self.state = NavigationState::Complete;
        self.recovery_deadline = None;
        self.phase_deadline = None;
        self.outcome = outcome;
        ActuatorDirective::Stop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_time::Duration;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn test_new_context_starts_following() {
        let ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        assert_eq!(ctx.state(), NavigationState::FollowPath);
        assert_eq!(ctx.dodge_direction(), INITIAL_DODGE_DIRECTION);
        assert!(!ctx.carrying_payload());
        assert_eq!(ctx.recovery_deadline(), None);
        assert_eq!(ctx.failsafe_attempt(), 0);
        assert_eq!(ctx.outcome(), Outcome::Running);
        assert!(ctx.needs_sensors());
    }

    #[test]
    fn test_reset_clears_bookkeeping_but_keeps_config() {
        let config = NavigationConfig {
            obstacle_threshold_cm: 25,
            ..NavigationConfig::DEFAULT
        };
        let mut ctx = ControllerContext::new(config);
        ctx.enter_dodge(at(0));
        ctx.carrying_payload = true;
        ctx.reset();
        assert_eq!(ctx.state(), NavigationState::FollowPath);
        assert_eq!(ctx.dodge_direction(), INITIAL_DODGE_DIRECTION);
        assert!(!ctx.carrying_payload());
        assert_eq!(ctx.config().obstacle_threshold_cm, 25);
    }

    #[test]
    fn test_restore_arc_sets_a_fresh_deadline() {
        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        let state = ctx.restore_state(NavigationState::ArcRecover as u8, at(1_000));
        assert_eq!(state, Ok(NavigationState::ArcRecover));
        assert_eq!(
            ctx.recovery_deadline(),
            Some(at(1_000) + Duration::from_millis(1200))
        );
    }

    #[test]
    fn test_restore_resolves_zone_states_by_payload() {
        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        let state = ctx.restore_state(NavigationState::DropOff as u8, at(0));
        assert_eq!(state, Ok(NavigationState::PickUp));

        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        ctx.carrying_payload = true;
        let state = ctx.restore_state(NavigationState::PickUp as u8, at(0));
        assert_eq!(state, Ok(NavigationState::DropOff));
        assert!(!ctx.carrying_payload());
    }

    #[test]
    fn test_restore_invalid_arms_the_fault() {
        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        assert_eq!(ctx.restore_state(42, at(0)), Err(InvalidState(42)));
        assert!(ctx.fault_pending);
        assert!(!ctx.needs_sensors());
    }

    #[test]
    fn test_sensors_skipped_during_timed_actions() {
        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        ctx.enter_dodge(at(0));
        assert!(!ctx.needs_sensors());
        ctx.enter_clear_past(at(0));
        assert!(!ctx.needs_sensors());
        ctx.enter_zone(at(0));
        assert!(!ctx.needs_sensors());
        ctx.enter_arc(at(0));
        assert!(ctx.needs_sensors());
        ctx.enter_failsafe(at(0));
        assert!(ctx.needs_sensors());
        ctx.enter_complete(Outcome::Finished);
        assert!(!ctx.needs_sensors());
    }

    #[test]
    fn test_manipulation_phase_only_reported_while_manipulating() {
        let mut ctx = ControllerContext::new(NavigationConfig::DEFAULT);
        assert_eq!(ctx.manipulation_phase(), None);
        ctx.enter_zone(at(0));
        assert_eq!(ctx.manipulation_phase(), Some(ManipulationPhase::Release));
    }
}
