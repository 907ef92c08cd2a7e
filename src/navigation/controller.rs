//! Obstacle course transitions
//!
//! One call to [`step`] per control cycle. The current state's exit
//! conditions are checked first; on a transition the new state's entry
//! bookkeeping runs and its directive is returned in the same cycle.

use embassy_time::Instant;

use crate::directive::ActuatorDirective;
use crate::sensor::{Label, SensorSnapshot};

use super::context::ControllerContext;
use super::state::{ManipulationPhase, NavigationState, Outcome};

/// Advances the controller by one cycle and returns the directive to apply
///
/// Never blocks and never loops; all waiting is expressed as deadlines in
/// the context.
pub fn step(sensors: &SensorSnapshot, now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if ctx.fault_pending {
        ctx.fault_pending = false;
        ctx.enter_follow_path();
        return ActuatorDirective::Stop;
    }

    match ctx.state {
        NavigationState::FollowPath => follow_path(sensors, now, ctx),
        NavigationState::DodgeAway => dodge_away(now, ctx),
        NavigationState::ClearPast => clear_past(now, ctx),
        NavigationState::ArcRecover => arc_recover(sensors, now, ctx),
        NavigationState::PickUp => pick_up(now, ctx),
        NavigationState::DropOff => drop_off(now, ctx),
        NavigationState::FailsafeSearch => failsafe_search(sensors, now, ctx),
        NavigationState::Complete => ActuatorDirective::Stop,
    }
}

/// Path color is judged before the range: an off-route robot recovers first
fn follow_path(sensors: &SensorSnapshot, now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    let label = sensors.label;

    if label.is_zone() && !ctx.zone_latched {
        return ctx.enter_zone(now);
    }

    match label {
        Label::Path => ctx.zone_latched = false,
        // the zone just served still counts as route
        Label::ZoneA | Label::ZoneB => {}
        Label::Unknown => return ctx.enter_arc(now),
    }

    if sensors.range.is_within(ctx.config().obstacle_threshold_cm) {
        return ctx.enter_dodge(now);
    }

    ActuatorDirective::forward(ctx.config().cruise_speed)
}

fn dodge_away(now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if ctx.phase_elapsed(now) {
        ctx.enter_clear_past(now)
    } else {
        ctx.dodge_directive()
    }
}

fn clear_past(now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if ctx.phase_elapsed(now) {
        ctx.enter_arc(now)
    } else {
        ActuatorDirective::forward(ctx.config().cruise_speed)
    }
}

fn arc_recover(sensors: &SensorSnapshot, now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if sensors.label == Label::Path {
        return ctx.enter_follow_path();
    }

    if ctx.recovery_expired(now) {
        return ctx.enter_failsafe(now);
    }

    ctx.arc_directive()
}

fn failsafe_search(sensors: &SensorSnapshot, now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if sensors.label == Label::Path {
        return ctx.enter_follow_path();
    }

    if !ctx.phase_elapsed(now) {
        return ctx.failsafe_directive();
    }

    if ctx.failsafe_attempt < ctx.config().failsafe_max_attempts {
        ctx.failsafe_attempt += 1;
        return ctx.start_failsafe_attempt(now);
    }

    ctx.recovery_rounds = ctx.recovery_rounds.saturating_add(1);
    match ctx.config().recovery_round_limit {
        Some(limit) if ctx.recovery_rounds >= limit => ctx.enter_complete(Outcome::Aborted),
        _ => ctx.enter_arc(now),
    }
}

fn pick_up(now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if !ctx.phase_elapsed(now) {
        return ctx.manipulation_directive();
    }

    match ctx.manipulation {
        ManipulationPhase::Release => ctx.enter_grasp(now),
        ManipulationPhase::Grasp => ctx.enter_back_off(now),
        ManipulationPhase::BackOff => {
            ctx.zone_latched = true;
            ctx.enter_follow_path()
        }
    }
}

fn drop_off(now: Instant, ctx: &mut ControllerContext) -> ActuatorDirective {
    if !ctx.phase_elapsed(now) {
        return ctx.manipulation_directive();
    }

    match ctx.manipulation {
        // a drop-off never closes the gripper
        ManipulationPhase::Release | ManipulationPhase::Grasp => ctx.enter_back_off(now),
        ManipulationPhase::BackOff => {
            ctx.zone_latched = true;
            ctx.drop_offs = ctx.drop_offs.saturating_add(1);
            match ctx.config().drop_off_quota {
                Some(quota) if ctx.drop_offs >= quota => ctx.enter_complete(Outcome::Finished),
                _ => ctx.enter_follow_path(),
            }
        }
    }
}
