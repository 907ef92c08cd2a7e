//! Target section controller
//!
//! The target is a square with a blue margin, a green circle and a black box
//! in the center. The robot starts somewhere inside, heading in a random
//! direction, and has to stop on the box.
//!
//! # Search
//! 1. Drive until a blue margin, turn around
//! 2. Cross to the opposite margin, timing the crossing
//! 3. Turn around, drive back for half the crossing time
//! 4. Turn left a quarter and drive until the box turns up, turning around
//!    at every margin on the way
//!
//! Black ends the run from any state. Entering the green circle switches to
//! a timed straight search. A crossing that takes too long, too many margin
//! bounces or an unsuccessful green search start the search over in a new
//! random direction.
//!
//! Turns are timed pivots. The controller never blocks: a pivot in progress
//! is repeated every cycle until its deadline, and sensors are not read
//! while the robot spins.

use embassy_time::{Duration, Instant};
use nanorand::{Rng, WyRand};

use crate::config::TargetConfig;
use crate::directive::{ActuatorDirective, TurnDirection};
use crate::sensor::{Label, SensorSnapshot};

/// Target section state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetState {
    /// Driving in the starting direction until a margin
    MoveRandom,
    /// Crossing from the first margin to the opposite one
    FoundFirstBlue,
    /// Turning around and driving back half the crossing
    ReturnHalf,
    /// Quarter turn toward the center line
    Turn90,
    /// Driving along the center line
    SearchCenter,
    /// Straight search inside the green circle
    GreenZone,
    /// Stopped on the box
    Complete,
}

/// Starting direction relative to where the robot was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Forward,
    Left,
    Right,
    Backward,
}

impl Heading {
    fn random(rng: &mut WyRand) -> Self {
        match rng.generate_range(0_u8..4) {
            0 => Heading::Forward,
            1 => Heading::Left,
            2 => Heading::Right,
            _ => Heading::Backward,
        }
    }
}

/// Timed pivot in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Turn {
    direction: TurnDirection,
    until: Instant,
}

/// Target section controller
#[derive(Clone)]
pub struct TargetSeeker {
    config: TargetConfig,
    rng: WyRand,
    state: TargetState,
    heading: Heading,
    turn: Option<Turn>,
    /// A non-blue reading was seen since the last margin
    left_margin: bool,
    crossing_start: Instant,
    crossing: Duration,
    deadline: Instant,
    bounces: u8,
    restarts: u16,
}

impl TargetSeeker {
    /// Builds the controller and picks the first heading
    ///
    /// The seed drives the heading choice only.
    pub fn new(config: TargetConfig, seed: u64, now: Instant) -> Self {
        let mut seeker = Self {
            config,
            rng: WyRand::new_seed(seed),
            state: TargetState::MoveRandom,
            heading: Heading::Forward,
            turn: None,
            left_margin: true,
            crossing_start: now,
            crossing: Duration::from_ticks(0),
            deadline: now,
            bounces: 0,
            restarts: 0,
        };
        seeker.head_out(now);
        seeker
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    /// Time the last full crossing took
    pub fn crossing(&self) -> Duration {
        self.crossing
    }

    /// How often the search started over
    pub fn restarts(&self) -> u16 {
        self.restarts
    }

    pub fn is_turning(&self) -> bool {
        self.turn.is_some()
    }

    /// False while pivoting and once complete
    pub fn needs_sensors(&self) -> bool {
        self.state != TargetState::Complete && self.turn.is_none()
    }

    /// One control cycle
    pub fn step(&mut self, sensors: &SensorSnapshot, now: Instant) -> ActuatorDirective {
        if self.state == TargetState::Complete {
            return ActuatorDirective::Stop;
        }

        if let Some(turn) = self.turn {
            if now < turn.until {
                return self.pivot(turn.direction);
            }
            self.turn = None;
            return self.turn_done(now);
        }

        if sensors.label == Label::Path {
            self.state = TargetState::Complete;
            return ActuatorDirective::Stop;
        }

        let margin = self.margin_entered(sensors.label);
        let green = sensors.label == Label::ZoneB;

        match self.state {
            TargetState::MoveRandom if margin => {
                self.state = TargetState::FoundFirstBlue;
                self.begin_turn(TurnDirection::Right, self.config.turn_180, now)
            }
            TargetState::MoveRandom if green => self.enter_green(now),
            TargetState::FoundFirstBlue if margin => {
                self.crossing = now - self.crossing_start;
                self.state = TargetState::ReturnHalf;
                self.begin_turn(TurnDirection::Right, self.config.turn_180, now)
            }
            TargetState::FoundFirstBlue if green => self.enter_green(now),
            TargetState::FoundFirstBlue
                if now - self.crossing_start > self.config.crossing_timeout =>
            {
                self.restart(now)
            }
            TargetState::ReturnHalf if now >= self.deadline => {
                self.state = TargetState::Turn90;
                self.begin_turn(TurnDirection::Left, self.config.turn_90, now)
            }
            TargetState::SearchCenter if margin => {
                self.bounces += 1;
                if self.bounces > self.config.max_bounces {
                    self.restart(now)
                } else {
                    self.begin_turn(TurnDirection::Right, self.config.turn_180, now)
                }
            }
            TargetState::SearchCenter if green => self.enter_green(now),
            TargetState::GreenZone if now >= self.deadline => self.restart(now),
            _ => self.cruise(),
        }
    }

    /// Blue counts once per margin: the robot has to leave it first
    fn margin_entered(&mut self, label: Label) -> bool {
        if label != Label::ZoneA {
            self.left_margin = true;
            return false;
        }
        let entered = self.left_margin;
        self.left_margin = false;
        entered
    }

    /// Picks a random heading and sets off
    fn head_out(&mut self, now: Instant) -> ActuatorDirective {
        self.state = TargetState::MoveRandom;
        self.bounces = 0;
        self.heading = Heading::random(&mut self.rng);
        match self.heading {
            Heading::Forward => self.cruise(),
            Heading::Left => self.begin_turn(TurnDirection::Left, self.config.turn_90, now),
            Heading::Right => self.begin_turn(TurnDirection::Right, self.config.turn_90, now),
            Heading::Backward => self.begin_turn(TurnDirection::Right, self.config.turn_180, now),
        }
    }

    fn restart(&mut self, now: Instant) -> ActuatorDirective {
        self.restarts = self.restarts.saturating_add(1);
        self.head_out(now)
    }

    fn enter_green(&mut self, now: Instant) -> ActuatorDirective {
        self.state = TargetState::GreenZone;
        self.deadline = now + self.config.green_timeout;
        self.cruise()
    }

    fn begin_turn(
        &mut self,
        direction: TurnDirection,
        length: Duration,
        now: Instant,
    ) -> ActuatorDirective {
        self.turn = Some(Turn {
            direction,
            until: now + length,
        });
        self.pivot(direction)
    }

    /// Continues after a pivot; the snapshot of this cycle was not sampled
    fn turn_done(&mut self, now: Instant) -> ActuatorDirective {
        match self.state {
            TargetState::FoundFirstBlue => self.crossing_start = now,
            TargetState::ReturnHalf => self.deadline = now + self.crossing / 2,
            TargetState::Turn90 => self.state = TargetState::SearchCenter,
            _ => (),
        }
        self.cruise()
    }

    fn cruise(&self) -> ActuatorDirective {
        ActuatorDirective::forward(self.config.drive_speed)
    }

    fn pivot(&self, direction: TurnDirection) -> ActuatorDirective {
        ActuatorDirective::Pivot {
            direction,
            speed: self.config.turn_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::Range;
    use crate::sensor::Proximity;

    fn snapshot(label: Label) -> SensorSnapshot {
        SensorSnapshot {
            label,
            proximity: Proximity::default(),
            range: Range::Clear,
        }
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    /// Seeker already heading straight on, whatever the seed picked
    fn cruising(start: u64) -> TargetSeeker {
        let mut seeker = TargetSeeker::new(TargetConfig::DEFAULT, 7, at(start));
        seeker.turn = None;
        seeker.state = TargetState::MoveRandom;
        seeker
    }

    fn right_pivot() -> ActuatorDirective {
        ActuatorDirective::Pivot {
            direction: TurnDirection::Right,
            speed: 47,
        }
    }

    #[test]
    fn test_heading_decides_first_directive() {
        for seed in 0..32 {
            let mut seeker = TargetSeeker::new(TargetConfig::DEFAULT, seed, at(0));
            let directive = seeker.step(&SensorSnapshot::BLANK, at(10));
            match seeker.heading() {
                Heading::Forward => {
                    assert!(!seeker.is_turning());
                    assert_eq!(directive, ActuatorDirective::forward(59));
                }
                Heading::Left => assert_eq!(
                    directive,
                    ActuatorDirective::Pivot {
                        direction: TurnDirection::Left,
                        speed: 47
                    }
                ),
                Heading::Right | Heading::Backward => assert_eq!(directive, right_pivot()),
            }
            assert_eq!(seeker.state(), TargetState::MoveRandom);
        }
    }

    #[test]
    fn test_same_seed_same_heading() {
        let a = TargetSeeker::new(TargetConfig::DEFAULT, 1234, at(0));
        let b = TargetSeeker::new(TargetConfig::DEFAULT, 1234, at(0));
        assert_eq!(a.heading(), b.heading());
    }

    #[test]
    fn test_black_completes_from_any_search_state() {
        for state in [
            TargetState::MoveRandom,
            TargetState::FoundFirstBlue,
            TargetState::ReturnHalf,
            TargetState::SearchCenter,
            TargetState::GreenZone,
        ] {
            let mut seeker = cruising(0);
            seeker.state = state;
            seeker.deadline = at(60_000);
            assert_eq!(
                seeker.step(&snapshot(Label::Path), at(100)),
                ActuatorDirective::Stop
            );
            assert_eq!(seeker.state(), TargetState::Complete);
            assert!(!seeker.needs_sensors());
        }
    }

    #[test]
    fn test_crossing_sequence_reaches_center_search() {
        let mut seeker = cruising(0);

        // first margin: turn around
        assert_eq!(seeker.step(&snapshot(Label::ZoneA), at(100)), right_pivot());
        assert_eq!(seeker.state(), TargetState::FoundFirstBlue);
        assert!(!seeker.needs_sensors());
        assert_eq!(seeker.step(&SensorSnapshot::BLANK, at(600)), right_pivot());

        // turn over, crossing clock starts
        assert_eq!(
            seeker.step(&SensorSnapshot::BLANK, at(1100)),
            ActuatorDirective::forward(59)
        );

        // still on the first margin, then across
        seeker.step(&snapshot(Label::ZoneA), at(1200));
        assert_eq!(seeker.state(), TargetState::FoundFirstBlue);
        seeker.step(&snapshot(Label::Unknown), at(2000));
        assert_eq!(seeker.step(&snapshot(Label::ZoneA), at(5100)), right_pivot());
        assert_eq!(seeker.state(), TargetState::ReturnHalf);
        assert_eq!(seeker.crossing(), Duration::from_millis(4000));

        // turn around, then back for half the crossing
        assert_eq!(
            seeker.step(&SensorSnapshot::BLANK, at(6100)),
            ActuatorDirective::forward(59)
        );
        seeker.step(&snapshot(Label::Unknown), at(8000));
        assert_eq!(seeker.state(), TargetState::ReturnHalf);

        // half way: quarter turn left
        assert_eq!(
            seeker.step(&snapshot(Label::Unknown), at(8100)),
            ActuatorDirective::Pivot {
                direction: TurnDirection::Left,
                speed: 47
            }
        );
        assert_eq!(seeker.state(), TargetState::Turn90);
        seeker.step(&SensorSnapshot::BLANK, at(8600));
        assert_eq!(seeker.state(), TargetState::SearchCenter);
        assert_eq!(seeker.restarts(), 0);
    }

    #[test]
    fn test_margin_counts_once_until_left() {
        let mut seeker = cruising(0);
        seeker.state = TargetState::SearchCenter;

        seeker.step(&snapshot(Label::ZoneA), at(0));
        seeker.step(&SensorSnapshot::BLANK, at(1000));
        assert!(!seeker.is_turning());

        // still blue after the turn: no second bounce
        seeker.step(&snapshot(Label::ZoneA), at(1035));
        assert!(!seeker.is_turning());
        assert_eq!(seeker.bounces, 1);
    }

    #[test]
    fn test_bounces_beyond_limit_restart() {
        let mut seeker = cruising(0);
        seeker.state = TargetState::SearchCenter;
        let mut now = 0;
        for _ in 0..3 {
            seeker.step(&snapshot(Label::ZoneA), at(now));
            now += 1000;
            seeker.step(&SensorSnapshot::BLANK, at(now));
            now += 35;
            seeker.step(&snapshot(Label::Unknown), at(now));
            assert_eq!(seeker.state(), TargetState::SearchCenter);
        }

        seeker.step(&snapshot(Label::ZoneA), at(now + 35));
        assert_eq!(seeker.state(), TargetState::MoveRandom);
        assert_eq!(seeker.restarts(), 1);
        assert_eq!(seeker.bounces, 0);
    }

    #[test]
    fn test_slow_crossing_restarts() {
        let mut seeker = cruising(0);
        seeker.state = TargetState::FoundFirstBlue;
        seeker.crossing_start = at(0);

        seeker.step(&snapshot(Label::Unknown), at(30_000));
        assert_eq!(seeker.state(), TargetState::FoundFirstBlue);
        seeker.step(&snapshot(Label::Unknown), at(30_001));
        assert_eq!(seeker.state(), TargetState::MoveRandom);
        assert_eq!(seeker.restarts(), 1);
    }

    #[test]
    fn test_green_search_times_out() {
        let mut seeker = cruising(0);
        assert_eq!(
            seeker.step(&snapshot(Label::ZoneB), at(100)),
            ActuatorDirective::forward(59)
        );
        assert_eq!(seeker.state(), TargetState::GreenZone);

        seeker.step(&snapshot(Label::ZoneA), at(15_000));
        assert_eq!(seeker.state(), TargetState::GreenZone);

        seeker.step(&snapshot(Label::Unknown), at(15_100));
        assert_eq!(seeker.state(), TargetState::MoveRandom);
        assert_eq!(seeker.restarts(), 1);
    }

    #[test]
    fn test_complete_stays_stopped() {
        let mut seeker = cruising(0);
        seeker.step(&snapshot(Label::Path), at(0));
        assert_eq!(
            seeker.step(&snapshot(Label::ZoneB), at(100)),
            ActuatorDirective::Stop
        );
        assert_eq!(seeker.state(), TargetState::Complete);
    }
}
