//! Target section runs through the target cycle on a simulated clock.

use course_robot::config::TargetConfig;
use course_robot::cycle::run_target_cycle;
use course_robot::directive::{DriveTrain, GripperPosition, Manipulator, TurnDirection};
use course_robot::range::Range;
use course_robot::sensor::{Label, Proximity, SensorSuite};
use course_robot::target::{Heading, TargetSeeker, TargetState};
use embassy_futures::block_on;
use embassy_time::{Duration, Instant};

const CYCLE: Duration = Duration::from_millis(35);

struct ScriptedSensors {
    label: Label,
    reads: usize,
}

impl SensorSuite for ScriptedSensors {
    async fn current_color(&mut self) -> Label {
        self.reads += 1;
        self.label
    }

    async fn current_range(&mut self) -> Range {
        Range::Clear
    }

    async fn current_proximity(&mut self) -> Proximity {
        Proximity::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Wheels {
    Drive(i8, i8),
    Pivot(TurnDirection, i8),
    Stop,
}

#[derive(Default)]
struct WheelLog(Vec<Wheels>);

impl DriveTrain for WheelLog {
    fn drive(&mut self, left: i8, right: i8) {
        self.0.push(Wheels::Drive(left, right));
    }

    fn pivot(&mut self, direction: TurnDirection, speed: i8) {
        self.0.push(Wheels::Pivot(direction, speed));
    }

    fn stop(&mut self) {
        self.0.push(Wheels::Stop);
    }
}

struct NoGripper;

impl Manipulator for NoGripper {
    fn set(&mut self, _position: GripperPosition) {
        panic!("the target section never moves the gripper");
    }
}

struct Run {
    seeker: TargetSeeker,
    sensors: ScriptedSensors,
    wheels: WheelLog,
    now: Instant,
}

impl Run {
    fn new(seed: u64) -> Self {
        let now = Instant::from_millis(0);
        Self {
            seeker: TargetSeeker::new(TargetConfig::DEFAULT, seed, now),
            sensors: ScriptedSensors {
                label: Label::Unknown,
                reads: 0,
            },
            wheels: WheelLog::default(),
            now,
        }
    }

    /// First seed whose heading starts with a pivot
    fn turning() -> Self {
        (0..)
            .map(Run::new)
            .find(|run| run.seeker.heading() != Heading::Forward)
            .unwrap()
    }

    fn cycle(&mut self) -> (TargetState, TargetState) {
        let now = self.now;
        let states = block_on(run_target_cycle(
            &mut self.seeker,
            &mut self.sensors,
            &mut self.wheels,
            &mut NoGripper,
            || now,
        ));
        self.now += CYCLE;
        states
    }
}

#[test]
fn test_sensors_idle_while_turning() {
    let mut run = Run::turning();
    while run.seeker.is_turning() {
        run.cycle();
        assert!(run.now < Instant::from_millis(1100));
    }
    assert_eq!(run.sensors.reads, 0);
    assert!(matches!(run.wheels.0.first(), Some(Wheels::Pivot(_, 47))));
    assert_eq!(run.wheels.0.last(), Some(&Wheels::Drive(59, 59)));

    run.cycle();
    assert_eq!(run.sensors.reads, 1);
}

#[test]
fn test_box_ends_the_run() {
    let mut run = Run::new(3);
    for _ in 0..40 {
        run.cycle();
    }
    assert_eq!(run.seeker.state(), TargetState::MoveRandom);

    run.sensors.label = Label::Path;
    assert_eq!(run.cycle(), (TargetState::MoveRandom, TargetState::Complete));
    assert_eq!(run.wheels.0.last(), Some(&Wheels::Stop));

    let reads = run.sensors.reads;
    for _ in 0..10 {
        assert_eq!(run.cycle(), (TargetState::Complete, TargetState::Complete));
    }
    assert_eq!(run.sensors.reads, reads);
    assert!(run.wheels.0.iter().rev().take(10).all(|w| *w == Wheels::Stop));
}

#[test]
fn test_margin_turns_around_before_crossing() {
    let mut run = Run::new(3);
    while run.seeker.is_turning() {
        run.cycle();
    }

    run.sensors.label = Label::ZoneA;
    assert_eq!(
        run.cycle(),
        (TargetState::MoveRandom, TargetState::FoundFirstBlue)
    );
    assert_eq!(
        run.wheels.0.last(),
        Some(&Wheels::Pivot(TurnDirection::Right, 47))
    );

    // half turn is timed, the margin under the robot is not read again
    let reads = run.sensors.reads;
    while run.seeker.is_turning() {
        run.cycle();
    }
    assert_eq!(run.sensors.reads, reads);
    assert_eq!(run.seeker.state(), TargetState::FoundFirstBlue);
}
