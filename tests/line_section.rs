//! Line section runs through the line cycle with scripted sensors.

use course_robot::config::LineFollowConfig;
use course_robot::cycle::run_line_cycle;
use course_robot::directive::{DriveTrain, GripperPosition, Manipulator, TurnDirection};
use course_robot::line_follow::{LineFollowState, LineFollower};
use course_robot::range::Range;
use course_robot::sensor::{Label, Proximity, SensorSuite};
use embassy_futures::block_on;

struct ScriptedSensors {
    label: Label,
    proximity: Proximity,
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
        self.proximity
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

#[derive(Default)]
struct GripLog(Vec<GripperPosition>);

impl Manipulator for GripLog {
    fn set(&mut self, position: GripperPosition) {
        self.0.push(position);
    }
}

struct Run {
    follower: LineFollower,
    sensors: ScriptedSensors,
    wheels: WheelLog,
    grips: GripLog,
}

impl Run {
    fn new() -> Self {
        Self {
            follower: LineFollower::new(LineFollowConfig::DEFAULT),
            sensors: ScriptedSensors {
                label: Label::Path,
                proximity: Proximity::default(),
                reads: 0,
            },
            wheels: WheelLog::default(),
            grips: GripLog::default(),
        }
    }

    fn cycle(&mut self) -> (LineFollowState, LineFollowState) {
        block_on(run_line_cycle(
            &mut self.follower,
            &mut self.sensors,
            &mut self.wheels,
            &mut self.grips,
        ))
    }
}

#[test]
fn test_drift_right_is_corrected_left() {
    let mut run = Run::new();
    assert_eq!(run.cycle(), (LineFollowState::Forward, LineFollowState::Forward));

    // robot drifted right, the line is now under the left sensor
    run.sensors.label = Label::Unknown;
    run.sensors.proximity = Proximity {
        left: true,
        right: false,
    };
    assert_eq!(run.cycle(), (LineFollowState::Forward, LineFollowState::CorrectLeft));
    run.cycle();

    run.sensors.label = Label::Path;
    assert_eq!(run.cycle(), (LineFollowState::CorrectLeft, LineFollowState::Forward));

    assert_eq!(
        run.wheels.0,
        vec![
            Wheels::Drive(59, 59),
            Wheels::Pivot(TurnDirection::Left, 47),
            Wheels::Pivot(TurnDirection::Left, 47),
            Wheels::Drive(59, 59),
        ]
    );
    assert!(run.grips.0.is_empty());
}

#[test]
fn test_stopped_follower_reads_no_sensors() {
    let mut run = Run::new();
    run.follower.stop();
    for _ in 0..10 {
        run.cycle();
    }
    assert_eq!(run.sensors.reads, 0);
    assert!(run.wheels.0.iter().all(|w| *w == Wheels::Stop));

    run.follower.resume();
    run.cycle();
    assert_eq!(run.sensors.reads, 1);
    assert_eq!(run.wheels.0.last(), Some(&Wheels::Drive(59, 59)));
}
