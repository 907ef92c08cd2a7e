//! Sensor adapters
//!
//! Hardware behind the controllers' [`SensorSuite`]. Every physical wait is
//! bounded by [`PULSE_TIMEOUT`]; a reading that times out resolves to
//! "unknown" or "clear" so a cycle never hangs on a sensor.
//!
//! # Color Sensor
//! - TCS3200 with output frequency scaled to 20%
//! - One low pulse is timed per color filter; shorter means stronger
//! - Periods are classified into a color, the section's color map turns
//!   the color into a label
//!
//! # Range Sensor
//! - HC-SR04, 10µs trigger pulse, echo timed in microseconds
//! - Moving median over the last 3 valid readings
//! - No echo or echo beyond the sensor's range reads as clear
//!
//! # Line Sensors
//! - Two digital IR sensors, pulled low while they see the line

use crate::system::resources::{ColorSensorResources, LineSensorResources, RangeSensorResources};
use course_robot::color::{self, Color, ColorMap, ColorPeriods, BLACK_THRESHOLD_US};
use course_robot::range::Range;
use course_robot::sensor::{Label, Proximity, SensorSuite};
use defmt::trace;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use moving_median::MovingMedian;

/// Longest wait for a single sensor pulse; covers the range sensor's 400cm
pub const PULSE_TIMEOUT: Duration = Duration::from_millis(25);

/// Settle time after switching the color filter
const FILTER_SETTLE: Duration = Duration::from_millis(5);

/// Width of the ultrasonic trigger pulse
const TRIGGER_PULSE: Duration = Duration::from_micros(10);

/// Size of median filter window
const MEDIAN_WINDOW_SIZE: usize = 3;

/// Photodiode filter of the TCS3200
#[derive(Clone, Copy)]
enum Filter {
    Red,
    Green,
    Blue,
}

impl Filter {
    /// S2/S3 levels selecting the filter
    fn select_levels(self) -> (Level, Level) {
        match self {
            Filter::Red => (Level::Low, Level::Low),
            Filter::Green => (Level::High, Level::High),
            Filter::Blue => (Level::Low, Level::High),
        }
    }
}

/// TCS3200 color sensor
pub struct ColorSensor<'d> {
    // scaling pins only need to stay driven
    _s0: Output<'d>,
    _s1: Output<'d>,
    s2: Output<'d>,
    s3: Output<'d>,
    out: Input<'d>,
}

impl ColorSensor<'static> {
    pub fn new(r: ColorSensorResources) -> Self {
        Self {
            _s0: Output::new(r.s0_pin, Level::High),
            _s1: Output::new(r.s1_pin, Level::Low),
            s2: Output::new(r.s2_pin, Level::Low),
            s3: Output::new(r.s3_pin, Level::Low),
            out: Input::new(r.out_pin, Pull::None),
        }
    }
}

impl ColorSensor<'_> {
    /// Reads all three filters; timed out filters read 0
    pub async fn read_periods(&mut self) -> ColorPeriods {
        let red = self.read_filter(Filter::Red).await;
        let green = self.read_filter(Filter::Green).await;
        let blue = self.read_filter(Filter::Blue).await;
        ColorPeriods { red, green, blue }
    }

    async fn read_filter(&mut self, filter: Filter) -> u32 {
        let (s2, s3) = filter.select_levels();
        self.s2.set_level(s2);
        self.s3.set_level(s3);
        Timer::after(FILTER_SETTLE).await;

        let out = &mut self.out;
        let pulse = async {
            // start on a falling edge so the whole low phase is timed
            out.wait_for_high().await;
            out.wait_for_low().await;
            let start = Instant::now();
            out.wait_for_high().await;
            start.elapsed().as_micros() as u32
        };
        with_timeout(PULSE_TIMEOUT, pulse).await.unwrap_or(0)
    }
}

/// HC-SR04 ultrasonic range sensor
pub struct RangeSensor<'d> {
    trigger: Output<'d>,
    echo: Input<'d>,
    median_filter: MovingMedian<f64, MEDIAN_WINDOW_SIZE>,
}

impl RangeSensor<'static> {
    pub fn new(r: RangeSensorResources) -> Self {
        Self {
            trigger: Output::new(r.trigger_pin, Level::Low),
            echo: Input::new(r.echo_pin, Pull::None),
            median_filter: MovingMedian::<f64, MEDIAN_WINDOW_SIZE>::new(),
        }
    }
}

impl RangeSensor<'_> {
    /// Measures and filters; a missing echo reads clear without touching the filter
    pub async fn measure(&mut self) -> Range {
        self.trigger.set_high();
        Timer::after(TRIGGER_PULSE).await;
        self.trigger.set_low();

        let echo = &mut self.echo;
        let round_trip = async {
            echo.wait_for_high().await;
            let start = Instant::now();
            echo.wait_for_low().await;
            start.elapsed().as_micros() as u32
        };
        let echo_us = with_timeout(PULSE_TIMEOUT, round_trip).await.unwrap_or(0);

        match Range::from_echo(echo_us) {
            Range::Distance(cm) => {
                self.median_filter.add_value(f64::from(cm));
                Range::Distance(self.median_filter.median() as u16)
            }
            Range::Clear => Range::Clear,
        }
    }
}

/// IR line sensor pair
pub struct LineSensors<'d> {
    left: Input<'d>,
    right: Input<'d>,
}

impl LineSensors<'static> {
    pub fn new(r: LineSensorResources) -> Self {
        Self {
            left: Input::new(r.left_pin, Pull::None),
            right: Input::new(r.right_pin, Pull::None),
        }
    }
}

impl LineSensors<'_> {
    pub fn read(&self) -> Proximity {
        Proximity {
            left: self.left.is_low(),
            right: self.right.is_low(),
        }
    }
}

/// All sensors of the robot, labelled with the running section's color map
pub struct CourseSensors<'d> {
    color: ColorSensor<'d>,
    range: RangeSensor<'d>,
    line: LineSensors<'d>,
    colors: ColorMap,
}

impl<'d> CourseSensors<'d> {
    pub fn new(color: ColorSensor<'d>, range: RangeSensor<'d>, line: LineSensors<'d>) -> Self {
        Self {
            color,
            range,
            line,
            colors: ColorMap::OBSTACLE_COURSE,
        }
    }

    /// Switches the color map when another section starts
    pub fn set_colors(&mut self, colors: ColorMap) {
        self.colors = colors;
    }
}

impl SensorSuite for CourseSensors<'_> {
    async fn current_color(&mut self) -> Label {
        let periods = self.color.read_periods().await;
        let color: Color = color::classify(periods, BLACK_THRESHOLD_US);
        trace!(
            "periods R={} G={} B={} -> {}",
            periods.red,
            periods.green,
            periods.blue,
            color
        );
        self.colors.label(color)
    }

    async fn current_range(&mut self) -> Range {
        self.range.measure().await
    }

    async fn current_proximity(&mut self) -> Proximity {
        self.line.read()
    }
}
