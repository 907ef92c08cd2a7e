//! Controller configuration
//!
//! All tunables are compile-time constants. The firmware picks the
//! `DEFAULT` configs and validates them once when a section starts; there is
//! no runtime reconfiguration.
//!
//! Speeds are signed percent of full PWM, durations are embassy durations,
//! distances are centimeters.

use embassy_time::Duration;
use thiserror::Error;

use crate::color::ColorMap;

/// Rejected configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    #[error("speed {0} is outside 0..=100")]
    SpeedOutOfRange(i8),
    #[error("arc inner wheel must run slower than the outer wheel")]
    ArcNotCurved,
    #[error("obstacle threshold must be above zero")]
    ZeroThreshold,
    #[error("durations must be above zero")]
    ZeroDuration,
    #[error("gripper open and closed angles coincide")]
    GripperAnglesEqual,
    #[error("color map has no usable path color")]
    InconsistentColorMap,
}

/// Obstacle course tunables
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavigationConfig {
    /// Objects closer than this (cm) trigger a dodge
    pub obstacle_threshold_cm: u16,
    /// Path following and clearing speed
    pub cruise_speed: i8,
    /// Careful speed for back-offs and failsafe steps
    pub slow_speed: i8,
    /// Pivot speed for dodges and failsafe turns
    pub turn_speed: i8,
    /// Arc recovery, slow wheel
    pub arc_inner_speed: i8,
    /// Arc recovery, fast wheel
    pub arc_outer_speed: i8,
    /// Dodge pivot length
    pub dodge_turn: Duration,
    /// Forward drive after the dodge so the rear wheels clear the obstacle
    pub clear_forward: Duration,
    /// Arc time allowed before the failsafe search takes over
    pub recovery_timeout: Duration,
    /// First failsafe pivot length
    pub failsafe_turn: Duration,
    /// Added to the failsafe pivot every second pivot
    pub failsafe_widen: Duration,
    /// Failsafe forward step length
    pub failsafe_forward: Duration,
    /// Last failsafe attempt index before falling back to the arc
    pub failsafe_max_attempts: u8,
    /// Failsafe exhaustions tolerated before giving up; `None` retries forever
    pub recovery_round_limit: Option<u8>,
    /// Drop-offs after which the run is complete; `None` keeps going
    pub drop_off_quota: Option<u8>,
    /// Settle time after opening the gripper before a grasp
    pub release_settle: Duration,
    /// Settle time after opening the gripper to drop the payload
    pub drop_settle: Duration,
    /// Settle time after closing the gripper
    pub grasp_settle: Duration,
    /// Reverse drive after a manipulation
    pub back_off: Duration,
    /// Color to label mapping for this section
    pub colors: ColorMap,
}

impl NavigationConfig {
    pub const DEFAULT: Self = Self {
        obstacle_threshold_cm: 16,
        cruise_speed: 59,
        slow_speed: 45,
        turn_speed: 47,
        arc_inner_speed: 41,
        arc_outer_speed: 63,
        dodge_turn: Duration::from_millis(280),
        clear_forward: Duration::from_millis(520),
        recovery_timeout: Duration::from_millis(1200),
        failsafe_turn: Duration::from_millis(160),
        failsafe_widen: Duration::from_millis(40),
        failsafe_forward: Duration::from_millis(200),
        failsafe_max_attempts: 7,
        recovery_round_limit: None,
        drop_off_quota: None,
        release_settle: Duration::from_millis(300),
        drop_settle: Duration::from_millis(500),
        grasp_settle: Duration::from_millis(500),
        back_off: Duration::from_millis(200),
        colors: ColorMap::OBSTACLE_COURSE,
    };

    /// Checks the tunables for values the controller cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for speed in [
            self.cruise_speed,
            self.slow_speed,
            self.turn_speed,
            self.arc_inner_speed,
            self.arc_outer_speed,
        ] {
            check_speed(speed)?;
        }

        if self.arc_inner_speed >= self.arc_outer_speed {
            return Err(ConfigError::ArcNotCurved);
        }

        if self.obstacle_threshold_cm == 0 {
            return Err(ConfigError::ZeroThreshold);
        }

        let durations = [
            self.dodge_turn,
            self.clear_forward,
            self.recovery_timeout,
            self.failsafe_turn,
            self.failsafe_forward,
            self.release_settle,
            self.drop_settle,
            self.grasp_settle,
            self.back_off,
        ];
        if durations.iter().any(|d| *d == Duration::from_ticks(0)) {
            return Err(ConfigError::ZeroDuration);
        }

        if !self.colors.is_consistent() {
            return Err(ConfigError::InconsistentColorMap);
        }

        Ok(())
    }

    /// Pivot length of a failsafe attempt; widens every second pivot
    pub fn failsafe_turn_for(&self, attempt: u8) -> Duration {
        self.failsafe_turn + self.failsafe_widen * u32::from(attempt / 2)
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Line section tunables
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineFollowConfig {
    /// Forward speed on the line
    pub line_speed: i8,
    /// Pivot speed while correcting
    pub correction_speed: i8,
    /// Color to label mapping for this section
    pub colors: ColorMap,
}

impl LineFollowConfig {
    pub const DEFAULT: Self = Self {
        line_speed: 59,
        correction_speed: 47,
        colors: ColorMap::LINE_SECTION,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_speed(self.line_speed)?;
        check_speed(self.correction_speed)?;
        if !self.colors.is_consistent() {
            return Err(ConfigError::InconsistentColorMap);
        }
        Ok(())
    }
}

impl Default for LineFollowConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Target section tunables
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TargetConfig {
    /// Forward speed while searching
    pub drive_speed: i8,
    /// Pivot speed for timed turns
    pub turn_speed: i8,
    /// Pivot length of a quarter turn
    pub turn_90: Duration,
    /// Pivot length of a half turn
    pub turn_180: Duration,
    /// Longest crossing from one blue margin to the other before starting over
    pub crossing_timeout: Duration,
    /// Search time inside the green circle before starting over
    pub green_timeout: Duration,
    /// Blue margins hit while searching the center before starting over
    pub max_bounces: u8,
    /// Color to label mapping for this section
    pub colors: ColorMap,
}

impl TargetConfig {
    pub const DEFAULT: Self = Self {
        drive_speed: 59,
        turn_speed: 47,
        turn_90: Duration::from_millis(500),
        turn_180: Duration::from_millis(1000),
        crossing_timeout: Duration::from_secs(30),
        green_timeout: Duration::from_secs(15),
        max_bounces: 3,
        colors: ColorMap::TARGET,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_speed(self.drive_speed)?;
        check_speed(self.turn_speed)?;

        let durations = [
            self.turn_90,
            self.turn_180,
            self.crossing_timeout,
            self.green_timeout,
        ];
        if durations.iter().any(|d| *d == Duration::from_ticks(0)) {
            return Err(ConfigError::ZeroDuration);
        }

        if !self.colors.is_consistent() {
            return Err(ConfigError::InconsistentColorMap);
        }
        Ok(())
    }
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Gripper servo tunables
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GripperConfig {
    /// Servo angle (degrees) of the open claw
    pub open_angle: f32,
    /// Servo angle (degrees) of the closed claw
    pub closed_angle: f32,
}

impl GripperConfig {
    pub const DEFAULT: Self = Self {
        open_angle: 20.0,
        closed_angle: 90.0,
    };

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.open_angle == self.closed_angle {
            return Err(ConfigError::GripperAnglesEqual);
        }
        Ok(())
    }
}

impl Default for GripperConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn check_speed(speed: i8) -> Result<(), ConfigError> {
    if (0..=100).contains(&speed) {
        Ok(())
    } else {
        Err(ConfigError::SpeedOutOfRange(speed))
    }
}
