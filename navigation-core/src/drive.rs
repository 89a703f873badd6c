//! Wheel-speed commands produced by the statechart.
//!
//! Speeds are fixed magnitudes selected purely from the operating state; there
//! is no velocity control loop.

use core::fmt;

use crate::statechart::OperatingState;

/// Forward cruising speed, in mm/s.
pub const DRIVE_SPEED: i16 = 150;
/// Wheel speed used while spinning in place, in mm/s.
pub const TURN_SPEED: i16 = 100;
/// Reverse speed while backing away from an obstacle, in mm/s.
pub const BACK_SPEED: i16 = 100;

/// Left/right wheel command pair in device speed units (mm/s on the Create).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct WheelSpeeds {
    pub left: i16,
    pub right: i16,
}

impl WheelSpeeds {
    pub const HALT: Self = Self::new(0, 0);
    pub const FORWARD: Self = Self::new(DRIVE_SPEED, DRIVE_SPEED);
    pub const SPIN_RIGHT: Self = Self::new(TURN_SPEED, -TURN_SPEED);
    pub const SPIN_LEFT: Self = Self::new(-TURN_SPEED, TURN_SPEED);
    pub const REVERSE: Self = Self::new(-BACK_SPEED, -BACK_SPEED);

    #[must_use]
    pub const fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Returns `true` when both wheels are commanded to stand still.
    #[must_use]
    pub const fn is_halted(self) -> bool {
        self.left == 0 && self.right == 0
    }
}

impl fmt::Display for WheelSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L={} R={}", self.left, self.right)
    }
}

/// Maps an operating state to its wheel command.
#[must_use]
pub const fn wheel_speeds(state: OperatingState) -> WheelSpeeds {
    match state {
        OperatingState::Drive => WheelSpeeds::FORWARD,
        OperatingState::TurnRight => WheelSpeeds::SPIN_RIGHT,
        OperatingState::TurnLeft => WheelSpeeds::SPIN_LEFT,
        OperatingState::Back => WheelSpeeds::REVERSE,
        OperatingState::Initial
        | OperatingState::PauseWaitButtonRelease
        | OperatingState::UnpauseWaitButtonPress
        | OperatingState::UnpauseWaitButtonRelease
        | OperatingState::Stop => WheelSpeeds::HALT,
    }
}

/// Maps a raw state code (as stored in telemetry or status cells) to a wheel
/// command. Codes that name no state halt the robot.
#[must_use]
pub fn wheel_speeds_for_code(code: u8) -> WheelSpeeds {
    OperatingState::from_raw(code).map_or(WheelSpeeds::HALT, wheel_speeds)
}
