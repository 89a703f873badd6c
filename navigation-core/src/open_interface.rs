//! iRobot Create Open Interface wire codec.
//!
//! Only the subset the navigator needs is covered: mode entry, the sensor
//! group 6 request/response, and direct wheel drive. All multi-byte fields
//! are big-endian on the wire.

use core::fmt;

use crate::drive::WheelSpeeds;
use crate::sensors::SensorSnapshot;

pub const START: u8 = 128;
pub const SAFE: u8 = 131;
pub const FULL: u8 = 132;
pub const SENSORS: u8 = 142;
pub const DRIVE_DIRECT: u8 = 145;

/// Sensor group carrying every packet from 7 through 42.
pub const SENSOR_GROUP_6: u8 = 6;
pub const SENSOR_GROUP_6_LEN: usize = 52;

/// Serial rate the Create uses after power-up.
pub const BAUD_RATE: u32 = 57_600;

const BUMPS_OFFSET: usize = 0;
const WALL_OFFSET: usize = 1;
const BUTTONS_OFFSET: usize = 11;
const DISTANCE_OFFSET: usize = 12;
const ANGLE_OFFSET: usize = 14;
const VOLTAGE_OFFSET: usize = 17;
const CHARGE_OFFSET: usize = 22;
const CAPACITY_OFFSET: usize = 24;
const MODE_OFFSET: usize = 40;

const BUMP_RIGHT: u8 = 1 << 0;
const BUMP_LEFT: u8 = 1 << 1;
const WHEEL_DROP_MASK: u8 = 0b0001_1100;
const BUTTON_PLAY: u8 = 1 << 0;
const BUTTON_ADVANCE: u8 = 1 << 2;

/// Puts the Create into full mode so bump and cliff safety stops do not
/// interfere with the navigator.
#[must_use]
pub const fn start_sequence() -> [u8; 2] {
    [START, FULL]
}

#[must_use]
pub const fn request_sensors() -> [u8; 2] {
    [SENSORS, SENSOR_GROUP_6]
}

/// Encodes a direct drive command: right wheel first, then left.
#[must_use]
pub const fn drive_direct(speeds: WheelSpeeds) -> [u8; 5] {
    let right = speeds.right.to_be_bytes();
    let left = speeds.left.to_be_bytes();
    [DRIVE_DIRECT, right[0], right[1], left[0], left[1]]
}

/// Operating mode reported in packet 35.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OiMode {
    Off,
    Passive,
    Safe,
    Full,
}

impl OiMode {
    /// # Errors
    ///
    /// Returns [`OiError::UnknownMode`] for codes above 3.
    pub const fn from_raw(code: u8) -> Result<Self, OiError> {
        match code {
            0 => Ok(OiMode::Off),
            1 => Ok(OiMode::Passive),
            2 => Ok(OiMode::Safe),
            3 => Ok(OiMode::Full),
            other => Err(OiError::UnknownMode(other)),
        }
    }
}

/// Decoded sensor group 6 response.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SensorFrame {
    pub bump_left: bool,
    pub bump_right: bool,
    pub wheel_drop: bool,
    pub wall: bool,
    pub play_button: bool,
    pub advance_button: bool,
    /// Distance travelled since the previous request, in mm.
    pub distance_delta_mm: i16,
    /// Heading change since the previous request, in degrees (CCW positive).
    pub angle_delta_deg: i16,
    pub voltage_mv: u16,
    pub charge_mah: u16,
    pub capacity_mah: u16,
    pub mode: OiMode,
}

impl SensorFrame {
    /// Decodes a group 6 response.
    ///
    /// # Errors
    ///
    /// Returns [`OiError::Truncated`] when fewer than
    /// [`SENSOR_GROUP_6_LEN`] bytes are supplied and
    /// [`OiError::UnknownMode`] when the mode byte is out of range.
    pub fn parse(bytes: &[u8]) -> Result<Self, OiError> {
        let Some(frame) = bytes.get(..SENSOR_GROUP_6_LEN) else {
            return Err(OiError::Truncated {
                expected: SENSOR_GROUP_6_LEN,
                found: bytes.len(),
            });
        };

        let bumps = frame[BUMPS_OFFSET];
        let buttons = frame[BUTTONS_OFFSET];

        Ok(Self {
            bump_left: bumps & BUMP_LEFT != 0,
            bump_right: bumps & BUMP_RIGHT != 0,
            wheel_drop: bumps & WHEEL_DROP_MASK != 0,
            wall: frame[WALL_OFFSET] != 0,
            play_button: buttons & BUTTON_PLAY != 0,
            advance_button: buttons & BUTTON_ADVANCE != 0,
            distance_delta_mm: read_i16(frame, DISTANCE_OFFSET),
            angle_delta_deg: read_i16(frame, ANGLE_OFFSET),
            voltage_mv: read_u16(frame, VOLTAGE_OFFSET),
            charge_mah: read_u16(frame, CHARGE_OFFSET),
            capacity_mah: read_u16(frame, CAPACITY_OFFSET),
            mode: OiMode::from_raw(frame[MODE_OFFSET])?,
        })
    }

    /// Inputs the statechart reads; the Play button doubles as the pause button.
    #[must_use]
    pub const fn snapshot(&self) -> SensorSnapshot {
        SensorSnapshot {
            bump_left: self.bump_left,
            bump_right: self.bump_right,
            pause_button: self.play_button,
        }
    }
}

fn read_i16(frame: &[u8], offset: usize) -> i16 {
    i16::from_be_bytes([frame[offset], frame[offset + 1]])
}

fn read_u16(frame: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// Reasons a sensor response is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OiError {
    Truncated { expected: usize, found: usize },
    UnknownMode(u8),
}

impl fmt::Display for OiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OiError::Truncated { expected, found } => {
                write!(f, "sensor frame truncated: expected {expected} bytes, found {found}")
            }
            OiError::UnknownMode(code) => write!(f, "unknown OI mode {code}"),
        }
    }
}
