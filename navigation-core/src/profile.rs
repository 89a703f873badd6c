//! Manoeuvre constants for the obstacle-recovery protocol.
//!
//! The profile is a `const` value so firmware builds bake it into flash.
//! Host tooling may swap in a different profile through
//! [`NavigationStatechart::with_profile`].
//!
//! [`NavigationStatechart::with_profile`]: crate::statechart::NavigationStatechart::with_profile

use core::fmt;

use crate::sensors::BumpSide;

/// Distance the robot reverses away from an obstacle before turning.
pub const BACK_OFF_MM: u32 = 50;
/// Forward leg driven after the first corrective turn to measure clearance.
pub const CLEARANCE_LEG_MM: u32 = 500;
/// Forward leg that carries the robot past the obstacle.
pub const OBSTACLE_PASS_MM: u32 = 600;
/// Right turn scheduled when both bumpers close.
pub const BOTH_BUMP_TURN_DEG: u32 = 90;
/// Right turn scheduled when only the left bumper closes.
pub const LEFT_BUMP_TURN_DEG: u32 = 30;
/// Right turn scheduled when only the right bumper closes.
pub const RIGHT_BUMP_TURN_DEG: u32 = 145;
/// Idle value of both scheduled turns.
pub const DEFAULT_TURN_DEG: u32 = 90;

const FULL_TURN_DEG: u32 = 360;

/// Thresholds and turn magnitudes used by the run region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ManeuverProfile {
    pub back_off_mm: u32,
    pub clearance_leg_mm: u32,
    pub obstacle_pass_mm: u32,
    pub both_bump_turn_deg: u32,
    pub left_bump_turn_deg: u32,
    pub right_bump_turn_deg: u32,
    pub default_turn_deg: u32,
}

/// Thresholds used on the Create unless a caller supplies its own.
pub const DEFAULT_PROFILE: ManeuverProfile = ManeuverProfile::new();

impl ManeuverProfile {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            back_off_mm: BACK_OFF_MM,
            clearance_leg_mm: CLEARANCE_LEG_MM,
            obstacle_pass_mm: OBSTACLE_PASS_MM,
            both_bump_turn_deg: BOTH_BUMP_TURN_DEG,
            left_bump_turn_deg: LEFT_BUMP_TURN_DEG,
            right_bump_turn_deg: RIGHT_BUMP_TURN_DEG,
            default_turn_deg: DEFAULT_TURN_DEG,
        }
    }

    /// Right-turn magnitude scheduled for a collision on `side`.
    #[must_use]
    pub const fn turn_for(&self, side: BumpSide) -> u32 {
        match side {
            BumpSide::Both => self.both_bump_turn_deg,
            BumpSide::Left => self.left_bump_turn_deg,
            BumpSide::Right => self.right_bump_turn_deg,
        }
    }

    /// Current value of one tunable.
    #[must_use]
    pub const fn get(&self, field: ProfileField) -> u32 {
        match field {
            ProfileField::BackOff => self.back_off_mm,
            ProfileField::ClearanceLeg => self.clearance_leg_mm,
            ProfileField::ObstaclePass => self.obstacle_pass_mm,
            ProfileField::BothBumpTurn => self.both_bump_turn_deg,
            ProfileField::LeftBumpTurn => self.left_bump_turn_deg,
            ProfileField::RightBumpTurn => self.right_bump_turn_deg,
            ProfileField::DefaultTurn => self.default_turn_deg,
        }
    }

    /// Copy of `self` with one tunable replaced. The result is not validated.
    #[must_use]
    pub const fn with(mut self, field: ProfileField, value: u32) -> Self {
        match field {
            ProfileField::BackOff => self.back_off_mm = value,
            ProfileField::ClearanceLeg => self.clearance_leg_mm = value,
            ProfileField::ObstaclePass => self.obstacle_pass_mm = value,
            ProfileField::BothBumpTurn => self.both_bump_turn_deg = value,
            ProfileField::LeftBumpTurn => self.left_bump_turn_deg = value,
            ProfileField::RightBumpTurn => self.right_bump_turn_deg = value,
            ProfileField::DefaultTurn => self.default_turn_deg = value,
        }
        self
    }

    /// Checks that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] naming the first field that is zero or, for
    /// angles, larger than a full revolution.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for field in ProfileField::ALL {
            let value = self.get(field);
            if field.is_angle() {
                if value == 0 || value > FULL_TURN_DEG {
                    return Err(ProfileError::AngleOutOfRange {
                        field: field.name(),
                        value,
                    });
                }
            } else if value == 0 {
                return Err(ProfileError::ZeroDistance {
                    field: field.name(),
                });
            }
        }

        Ok(())
    }
}

impl Default for ManeuverProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// One tunable of a [`ManeuverProfile`], named as the console spells it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProfileField {
    BackOff,
    ClearanceLeg,
    ObstaclePass,
    BothBumpTurn,
    LeftBumpTurn,
    RightBumpTurn,
    DefaultTurn,
}

impl ProfileField {
    /// Distances first, then angles; `validate` reports in this order.
    pub const ALL: [ProfileField; 7] = [
        ProfileField::BackOff,
        ProfileField::ClearanceLeg,
        ProfileField::ObstaclePass,
        ProfileField::BothBumpTurn,
        ProfileField::LeftBumpTurn,
        ProfileField::RightBumpTurn,
        ProfileField::DefaultTurn,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ProfileField::BackOff => "back_off_mm",
            ProfileField::ClearanceLeg => "clearance_leg_mm",
            ProfileField::ObstaclePass => "obstacle_pass_mm",
            ProfileField::BothBumpTurn => "both_bump_turn_deg",
            ProfileField::LeftBumpTurn => "left_bump_turn_deg",
            ProfileField::RightBumpTurn => "right_bump_turn_deg",
            ProfileField::DefaultTurn => "default_turn_deg",
        }
    }

    #[must_use]
    pub const fn is_angle(self) -> bool {
        !matches!(
            self,
            ProfileField::BackOff | ProfileField::ClearanceLeg | ProfileField::ObstaclePass
        )
    }

    /// Case-insensitive lookup by [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.name().eq_ignore_ascii_case(name))
    }
}

/// Reasons a [`ManeuverProfile`] is rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProfileError {
    ZeroDistance { field: &'static str },
    AngleOutOfRange { field: &'static str, value: u32 },
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::ZeroDistance { field } => write!(f, "{field} must be non-zero"),
            ProfileError::AngleOutOfRange { field, value } => {
                write!(f, "{field}={value} outside 1..={FULL_TURN_DEG} degrees")
            }
        }
    }
}
