//! Persistent manoeuvre bookkeeping carried between control cycles.

use crate::profile::ManeuverProfile;
use crate::sensors::Odometry;

use super::OperatingState;

/// Stage of the obstacle-recovery protocol.
///
/// Each variant stands for exactly one combination of the bump / passed /
/// drive-for-adjustment / time-to-adjust-angle flags, so only combinations
/// reachable from a parked chart with idle memory can be represented.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum RecoveryPhase {
    /// No obstacle is being handled.
    #[default]
    Idle,
    /// A collision is pending resolution: backing off, or skirting the
    /// obstacle after the clearance leg.
    Avoiding,
    /// Forward clearance leg after the first corrective turn; its length becomes
    /// the clearance distance.
    MeasuringClearance,
    /// Clearance leg armed by a right turn that finished with no collision
    /// pending, as when the chart is parked in `TurnRight`.
    ClearanceArmed,
    /// Obstacle cleared; drive the clearance distance, then correct heading.
    Passed,
    /// A fresh collision arrived while a heading correction was still owed.
    PassedAndBumped,
    /// Final corrective right turn is under way.
    Realigning,
}

impl RecoveryPhase {
    /// A collision is currently being handled.
    #[must_use]
    pub const fn bump(self) -> bool {
        matches!(
            self,
            RecoveryPhase::Avoiding
                | RecoveryPhase::MeasuringClearance
                | RecoveryPhase::PassedAndBumped
        )
    }

    /// The robot believes it has cleared the obstacle.
    #[must_use]
    pub const fn passed(self) -> bool {
        matches!(
            self,
            RecoveryPhase::Passed | RecoveryPhase::PassedAndBumped | RecoveryPhase::Realigning
        )
    }

    /// The clearance-measuring forward leg is armed.
    #[must_use]
    pub const fn drive_for_adjustment(self) -> bool {
        matches!(
            self,
            RecoveryPhase::MeasuringClearance | RecoveryPhase::ClearanceArmed
        )
    }

    /// A heading-correction turn is due once the clearance distance is driven.
    #[must_use]
    pub const fn time_to_adjust_angle(self) -> bool {
        matches!(self, RecoveryPhase::Passed | RecoveryPhase::PassedAndBumped)
    }

    /// Short label used in status output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            RecoveryPhase::Idle => "idle",
            RecoveryPhase::Avoiding => "avoiding",
            RecoveryPhase::MeasuringClearance => "measuring-clearance",
            RecoveryPhase::ClearanceArmed => "clearance-armed",
            RecoveryPhase::Passed => "passed",
            RecoveryPhase::PassedAndBumped => "passed-and-bumped",
            RecoveryPhase::Realigning => "realigning",
        }
    }

    // `Realigning` only exists while turning right, where no collision rule
    // runs; it folds into `PassedAndBumped` so the next right turn still
    // finishes the recovery.
    pub(crate) const fn after_collision(self) -> Self {
        match self {
            RecoveryPhase::Idle | RecoveryPhase::Avoiding => RecoveryPhase::Avoiding,
            RecoveryPhase::MeasuringClearance | RecoveryPhase::ClearanceArmed => {
                RecoveryPhase::MeasuringClearance
            }
            RecoveryPhase::Passed | RecoveryPhase::PassedAndBumped | RecoveryPhase::Realigning => {
                RecoveryPhase::PassedAndBumped
            }
        }
    }

    /// Clears the clearance-leg flag and nothing else.
    pub(crate) const fn after_clearance_measured(self) -> Self {
        match self {
            RecoveryPhase::MeasuringClearance => RecoveryPhase::Avoiding,
            RecoveryPhase::ClearanceArmed => RecoveryPhase::Idle,
            other => other,
        }
    }

    /// Sets the clearance-leg flag and nothing else; a pending collision stays
    /// pending.
    pub(crate) const fn after_back_off_turn(self) -> Self {
        match self {
            RecoveryPhase::Idle | RecoveryPhase::ClearanceArmed => RecoveryPhase::ClearanceArmed,
            RecoveryPhase::Avoiding | RecoveryPhase::MeasuringClearance => {
                RecoveryPhase::MeasuringClearance
            }
            other => other,
        }
    }

    pub(crate) const fn after_left_turn(self) -> Self {
        self.after_clearance_measured()
    }
}

/// Scalars that survive between evaluations and steer the run region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ManeuverMemory {
    pub(crate) unpaused_state: OperatingState,
    pub(crate) distance_at_maneuver_start: i32,
    pub(crate) angle_at_maneuver_start: i32,
    pub(crate) phase: RecoveryPhase,
    pub(crate) right_turn_angle: u32,
    pub(crate) left_turn_angle: u32,
    pub(crate) distance: u32,
    pub(crate) angle: i32,
}

impl ManeuverMemory {
    /// Power-up defaults for the given profile.
    #[must_use]
    pub const fn new(profile: &ManeuverProfile) -> Self {
        Self {
            unpaused_state: OperatingState::Drive,
            distance_at_maneuver_start: 0,
            angle_at_maneuver_start: 0,
            phase: RecoveryPhase::Idle,
            right_turn_angle: profile.default_turn_deg,
            left_turn_angle: profile.default_turn_deg,
            distance: 0,
            angle: 0,
        }
    }

    /// Run-region state restored when the operator resumes.
    #[must_use]
    pub const fn unpaused_state(&self) -> OperatingState {
        self.unpaused_state
    }

    #[must_use]
    pub const fn distance_at_maneuver_start(&self) -> i32 {
        self.distance_at_maneuver_start
    }

    #[must_use]
    pub const fn angle_at_maneuver_start(&self) -> i32 {
        self.angle_at_maneuver_start
    }

    #[must_use]
    pub const fn phase(&self) -> RecoveryPhase {
        self.phase
    }

    #[must_use]
    pub const fn bump(&self) -> bool {
        self.phase.bump()
    }

    #[must_use]
    pub const fn passed(&self) -> bool {
        self.phase.passed()
    }

    #[must_use]
    pub const fn drive_for_adjustment(&self) -> bool {
        self.phase.drive_for_adjustment()
    }

    #[must_use]
    pub const fn time_to_adjust_angle(&self) -> bool {
        self.phase.time_to_adjust_angle()
    }

    /// Magnitude of the next scheduled right turn, in degrees.
    #[must_use]
    pub const fn right_turn_angle(&self) -> u32 {
        self.right_turn_angle
    }

    /// Magnitude of the next scheduled left turn, in degrees.
    #[must_use]
    pub const fn left_turn_angle(&self) -> u32 {
        self.left_turn_angle
    }

    /// Accumulated clearance distance to drive past the obstacle, in mm.
    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }

    /// Signed heading correction still owed (right turns positive), in degrees.
    #[must_use]
    pub const fn angle(&self) -> i32 {
        self.angle
    }

    /// Distance covered since the current manoeuvre segment started.
    #[must_use]
    pub const fn travelled(&self, odometry: Odometry) -> u32 {
        odometry
            .net_distance_mm
            .abs_diff(self.distance_at_maneuver_start)
    }

    /// Angle turned since the current manoeuvre segment started.
    #[must_use]
    pub const fn turned(&self, odometry: Odometry) -> u32 {
        odometry.net_angle_deg.abs_diff(self.angle_at_maneuver_start)
    }

    /// Starts a new manoeuvre segment at the current odometry reading.
    pub(crate) fn rebase(&mut self, odometry: Odometry) {
        self.distance_at_maneuver_start = odometry.net_distance_mm;
        self.angle_at_maneuver_start = odometry.net_angle_deg;
    }

    pub(crate) fn owe_right_turn(&mut self, degrees: u32) {
        self.right_turn_angle = degrees;
        self.angle = self.angle.saturating_add_unsigned(degrees);
    }

    pub(crate) fn owe_left_turn(&mut self) {
        self.angle = self.angle.saturating_sub_unsigned(self.left_turn_angle);
    }

    pub(crate) fn add_clearance(&mut self, travelled: u32) {
        self.distance = self.distance.saturating_add(travelled);
    }

    /// Returns the recovery protocol to its idle defaults. Segment start
    /// points and the pause history are left alone.
    pub(crate) fn reset_recovery(&mut self, profile: &ManeuverProfile) {
        self.phase = RecoveryPhase::Idle;
        self.right_turn_angle = profile.default_turn_deg;
        self.left_turn_angle = profile.default_turn_deg;
        self.distance = 0;
        self.angle = 0;
    }
}
