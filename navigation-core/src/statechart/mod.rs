//! Navigation statechart: one synchronous evaluation per control cycle.
//!
//! The chart has two disjoint regions. The pause region implements the
//! operator press/release protocol and always takes precedence; the run
//! region drives forward, backs away from collisions, and steers around the
//! obstacle before restoring the original heading. All persistent data lives
//! in [`NavigationStatechart`], which the caller constructs once and threads
//! through every [`NavigationStatechart::step`] call. Given the same chart and
//! the same [`CycleInput`], a step always produces the same output and the
//! same successor chart.

use core::fmt;

use crate::drive::{WheelSpeeds, wheel_speeds};
use crate::profile::{DEFAULT_PROFILE, ManeuverProfile};
use crate::sensors::{Acceleration, BumpSide, Odometry, SensorSnapshot};

pub mod maneuver;

pub use maneuver::{ManeuverMemory, RecoveryPhase};

/// Operating states of the navigation chart.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OperatingState {
    Initial,
    PauseWaitButtonRelease,
    UnpauseWaitButtonPress,
    UnpauseWaitButtonRelease,
    Drive,
    TurnLeft,
    TurnRight,
    /// Halt state with no automatic entry or exit.
    Stop,
    Back,
}

/// Region an [`OperatingState`] belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Region {
    Pause,
    Run,
}

impl OperatingState {
    /// Every state, ordered by raw code.
    pub const ALL: [OperatingState; 9] = [
        OperatingState::Initial,
        OperatingState::PauseWaitButtonRelease,
        OperatingState::UnpauseWaitButtonPress,
        OperatingState::UnpauseWaitButtonRelease,
        OperatingState::Drive,
        OperatingState::TurnLeft,
        OperatingState::TurnRight,
        OperatingState::Stop,
        OperatingState::Back,
    ];

    #[must_use]
    pub const fn region(self) -> Region {
        match self {
            OperatingState::Initial
            | OperatingState::PauseWaitButtonRelease
            | OperatingState::UnpauseWaitButtonPress
            | OperatingState::UnpauseWaitButtonRelease => Region::Pause,
            OperatingState::Drive
            | OperatingState::TurnLeft
            | OperatingState::TurnRight
            | OperatingState::Stop
            | OperatingState::Back => Region::Run,
        }
    }

    #[must_use]
    pub const fn is_paused(self) -> bool {
        matches!(self.region(), Region::Pause)
    }

    /// Encodes the state into a compact code for telemetry and status cells.
    #[must_use]
    pub const fn to_raw(self) -> u8 {
        match self {
            OperatingState::Initial => 0,
            OperatingState::PauseWaitButtonRelease => 1,
            OperatingState::UnpauseWaitButtonPress => 2,
            OperatingState::UnpauseWaitButtonRelease => 3,
            OperatingState::Drive => 4,
            OperatingState::TurnLeft => 5,
            OperatingState::TurnRight => 6,
            OperatingState::Stop => 7,
            OperatingState::Back => 8,
        }
    }

    /// Decodes a raw code, returning `None` for codes that name no state.
    #[must_use]
    pub const fn from_raw(code: u8) -> Option<Self> {
        match code {
            0 => Some(OperatingState::Initial),
            1 => Some(OperatingState::PauseWaitButtonRelease),
            2 => Some(OperatingState::UnpauseWaitButtonPress),
            3 => Some(OperatingState::UnpauseWaitButtonRelease),
            4 => Some(OperatingState::Drive),
            5 => Some(OperatingState::TurnLeft),
            6 => Some(OperatingState::TurnRight),
            7 => Some(OperatingState::Stop),
            8 => Some(OperatingState::Back),
            _ => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            OperatingState::Initial => "initial",
            OperatingState::PauseWaitButtonRelease => "pause-wait-release",
            OperatingState::UnpauseWaitButtonPress => "unpause-wait-press",
            OperatingState::UnpauseWaitButtonRelease => "unpause-wait-release",
            OperatingState::Drive => "drive",
            OperatingState::TurnLeft => "turn-left",
            OperatingState::TurnRight => "turn-right",
            OperatingState::Stop => "stop",
            OperatingState::Back => "back",
        }
    }
}

impl fmt::Display for OperatingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Platform the chart was started on, captured during the `Initial` cycle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Environment {
    Simulator,
    Hardware,
}

impl Environment {
    #[must_use]
    pub const fn from_flag(is_simulator: bool) -> Self {
        if is_simulator {
            Environment::Simulator
        } else {
            Environment::Hardware
        }
    }
}

/// Everything the chart reads during one evaluation.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct CycleInput {
    pub odometry: Odometry,
    pub sensors: SensorSnapshot,
    /// Not consulted by any decision.
    pub acceleration: Acceleration,
    /// Only read on the first evaluation.
    pub is_simulator: bool,
}

impl CycleInput {
    #[must_use]
    pub const fn new(odometry: Odometry, sensors: SensorSnapshot) -> Self {
        Self {
            odometry,
            sensors,
            acceleration: Acceleration::new(0, 0, 0),
            is_simulator: false,
        }
    }

    #[must_use]
    pub const fn with_acceleration(mut self, acceleration: Acceleration) -> Self {
        self.acceleration = acceleration;
        self
    }

    #[must_use]
    pub const fn simulated(mut self, is_simulator: bool) -> Self {
        self.is_simulator = is_simulator;
        self
    }
}

/// Why the chart left its previous state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TransitionCause {
    /// First evaluation after power-up.
    Startup,
    /// Pause button pressed while running.
    PausePressed,
    /// Pause button released after pausing.
    PauseReleased,
    /// Pause button pressed again to request a resume.
    ResumePressed,
    /// Resume press released; the interrupted state is restored.
    Resumed,
    Collision(BumpSide),
    /// Clearance leg finished; its length is now owed as clearance.
    ClearanceMeasured,
    /// Clearance distance driven past the obstacle; heading correction starts.
    HeadingCorrectionDue,
    /// Far enough along the obstacle to turn back towards the original line.
    ObstaclePassed,
    TurnComplete,
    BackedAway,
}

impl fmt::Display for TransitionCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionCause::Startup => f.write_str("startup"),
            TransitionCause::PausePressed => f.write_str("pause-pressed"),
            TransitionCause::PauseReleased => f.write_str("pause-released"),
            TransitionCause::ResumePressed => f.write_str("resume-pressed"),
            TransitionCause::Resumed => f.write_str("resumed"),
            TransitionCause::Collision(side) => write!(f, "collision-{}", side.label()),
            TransitionCause::ClearanceMeasured => f.write_str("clearance-measured"),
            TransitionCause::HeadingCorrectionDue => f.write_str("heading-correction-due"),
            TransitionCause::ObstaclePassed => f.write_str("obstacle-passed"),
            TransitionCause::TurnComplete => f.write_str("turn-complete"),
            TransitionCause::BackedAway => f.write_str("backed-away"),
        }
    }
}

/// State change taken during one evaluation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Transition {
    pub from: OperatingState,
    pub to: OperatingState,
    pub cause: TransitionCause,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.cause)
    }
}

/// Result of one evaluation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Step {
    pub speeds: WheelSpeeds,
    pub transition: Option<Transition>,
}

/// Guarded run-region rules for the `Drive` state, in priority order.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum DriveRule {
    Collision,
    ClearanceMeasured,
    HeadingCorrectionDue,
    ObstaclePassed,
}

// First match wins; a new collision preempts any recovery leg in progress.
const DRIVE_RULES: [DriveRule; 4] = [
    DriveRule::Collision,
    DriveRule::ClearanceMeasured,
    DriveRule::HeadingCorrectionDue,
    DriveRule::ObstaclePassed,
];

impl DriveRule {
    fn try_fire(
        self,
        memory: &mut ManeuverMemory,
        profile: &ManeuverProfile,
        sensors: &SensorSnapshot,
        travelled: u32,
    ) -> Option<(OperatingState, TransitionCause)> {
        match self {
            DriveRule::Collision => {
                let side = sensors.bump_side()?;
                memory.phase = memory.phase.after_collision();
                memory.owe_right_turn(profile.turn_for(side));
                Some((OperatingState::Back, TransitionCause::Collision(side)))
            }
            DriveRule::ClearanceMeasured => {
                let armed = !memory.passed() && memory.drive_for_adjustment();
                if !armed || travelled < profile.clearance_leg_mm {
                    return None;
                }
                memory.add_clearance(travelled);
                memory.phase = memory.phase.after_clearance_measured();
                memory.owe_left_turn();
                Some((OperatingState::TurnLeft, TransitionCause::ClearanceMeasured))
            }
            DriveRule::HeadingCorrectionDue => {
                let due = memory.passed() && memory.time_to_adjust_angle();
                if !due || travelled < memory.distance() {
                    return None;
                }
                memory.right_turn_angle = memory.angle().unsigned_abs();
                memory.phase = RecoveryPhase::Realigning;
                Some((
                    OperatingState::TurnRight,
                    TransitionCause::HeadingCorrectionDue,
                ))
            }
            DriveRule::ObstaclePassed => {
                if !memory.bump() || travelled < profile.obstacle_pass_mm {
                    return None;
                }
                memory.phase = RecoveryPhase::Passed;
                memory.owe_left_turn();
                Some((OperatingState::TurnLeft, TransitionCause::ObstaclePassed))
            }
        }
    }
}

/// Owner of the operating state and manoeuvre memory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NavigationStatechart {
    state: OperatingState,
    memory: ManeuverMemory,
    profile: ManeuverProfile,
    environment: Option<Environment>,
}

impl NavigationStatechart {
    /// Power-up chart using [`DEFAULT_PROFILE`].
    #[must_use]
    pub const fn new() -> Self {
        Self::with_profile(DEFAULT_PROFILE)
    }

    /// Power-up chart using a custom manoeuvre profile.
    #[must_use]
    pub const fn with_profile(profile: ManeuverProfile) -> Self {
        Self {
            state: OperatingState::Initial,
            memory: ManeuverMemory::new(&profile),
            profile,
            environment: None,
        }
    }

    /// Chart parked in `state` with power-up manoeuvre memory.
    ///
    /// Used by fixtures and scripted scenarios; the transition logic itself
    /// never enters [`OperatingState::Stop`].
    #[must_use]
    pub const fn starting_in(state: OperatingState) -> Self {
        let mut chart = Self::new();
        chart.state = state;
        chart
    }

    #[must_use]
    pub const fn state(&self) -> OperatingState {
        self.state
    }

    #[must_use]
    pub const fn memory(&self) -> &ManeuverMemory {
        &self.memory
    }

    #[must_use]
    pub const fn profile(&self) -> &ManeuverProfile {
        &self.profile
    }

    /// Platform recorded on the `Initial` cycle, if it has run.
    #[must_use]
    pub const fn environment(&self) -> Option<Environment> {
        self.environment
    }

    /// Wheel command for the current state.
    #[must_use]
    pub const fn speeds(&self) -> WheelSpeeds {
        wheel_speeds(self.state)
    }

    /// Evaluates one control cycle and returns the wheel command to apply.
    pub fn step(&mut self, input: &CycleInput) -> Step {
        let from = self.state;
        let cause = if self.state.is_paused() || input.sensors.pause_button {
            self.arbitrate_pause(input)
        } else {
            self.advance_run(input)
        };

        Step {
            speeds: self.speeds(),
            transition: cause.map(|cause| Transition {
                from,
                to: self.state,
                cause,
            }),
        }
    }

    fn arbitrate_pause(&mut self, input: &CycleInput) -> Option<TransitionCause> {
        let pressed = input.sensors.pause_button;
        let (next, cause) = match self.state {
            OperatingState::Initial => {
                self.environment = Some(Environment::from_flag(input.is_simulator));
                (OperatingState::UnpauseWaitButtonPress, TransitionCause::Startup)
            }
            OperatingState::PauseWaitButtonRelease if !pressed => (
                OperatingState::UnpauseWaitButtonPress,
                TransitionCause::PauseReleased,
            ),
            OperatingState::UnpauseWaitButtonPress if pressed => (
                OperatingState::UnpauseWaitButtonRelease,
                TransitionCause::ResumePressed,
            ),
            OperatingState::UnpauseWaitButtonRelease if !pressed => {
                (self.memory.unpaused_state, TransitionCause::Resumed)
            }
            OperatingState::PauseWaitButtonRelease
            | OperatingState::UnpauseWaitButtonPress
            | OperatingState::UnpauseWaitButtonRelease => return None,
            running => {
                self.memory.unpaused_state = running;
                (
                    OperatingState::PauseWaitButtonRelease,
                    TransitionCause::PausePressed,
                )
            }
        };

        self.state = next;
        Some(cause)
    }

    fn advance_run(&mut self, input: &CycleInput) -> Option<TransitionCause> {
        let odometry = input.odometry;
        let travelled = self.memory.travelled(odometry);
        let turned = self.memory.turned(odometry);

        let (next, cause) = match self.state {
            OperatingState::Drive => DRIVE_RULES.iter().find_map(|rule| {
                rule.try_fire(&mut self.memory, &self.profile, &input.sensors, travelled)
            })?,
            OperatingState::TurnRight if turned >= self.memory.right_turn_angle() => {
                if self.memory.passed() {
                    self.memory.reset_recovery(&self.profile);
                } else {
                    self.memory.phase = self.memory.phase.after_back_off_turn();
                }
                (OperatingState::Drive, TransitionCause::TurnComplete)
            }
            OperatingState::TurnLeft if turned >= self.memory.left_turn_angle() => {
                self.memory.phase = self.memory.phase.after_left_turn();
                (OperatingState::Drive, TransitionCause::TurnComplete)
            }
            OperatingState::Back if travelled >= self.profile.back_off_mm => {
                (OperatingState::TurnRight, TransitionCause::BackedAway)
            }
            _ => return None,
        };

        self.memory.rebase(odometry);
        self.state = next;
        Some(cause)
    }
}

impl Default for NavigationStatechart {
    fn default() -> Self {
        Self::new()
    }
}
