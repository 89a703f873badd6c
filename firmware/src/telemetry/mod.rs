#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Firmware-side transition telemetry.
//!
//! Wraps the core recorder with an embassy clock and mirrors every
//! transition to defmt on target, or stdout when built for the host.

use core::time::Duration;

use embassy_time::Instant;
use navigation_core::drive::WheelSpeeds;
use navigation_core::statechart::Transition;
use navigation_core::telemetry::{self as core_telemetry, EventId, TelemetryInstant};

/// Monotonic timestamp backed by the embassy time driver.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(Instant);

impl FirmwareInstant {
    #[cfg(target_os = "none")]
    #[must_use]
    pub fn now() -> Self {
        Self(Instant::now())
    }

    #[must_use]
    pub const fn into_embassy(self) -> Instant {
        self.0
    }
}

impl From<Instant> for FirmwareInstant {
    fn from(value: Instant) -> Self {
        Self(value)
    }
}

impl TelemetryInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        let micros = self.0.as_micros().saturating_sub(earlier.0.as_micros());
        Duration::from_micros(micros)
    }
}

pub type TransitionRecord = core_telemetry::TransitionRecord<FirmwareInstant>;

/// Transition history plus console mirroring.
pub struct TelemetryRecorder {
    inner: core_telemetry::TelemetryRecorder<FirmwareInstant>,
}

impl TelemetryRecorder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: core_telemetry::TelemetryRecorder::new(),
        }
    }

    /// Records a transition and logs the resulting record.
    pub fn record_transition(
        &mut self,
        cycle: u32,
        transition: Transition,
        speeds: WheelSpeeds,
        timestamp: FirmwareInstant,
    ) -> EventId {
        let id = self.inner.record(cycle, transition, speeds, timestamp);
        if let Some(record) = self.inner.latest() {
            log_transition(record);
        }
        id
    }

    #[must_use]
    pub fn latest(&self) -> Option<&TransitionRecord> {
        self.inner.latest()
    }
}

impl Default for TelemetryRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "none")]
fn log_transition(record: &TransitionRecord) {
    defmt::info!(
        "telemetry:nav t={}us {}",
        record.timestamp.into_embassy().as_micros(),
        defmt::Display2Format(record)
    );
}

#[cfg(not(target_os = "none"))]
fn log_transition(record: &TransitionRecord) {
    println!(
        "telemetry:nav t={}us {}",
        record.timestamp.into_embassy().as_micros(),
        record
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use navigation_core::statechart::{OperatingState, TransitionCause};

    fn micros(value: u64) -> FirmwareInstant {
        FirmwareInstant::from(Instant::from_micros(value))
    }

    #[test]
    fn records_dwell_between_transitions() {
        let mut recorder = TelemetryRecorder::new();

        let first = recorder.record_transition(
            0,
            Transition {
                from: OperatingState::Initial,
                to: OperatingState::UnpauseWaitButtonPress,
                cause: TransitionCause::Startup,
            },
            WheelSpeeds::HALT,
            micros(100),
        );
        assert_eq!(first, 0);
        assert_eq!(recorder.latest().unwrap().dwell, None);

        let second = recorder.record_transition(
            12,
            Transition {
                from: OperatingState::UnpauseWaitButtonPress,
                to: OperatingState::UnpauseWaitButtonRelease,
                cause: TransitionCause::ResumePressed,
            },
            WheelSpeeds::HALT,
            micros(180_100),
        );
        assert_eq!(second, 1);

        let latest = recorder.latest().unwrap();
        assert_eq!(latest.dwell, Some(Duration::from_millis(180)));
        assert_eq!(latest.cycle, 12);
    }
}
