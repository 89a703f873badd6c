//! Transition history shared by firmware and host targets.
//!
//! The statechart never logs on its own. Callers feed every [`Transition`]
//! it returns into a [`TelemetryRecorder`], which keeps a fixed-size ring of
//! records stamped with the caller's clock. Records render through
//! `Display`, giving defmt, stdout and console transcripts the same line
//! vocabulary.

use core::{fmt, time::Duration};

use heapless::{HistoryBuf, OldestOrdered};

use crate::drive::WheelSpeeds;
use crate::statechart::Transition;

/// Identifier assigned to each record; wraps after `u32::MAX`.
pub type EventId = u32;

/// Total number of transition records retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Trait implemented by monotonic instant wrappers used for telemetry tracking.
pub trait TelemetryInstant: Copy {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Transition record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransitionRecord<TInstant>
where
    TInstant: Copy,
{
    pub id: EventId,
    pub timestamp: TInstant,
    /// Control cycle on which the transition fired.
    pub cycle: u32,
    pub transition: Transition,
    /// Wheel command issued on that cycle.
    pub speeds: WheelSpeeds,
    /// Time spent in `transition.from`; `None` for the first record.
    pub dwell: Option<Duration>,
}

impl<TInstant> fmt::Display for TransitionRecord<TInstant>
where
    TInstant: Copy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} cycle={} {} speeds=[{}]",
            self.id, self.cycle, self.transition, self.speeds
        )?;
        if let Some(dwell) = self.dwell {
            write!(f, " dwell={}ms", dwell.as_millis())?;
        }
        Ok(())
    }
}

/// Telemetry ring buffer type alias.
pub type TelemetryRing<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY> =
    HistoryBuf<TransitionRecord<TInstant>, CAPACITY>;

/// Records transitions into a fixed-size ring buffer.
pub struct TelemetryRecorder<TInstant, const CAPACITY: usize = TELEMETRY_RING_CAPACITY>
where
    TInstant: Copy,
{
    ring: TelemetryRing<TInstant, CAPACITY>,
    last_transition_at: Option<TInstant>,
    next_event_id: EventId,
}

impl<TInstant, const CAPACITY: usize> TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    /// Creates a new telemetry recorder with an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            last_transition_at: None,
            next_event_id: 0,
        }
    }

    /// Returns an iterator over the recorded transitions in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, TransitionRecord<TInstant>> {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent record, if available.
    pub fn latest(&self) -> Option<&TransitionRecord<TInstant>> {
        self.ring.recent()
    }

    /// Returns the number of records currently stored.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` when no records are stored.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Records a transition and the time spent in the state it left.
    pub fn record(
        &mut self,
        cycle: u32,
        transition: Transition,
        speeds: WheelSpeeds,
        timestamp: TInstant,
    ) -> EventId {
        let dwell = self
            .last_transition_at
            .map(|previous| timestamp.saturating_duration_since(previous));
        self.last_transition_at = Some(timestamp);

        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TransitionRecord {
            id,
            timestamp,
            cycle,
            transition,
            speeds,
            dwell,
        });

        id
    }

    /// Drops all history, including the dwell reference point.
    pub fn clear(&mut self) {
        self.ring.clear();
        self.last_transition_at = None;
        self.next_event_id = 0;
    }
}

#[cfg(feature = "alloc")]
impl<TInstant, const CAPACITY: usize> TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    /// Copies the ring into a vector, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> alloc::vec::Vec<TransitionRecord<TInstant>> {
        self.oldest_first().copied().collect()
    }
}

impl<TInstant, const CAPACITY: usize> Default for TelemetryRecorder<TInstant, CAPACITY>
where
    TInstant: Copy + TelemetryInstant,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::BumpSide;
    use crate::statechart::{OperatingState, TransitionCause};

    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
    struct MicrosInstant(u64);

    impl MicrosInstant {
        fn from_micros(value: u64) -> Self {
            Self(value)
        }
    }

    impl TelemetryInstant for MicrosInstant {
        fn saturating_duration_since(&self, earlier: Self) -> Duration {
            let micros = self.0.saturating_sub(earlier.0);
            Duration::from_micros(micros)
        }
    }

    fn transition(from: OperatingState, to: OperatingState, cause: TransitionCause) -> Transition {
        Transition { from, to, cause }
    }

    #[test]
    fn records_dwell_between_transitions() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();

        let id1 = recorder.record(
            0,
            transition(
                OperatingState::Initial,
                OperatingState::UnpauseWaitButtonPress,
                TransitionCause::Startup,
            ),
            WheelSpeeds::HALT,
            MicrosInstant::from_micros(0),
        );
        assert_eq!(id1, 0);
        assert_eq!(recorder.latest().unwrap().dwell, None);

        let id2 = recorder.record(
            40,
            transition(
                OperatingState::UnpauseWaitButtonPress,
                OperatingState::UnpauseWaitButtonRelease,
                TransitionCause::ResumePressed,
            ),
            WheelSpeeds::HALT,
            MicrosInstant::from_micros(600_000),
        );
        assert_eq!(id2, 1);

        let second = recorder.latest().copied().unwrap();
        let dwell = second.dwell.expect("missing dwell");
        assert_eq!(dwell.as_millis(), 600);
        assert_eq!(second.cycle, 40);
    }

    #[test]
    fn ring_keeps_newest_records_in_order() {
        let mut recorder = TelemetryRecorder::<MicrosInstant, 4>::new();
        let hop = transition(
            OperatingState::Back,
            OperatingState::TurnRight,
            TransitionCause::BackedAway,
        );

        for cycle in 0..6u32 {
            recorder.record(
                cycle,
                hop,
                WheelSpeeds::SPIN_RIGHT,
                MicrosInstant::from_micros(u64::from(cycle) * 15_000),
            );
        }

        assert_eq!(recorder.len(), 4);
        let cycles: heapless::Vec<u32, 4> = recorder.oldest_first().map(|r| r.cycle).collect();
        assert_eq!(cycles.as_slice(), &[2, 3, 4, 5]);
        assert_eq!(recorder.latest().map(|r| r.id), Some(5));
    }

    #[test]
    fn record_display_includes_cause_and_dwell() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();
        let bump = transition(
            OperatingState::Drive,
            OperatingState::Back,
            TransitionCause::Collision(BumpSide::Right),
        );
        recorder.record(7, bump, WheelSpeeds::REVERSE, MicrosInstant::from_micros(0));
        recorder.record(9, bump, WheelSpeeds::REVERSE, MicrosInstant::from_micros(30_000));

        let mut line: heapless::String<96> = heapless::String::new();
        let record = recorder.latest().unwrap();
        core::fmt::write(&mut line, format_args!("{record}")).unwrap();
        assert_eq!(
            line.as_str(),
            "#1 cycle=9 drive -> back (collision-right) speeds=[L=-100 R=-100] dwell=30ms"
        );
    }

    #[test]
    fn clear_resets_ids_and_dwell() {
        let mut recorder = TelemetryRecorder::<MicrosInstant>::new();
        let hop = transition(
            OperatingState::TurnLeft,
            OperatingState::Drive,
            TransitionCause::TurnComplete,
        );
        recorder.record(1, hop, WheelSpeeds::FORWARD, MicrosInstant::from_micros(10));
        recorder.clear();

        assert!(recorder.is_empty());
        let id = recorder.record(2, hop, WheelSpeeds::FORWARD, MicrosInstant::from_micros(20));
        assert_eq!(id, 0);
        assert_eq!(recorder.latest().unwrap().dwell, None);
    }
}
