#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Shared status storage for the firmware target.
//!
//! The control task publishes here once per cycle; the indicator task and
//! any debugger reads come back through [`snapshot`].

use navigation_core::statechart::OperatingState;
use portable_atomic::{AtomicU32, AtomicU8, Ordering};

/// Raw state code published before the first cycle completes.
const NO_STATE: u8 = u8::MAX;

static STATE_CODE: AtomicU8 = AtomicU8::new(NO_STATE);
static CYCLES: AtomicU32 = AtomicU32::new(0);
/// Count of cycles lost to UART or frame errors.
static LINK_ERRORS: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of the published counters.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StatusSnapshot {
    pub state: Option<OperatingState>,
    pub cycles: u32,
    pub link_errors: u32,
}

/// What the status LED should be showing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Indication {
    /// Nothing published yet.
    Booting,
    Running,
    Paused,
    LinkFault,
}

impl StatusSnapshot {
    /// Picks the LED pattern; `previous_errors` is the error count last shown.
    #[must_use]
    pub fn indication(&self, previous_errors: u32) -> Indication {
        if self.link_errors != previous_errors {
            return Indication::LinkFault;
        }
        match self.state {
            None => Indication::Booting,
            Some(state) if state.is_paused() => Indication::Paused,
            Some(_) => Indication::Running,
        }
    }
}

/// Publishes the state reached at the end of a cycle.
pub fn record_cycle(state: OperatingState) {
    STATE_CODE.store(state.to_raw(), Ordering::Relaxed);
    CYCLES.fetch_add(1, Ordering::Relaxed);
}

/// Counts a cycle that was skipped because the link failed.
pub fn record_link_error() {
    LINK_ERRORS.fetch_add(1, Ordering::Relaxed);
}

#[must_use]
pub fn snapshot() -> StatusSnapshot {
    StatusSnapshot {
        state: OperatingState::from_raw(STATE_CODE.load(Ordering::Relaxed)),
        cycles: CYCLES.load(Ordering::Relaxed),
        link_errors: LINK_ERRORS.load(Ordering::Relaxed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: Option<OperatingState>, link_errors: u32) -> StatusSnapshot {
        StatusSnapshot {
            state,
            cycles: 10,
            link_errors,
        }
    }

    #[test]
    fn new_link_errors_win_over_state() {
        let snapshot = status(Some(OperatingState::Drive), 3);
        assert_eq!(snapshot.indication(2), Indication::LinkFault);
        assert_eq!(snapshot.indication(3), Indication::Running);
    }

    #[test]
    fn pause_region_blinks() {
        for state in [
            OperatingState::PauseWaitButtonRelease,
            OperatingState::UnpauseWaitButtonPress,
            OperatingState::UnpauseWaitButtonRelease,
        ] {
            assert_eq!(status(Some(state), 0).indication(0), Indication::Paused);
        }
        assert_eq!(status(None, 0).indication(0), Indication::Booting);
    }
}
