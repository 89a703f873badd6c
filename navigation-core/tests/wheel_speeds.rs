use navigation_core::drive::{WheelSpeeds, wheel_speeds, wheel_speeds_for_code};
use navigation_core::sensors::{Odometry, SensorSnapshot};
use navigation_core::statechart::{CycleInput, NavigationStatechart, OperatingState};

#[test]
fn output_table_holds_for_every_state() {
    let table = [
        (OperatingState::Initial, (0, 0)),
        (OperatingState::PauseWaitButtonRelease, (0, 0)),
        (OperatingState::UnpauseWaitButtonPress, (0, 0)),
        (OperatingState::UnpauseWaitButtonRelease, (0, 0)),
        (OperatingState::Stop, (0, 0)),
        (OperatingState::Drive, (150, 150)),
        (OperatingState::TurnRight, (100, -100)),
        (OperatingState::TurnLeft, (-100, 100)),
        (OperatingState::Back, (-100, -100)),
    ];

    assert_eq!(table.len(), OperatingState::ALL.len());
    for (state, (left, right)) in table {
        assert_eq!(wheel_speeds(state), WheelSpeeds::new(left, right), "{state}");
        assert_eq!(wheel_speeds_for_code(state.to_raw()), WheelSpeeds::new(left, right));
    }
}

#[test]
fn step_output_tracks_state_after_the_transition() {
    for state in OperatingState::ALL {
        let mut chart = NavigationStatechart::starting_in(state);
        let step = chart.step(&CycleInput::new(Odometry::default(), SensorSnapshot::idle()));

        assert_eq!(step.speeds, wheel_speeds(chart.state()));
        if let Some(transition) = step.transition {
            assert_eq!(transition.from, state);
            assert_eq!(transition.to, chart.state());
        } else {
            assert_eq!(chart.state(), state);
        }
    }
}

#[test]
fn corrupted_state_codes_halt() {
    for code in 9..=u8::MAX {
        assert!(wheel_speeds_for_code(code).is_halted());
    }
}
