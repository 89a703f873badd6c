use navigation_core::drive::WheelSpeeds;
use navigation_core::sensors::{BumpSide, Odometry, SensorSnapshot};
use navigation_core::statechart::{
    CycleInput, NavigationStatechart, OperatingState, RecoveryPhase, Step, TransitionCause,
};

/// Statechart plus the odometry counters an external caller would maintain.
struct Rover {
    chart: NavigationStatechart,
    odometry: Odometry,
}

impl Rover {
    fn driving() -> Self {
        Self::parked_in(OperatingState::Drive)
    }

    fn parked_in(state: OperatingState) -> Self {
        Self {
            chart: NavigationStatechart::starting_in(state),
            odometry: Odometry::default(),
        }
    }

    fn feed(&mut self, sensors: SensorSnapshot) -> Step {
        self.chart.step(&CycleInput::new(self.odometry, sensors))
    }

    fn bump(&mut self, side: BumpSide) -> Step {
        self.feed(SensorSnapshot::idle().with_bump(Some(side)))
    }

    fn travel(&mut self, mm: i32) -> Step {
        self.odometry.net_distance_mm += mm;
        self.feed(SensorSnapshot::idle())
    }

    fn turn(&mut self, deg: i32) -> Step {
        self.odometry.net_angle_deg += deg;
        self.feed(SensorSnapshot::idle())
    }

    fn state(&self) -> OperatingState {
        self.chart.state()
    }
}

#[test]
fn left_bump_backs_off_turns_and_arms_clearance_leg() {
    let mut rover = Rover::driving();

    let step = rover.bump(BumpSide::Left);
    assert_eq!(rover.state(), OperatingState::Back);
    assert_eq!(rover.chart.memory().right_turn_angle(), 30);
    assert_eq!(rover.chart.memory().angle(), 30);
    assert_eq!(step.speeds, WheelSpeeds::new(-100, -100));

    let step = rover.travel(-50);
    assert_eq!(rover.state(), OperatingState::TurnRight);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::BackedAway)
    );

    for _ in 0..29 {
        rover.turn(-1);
        assert_eq!(rover.state(), OperatingState::TurnRight);
    }
    let step = rover.turn(-1);
    assert_eq!(rover.state(), OperatingState::Drive);
    assert_eq!(step.speeds, WheelSpeeds::FORWARD);
    assert!(rover.chart.memory().drive_for_adjustment());
    assert!(!rover.chart.memory().passed());
}

#[test]
fn bump_side_selects_turn_magnitude() {
    for (side, expected) in [
        (BumpSide::Both, 90),
        (BumpSide::Left, 30),
        (BumpSide::Right, 145),
    ] {
        let mut rover = Rover::driving();
        let step = rover.bump(side);

        assert_eq!(rover.state(), OperatingState::Back);
        assert_eq!(rover.chart.memory().right_turn_angle(), expected);
        assert_eq!(rover.chart.memory().angle(), i32::try_from(expected).unwrap());
        assert!(rover.chart.memory().bump());
        assert_eq!(
            step.transition.map(|t| t.cause),
            Some(TransitionCause::Collision(side))
        );
    }
}

#[test]
fn back_stays_until_threshold_then_leaves_on_first_qualifying_snapshot() {
    let mut rover = Rover::driving();
    rover.travel(200);
    rover.bump(BumpSide::Both);

    for _ in 0..49 {
        let step = rover.travel(-1);
        assert_eq!(rover.state(), OperatingState::Back);
        assert_eq!(step.transition, None);
    }

    rover.travel(-1);
    assert_eq!(rover.state(), OperatingState::TurnRight);
    assert_eq!(rover.chart.memory().distance_at_maneuver_start(), 150);
}

#[test]
fn turns_follow_angle_not_elapsed_cycles() {
    let mut rover = Rover::driving();
    rover.bump(BumpSide::Right);
    rover.travel(-60);
    assert_eq!(rover.state(), OperatingState::TurnRight);

    // Odometry jitters below the 145 degree target for many cycles.
    for cycle in 0..200 {
        rover.odometry.net_angle_deg = if cycle % 2 == 0 { -144 } else { -20 };
        rover.feed(SensorSnapshot::idle());
        assert_eq!(rover.state(), OperatingState::TurnRight);
    }

    rover.odometry.net_angle_deg = -145;
    rover.feed(SensorSnapshot::idle());
    assert_eq!(rover.state(), OperatingState::Drive);
}

#[test]
fn left_turn_holds_while_angle_jitters_below_target() {
    let mut rover = Rover::driving();
    rover.bump(BumpSide::Left);
    rover.travel(-50);
    rover.turn(-30);
    rover.travel(500);
    assert_eq!(rover.state(), OperatingState::TurnLeft);
    assert_eq!(rover.chart.memory().angle_at_maneuver_start(), -30);

    for cycle in 0..200 {
        rover.odometry.net_angle_deg = if cycle % 2 == 0 { 59 } else { -20 };
        let step = rover.feed(SensorSnapshot::idle());
        assert_eq!(rover.state(), OperatingState::TurnLeft);
        assert_eq!(step.speeds, WheelSpeeds::SPIN_LEFT);
    }

    rover.odometry.net_angle_deg = 60;
    let step = rover.feed(SensorSnapshot::idle());
    assert_eq!(rover.state(), OperatingState::Drive);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::TurnComplete)
    );
}

#[test]
fn right_turn_without_pending_collision_arms_only_the_clearance_leg() {
    let mut rover = Rover::parked_in(OperatingState::TurnRight);

    rover.turn(-90);
    assert_eq!(rover.state(), OperatingState::Drive);
    let memory = rover.chart.memory();
    assert_eq!(memory.phase(), RecoveryPhase::ClearanceArmed);
    assert!(memory.drive_for_adjustment());
    assert!(!memory.bump());

    rover.travel(500);
    assert_eq!(rover.state(), OperatingState::TurnLeft);
    assert_eq!(rover.chart.memory().phase(), RecoveryPhase::Idle);
    assert_eq!(rover.chart.memory().distance(), 500);

    rover.turn(90);
    assert_eq!(rover.state(), OperatingState::Drive);

    // No collision is pending, so the pass rule never fires.
    let step = rover.travel(1100);
    assert_eq!(step.transition, None);
    assert_eq!(rover.state(), OperatingState::Drive);
    assert!(!rover.chart.memory().passed());
}

#[test]
fn full_recovery_restores_heading_and_idles_memory() {
    let mut rover = Rover::driving();

    rover.bump(BumpSide::Left);
    rover.travel(-50);
    rover.turn(-30);
    assert_eq!(rover.chart.memory().phase(), RecoveryPhase::MeasuringClearance);

    rover.travel(499);
    assert_eq!(rover.state(), OperatingState::Drive);
    let step = rover.travel(1);
    assert_eq!(rover.state(), OperatingState::TurnLeft);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::ClearanceMeasured)
    );
    assert_eq!(rover.chart.memory().distance(), 500);
    assert_eq!(rover.chart.memory().angle(), -60);
    assert!(!rover.chart.memory().drive_for_adjustment());

    rover.turn(90);
    assert_eq!(rover.state(), OperatingState::Drive);

    let step = rover.travel(600);
    assert_eq!(rover.state(), OperatingState::TurnLeft);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::ObstaclePassed)
    );
    assert!(rover.chart.memory().passed());
    assert!(rover.chart.memory().time_to_adjust_angle());
    assert!(!rover.chart.memory().bump());
    assert_eq!(rover.chart.memory().angle(), -150);

    rover.turn(90);
    assert_eq!(rover.state(), OperatingState::Drive);

    rover.travel(499);
    assert_eq!(rover.state(), OperatingState::Drive);
    let step = rover.travel(1);
    assert_eq!(rover.state(), OperatingState::TurnRight);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::HeadingCorrectionDue)
    );
    assert_eq!(rover.chart.memory().right_turn_angle(), 150);
    assert!(!rover.chart.memory().time_to_adjust_angle());

    rover.turn(-150);
    assert_eq!(rover.state(), OperatingState::Drive);
    assert_eq!(rover.odometry.net_angle_deg, 0);

    let memory = rover.chart.memory();
    assert_eq!(memory.phase(), RecoveryPhase::Idle);
    assert!(!memory.bump());
    assert!(!memory.passed());
    assert!(!memory.drive_for_adjustment());
    assert!(!memory.time_to_adjust_angle());
    assert_eq!(memory.right_turn_angle(), 90);
    assert_eq!(memory.left_turn_angle(), 90);
    assert_eq!(memory.distance(), 0);
    assert_eq!(memory.angle(), 0);
}

#[test]
fn double_bump_preempts_armed_clearance_leg() {
    let mut rover = Rover::driving();
    rover.bump(BumpSide::Left);
    rover.travel(-50);
    rover.turn(-30);
    assert!(rover.chart.memory().drive_for_adjustment());

    // Far enough for the clearance rule, but the collision wins.
    rover.odometry.net_distance_mm += 700;
    rover.bump(BumpSide::Both);

    assert_eq!(rover.state(), OperatingState::Back);
    assert_eq!(rover.chart.memory().right_turn_angle(), 90);
    assert_eq!(rover.chart.memory().angle(), 120);
    assert_eq!(rover.chart.memory().distance(), 0);
}

#[test]
fn double_bump_preempts_due_heading_correction() {
    let mut rover = Rover::driving();
    rover.bump(BumpSide::Left);
    rover.travel(-50);
    rover.turn(-30);
    rover.travel(500);
    rover.turn(90);
    rover.travel(600);
    rover.turn(90);
    assert!(rover.chart.memory().time_to_adjust_angle());

    rover.odometry.net_distance_mm += 800;
    rover.bump(BumpSide::Both);

    let memory = rover.chart.memory();
    assert_eq!(rover.state(), OperatingState::Back);
    assert_eq!(memory.right_turn_angle(), 90);
    assert!(memory.bump());
    assert!(memory.passed());
    assert!(memory.time_to_adjust_angle());
    assert_eq!(memory.phase(), RecoveryPhase::PassedAndBumped);

    rover.travel(-50);
    assert_eq!(rover.state(), OperatingState::TurnRight);

    let step = rover.turn(-90);
    assert_eq!(rover.state(), OperatingState::Drive);
    assert_eq!(
        step.transition.map(|t| t.cause),
        Some(TransitionCause::TurnComplete)
    );

    let memory = rover.chart.memory();
    assert_eq!(memory.phase(), RecoveryPhase::Idle);
    assert!(!memory.bump());
    assert!(!memory.passed());
    assert!(!memory.drive_for_adjustment());
    assert!(!memory.time_to_adjust_angle());
    assert_eq!(memory.right_turn_angle(), 90);
    assert_eq!(memory.left_turn_angle(), 90);
    assert_eq!(memory.distance(), 0);
    assert_eq!(memory.angle(), 0);
}

#[test]
fn every_run_transition_rebases_the_segment() {
    let mut rover = Rover::driving();
    rover.travel(321);
    rover.turn(17);

    rover.bump(BumpSide::Right);
    assert_eq!(rover.chart.memory().distance_at_maneuver_start(), 321);
    assert_eq!(rover.chart.memory().angle_at_maneuver_start(), 17);

    rover.travel(-80);
    assert_eq!(rover.state(), OperatingState::TurnRight);
    assert_eq!(rover.chart.memory().distance_at_maneuver_start(), 241);

    rover.turn(-150);
    assert_eq!(rover.state(), OperatingState::Drive);
    assert_eq!(rover.chart.memory().angle_at_maneuver_start(), -133);
}

#[test]
fn identical_chart_and_input_give_identical_results() {
    let mut rover = Rover::driving();
    rover.bump(BumpSide::Left);
    rover.travel(-20);

    let mut twin = rover.chart.clone();
    let input = CycleInput::new(Odometry::new(-70, 0), SensorSnapshot::idle());

    assert_eq!(rover.chart.step(&input), twin.step(&input));
    assert_eq!(rover.chart, twin);
}

#[test]
fn accelerometer_and_simulator_flag_do_not_change_decisions() {
    use navigation_core::sensors::Acceleration;

    let mut plain = Rover::driving();
    let mut shaken = Rover::driving();
    let bumped = SensorSnapshot::idle().with_bump(Some(BumpSide::Right));

    let a = plain.chart.step(&CycleInput::new(Odometry::new(10, 0), bumped));
    let b = shaken.chart.step(
        &CycleInput::new(Odometry::new(10, 0), bumped)
            .with_acceleration(Acceleration::new(900, -400, 1000))
            .simulated(true),
    );

    assert_eq!(a, b);
    assert_eq!(plain.chart, shaken.chart);
}
