#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! One control cycle on real hardware, minus the UART.
//!
//! The control task hands every decoded sensor frame to [`Navigator`]; the
//! returned wheel command goes straight back out as `DRIVE_DIRECT`.

use navigation_core::drive::WheelSpeeds;
use navigation_core::odometry::OdometryAccumulator;
use navigation_core::open_interface::SensorFrame;
use navigation_core::statechart::{CycleInput, NavigationStatechart, OperatingState, Step};

use crate::oi::LinkError;
use crate::status;
use crate::telemetry::{FirmwareInstant, TelemetryRecorder};

pub struct Navigator {
    chart: NavigationStatechart,
    odometry: OdometryAccumulator,
    telemetry: TelemetryRecorder,
    cycle: u32,
}

impl Navigator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            chart: NavigationStatechart::new(),
            odometry: OdometryAccumulator::new(),
            telemetry: TelemetryRecorder::new(),
            cycle: 0,
        }
    }

    #[must_use]
    pub const fn state(&self) -> OperatingState {
        self.chart.state()
    }

    #[must_use]
    pub const fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Folds a sensor frame into odometry and evaluates the statechart.
    pub fn on_frame(&mut self, frame: &SensorFrame, now: FirmwareInstant) -> Step {
        let odometry = self
            .odometry
            .accumulate(frame.distance_delta_mm, frame.angle_delta_deg);
        let input = CycleInput::new(odometry, frame.snapshot());

        let step = self.chart.step(&input);
        if let Some(transition) = step.transition {
            self.telemetry
                .record_transition(self.cycle, transition, step.speeds, now);
        }

        status::record_cycle(self.chart.state());
        self.cycle = self.cycle.wrapping_add(1);
        step
    }

    /// A cycle without a usable frame. The chart is not stepped, so odometry
    /// and manoeuvre memory stay where they were; the wheels stop.
    pub fn on_link_error(&mut self, error: LinkError) -> WheelSpeeds {
        status::record_link_error();
        log_link_error(self.cycle, error);
        self.cycle = self.cycle.wrapping_add(1);
        WheelSpeeds::HALT
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "none")]
fn log_link_error(cycle: u32, error: LinkError) {
    defmt::warn!("nav: cycle {} halted: {}", cycle, defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
fn log_link_error(cycle: u32, error: LinkError) {
    println!("nav: cycle {cycle} halted: {error}");
}
