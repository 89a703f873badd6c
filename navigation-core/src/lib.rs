#![no_std]

#[cfg(feature = "alloc")]
extern crate alloc;

// Navigation logic shared by the Create firmware and the host emulator.
//
// The crate avoids the Rust standard library so the same statechart runs on
// the MCU and on a PC. It owns no I/O: callers sample sensors, step the
// statechart once per control cycle and apply the returned wheel speeds.

pub mod console;
pub mod drive;
pub mod odometry;
pub mod open_interface;
pub mod profile;
pub mod sensors;
pub mod statechart;
pub mod telemetry;
