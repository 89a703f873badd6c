use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use crate::navigator::Navigator;
use crate::oi::OiLink;

mod control_task;
mod indicator_task;

/// Period of the sense/decide/act loop.
pub(super) const CONTROL_PERIOD: Duration = Duration::from_millis(15);

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

/// Raised by the control task whenever the published status changes shape.
pub(super) static STATUS_CHANGED: Signal<ThreadModeRawMutex, ()> = Signal::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA5, PB0, PB1, USART5, ..
    } = hal::init(config);

    let link = OiLink::new(USART5, PB0, PB1);
    let led = Output::new(PA5, Level::Low, Speed::Low);

    spawner
        .spawn(control_task::run(link, Navigator::new()))
        .expect("failed to spawn control task");

    spawner
        .spawn(indicator_task::run(led))
        .expect("failed to spawn indicator task");

    core::future::pending::<()>().await;
}
