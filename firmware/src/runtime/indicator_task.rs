use embassy_futures::select::select;
use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Timer};

use super::STATUS_CHANGED;
use crate::status::{self, Indication};

const STEADY_POLL: Duration = Duration::from_millis(250);
const PAUSED_BLINK: Duration = Duration::from_millis(500);
const FAULT_BLINK: Duration = Duration::from_millis(80);

/// Solid while running, slow blink while paused, fast blink on link errors.
#[embassy_executor::task]
pub async fn run(mut led: Output<'static>) -> ! {
    let mut shown_errors = 0;
    loop {
        let snapshot = status::snapshot();
        let indication = snapshot.indication(shown_errors);
        shown_errors = snapshot.link_errors;

        let wait = match indication {
            Indication::Booting => {
                led.set_low();
                STEADY_POLL
            }
            Indication::Running => {
                led.set_high();
                STEADY_POLL
            }
            Indication::Paused => {
                led.toggle();
                PAUSED_BLINK
            }
            Indication::LinkFault => {
                led.toggle();
                FAULT_BLINK
            }
        };

        select(STATUS_CHANGED.wait(), Timer::after(wait)).await;
    }
}
