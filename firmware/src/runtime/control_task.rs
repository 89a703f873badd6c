use embassy_time::{Duration, Ticker, Timer};

use super::{CONTROL_PERIOD, STATUS_CHANGED};
use crate::navigator::Navigator;
use crate::oi::OiLink;
use crate::status;
use crate::telemetry::FirmwareInstant;

const START_RETRY: Duration = Duration::from_millis(500);

#[embassy_executor::task]
pub async fn run(mut link: OiLink<'static>, mut navigator: Navigator) -> ! {
    while let Err(err) = link.start().await {
        defmt::warn!("oi: start failed: {}", defmt::Display2Format(&err));
        status::record_link_error();
        Timer::after(START_RETRY).await;
    }
    defmt::info!("oi: full mode, control period {}ms", CONTROL_PERIOD.as_millis());

    let mut ticker = Ticker::every(CONTROL_PERIOD);
    loop {
        ticker.next().await;

        let speeds = match link.poll_sensors().await {
            Ok(frame) => {
                let step = navigator.on_frame(&frame, FirmwareInstant::now());
                if step.transition.is_some() {
                    STATUS_CHANGED.signal(());
                }
                step.speeds
            }
            Err(err) => navigator.on_link_error(err),
        };

        if let Err(err) = link.drive(speeds).await {
            defmt::warn!(
                "oi: drive command lost on cycle {} ({}): {}",
                navigator.cycle(),
                navigator.state().label(),
                defmt::Display2Format(&err)
            );
            status::record_link_error();
        }
    }
}
