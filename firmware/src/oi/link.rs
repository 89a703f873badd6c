use embassy_futures::select::{Either, select};
use embassy_stm32 as hal;
use embassy_stm32::Peri;
use embassy_stm32::usart::{BufferedUart, Config as UartConfig, DataBits, Parity, StopBits};
use embassy_time::{Duration, Instant, Timer};
use embedded_io_async::{Read, Write};
use navigation_core::drive::WheelSpeeds;
use navigation_core::open_interface::{self as oi, SENSOR_GROUP_6_LEN, SensorFrame};
use static_cell::StaticCell;

use super::LinkError;

const OI_UART_BUFFER_SIZE: usize = 64;
/// A group 6 response takes about 9 ms at 57600 baud.
const RESPONSE_TIMEOUT: Duration = Duration::from_millis(12);
/// Line idle time that marks the end of a stray response.
const QUIET_PERIOD: Duration = Duration::from_millis(2);
const MODE_SETTLE: Duration = Duration::from_millis(20);

static UART_TX_BUFFER: StaticCell<[u8; OI_UART_BUFFER_SIZE]> = StaticCell::new();
static UART_RX_BUFFER: StaticCell<[u8; OI_UART_BUFFER_SIZE]> = StaticCell::new();

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART3_4_5_6_LPUART1 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART5>;
});

/// Request/response access to the Create over USART5.
pub struct OiLink<'d> {
    uart: BufferedUart<'d>,
}

impl OiLink<'static> {
    pub fn new(
        usart: Peri<'static, hal::peripherals::USART5>,
        tx_pin: Peri<'static, hal::peripherals::PB0>,
        rx_pin: Peri<'static, hal::peripherals::PB1>,
    ) -> Self {
        let mut config = UartConfig::default();
        config.baudrate = oi::BAUD_RATE;
        config.data_bits = DataBits::DataBits8;
        config.stop_bits = StopBits::STOP1;
        config.parity = Parity::ParityNone;

        let uart = BufferedUart::new(
            usart,
            rx_pin,
            tx_pin,
            UART_TX_BUFFER.init([0; OI_UART_BUFFER_SIZE]),
            UART_RX_BUFFER.init([0; OI_UART_BUFFER_SIZE]),
            UartIrqs,
            config,
        )
        .expect("failed to initialize OI UART");

        Self { uart }
    }
}

impl OiLink<'_> {
    /// Opens the interface and switches to full mode.
    pub async fn start(&mut self) -> Result<(), LinkError> {
        self.send(&oi::start_sequence()).await?;
        Timer::after(MODE_SETTLE).await;
        Ok(())
    }

    /// Requests sensor group 6 and decodes the response.
    pub async fn poll_sensors(&mut self) -> Result<SensorFrame, LinkError> {
        self.send(&oi::request_sensors()).await?;

        let mut response = [0u8; SENSOR_GROUP_6_LEN];
        let mut received = 0usize;
        let deadline = Instant::now() + RESPONSE_TIMEOUT;

        while received < response.len() {
            let outcome = select(
                self.uart.read(&mut response[received..]),
                Timer::at(deadline),
            )
            .await;
            match outcome {
                Either::First(Ok(count)) => received += count,
                Either::First(Err(_)) => {
                    self.drain().await;
                    return Err(LinkError::Uart);
                }
                Either::Second(()) => {
                    self.drain().await;
                    return Err(LinkError::Timeout { received });
                }
            }
        }

        Ok(SensorFrame::parse(&response)?)
    }

    pub async fn drive(&mut self, speeds: WheelSpeeds) -> Result<(), LinkError> {
        self.send(&oi::drive_direct(speeds)).await
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.uart
            .write_all(bytes)
            .await
            .map_err(|_| LinkError::Uart)?;
        self.uart.flush().await.map_err(|_| LinkError::Uart)
    }

    /// Discards late bytes so the next response starts on a frame boundary.
    async fn drain(&mut self) {
        let mut scratch = [0u8; 16];
        loop {
            let outcome = select(self.uart.read(&mut scratch), Timer::after(QUIET_PERIOD)).await;
            match outcome {
                Either::First(Ok(_)) => {}
                Either::First(Err(_)) | Either::Second(()) => break,
            }
        }
    }
}
