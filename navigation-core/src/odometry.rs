//! Cumulative odometry maintained by the caller of the statechart.
//!
//! The Create reports distance and angle as deltas since the previous sensor
//! request. The accumulator folds those deltas into the net counters the
//! statechart expects; it saturates rather than wrapping on long runs.

use crate::sensors::Odometry;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct OdometryAccumulator {
    net: Odometry,
    frames: u32,
}

impl OdometryAccumulator {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            net: Odometry::new(0, 0),
            frames: 0,
        }
    }

    /// Adds one frame's distance (mm) and angle (degrees) deltas.
    pub fn accumulate(&mut self, distance_delta_mm: i16, angle_delta_deg: i16) -> Odometry {
        self.net.net_distance_mm = self
            .net
            .net_distance_mm
            .saturating_add(i32::from(distance_delta_mm));
        self.net.net_angle_deg = self
            .net
            .net_angle_deg
            .saturating_add(i32::from(angle_delta_deg));
        self.frames = self.frames.saturating_add(1);
        self.net
    }

    /// Current net counters.
    #[must_use]
    pub const fn odometry(&self) -> Odometry {
        self.net
    }

    /// Number of frames folded in since the last reset.
    #[must_use]
    pub const fn frames(&self) -> u32 {
        self.frames
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_signed_deltas() {
        let mut accumulator = OdometryAccumulator::new();
        accumulator.accumulate(3, 0);
        accumulator.accumulate(2, -4);
        let net = accumulator.accumulate(-1, 1);

        assert_eq!(net, Odometry::new(4, -3));
        assert_eq!(accumulator.frames(), 3);
    }

    #[test]
    fn saturates_at_counter_limits() {
        let mut accumulator = OdometryAccumulator {
            net: Odometry::new(i32::MAX - 1, i32::MIN + 1),
            frames: 0,
        };
        let net = accumulator.accumulate(i16::MAX, i16::MIN);

        assert_eq!(net.net_distance_mm, i32::MAX);
        assert_eq!(net.net_angle_deg, i32::MIN);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut accumulator = OdometryAccumulator::new();
        accumulator.accumulate(100, 45);
        accumulator.reset();
        assert_eq!(accumulator.odometry(), Odometry::default());
        assert_eq!(accumulator.frames(), 0);
    }
}
