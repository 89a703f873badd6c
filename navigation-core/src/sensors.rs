//! Sensor snapshot types consumed by the navigation statechart.
//!
//! These are plain values captured once per control cycle by whoever owns the
//! hardware (the firmware's Open Interface link or the host emulator). The
//! statechart never mutates them.

/// Which side(s) of the bumper registered contact.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BumpSide {
    Both,
    Left,
    Right,
}

impl BumpSide {
    /// Short label used in log lines and console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            BumpSide::Both => "both",
            BumpSide::Left => "left",
            BumpSide::Right => "right",
        }
    }
}

/// Digital inputs sampled for one control cycle.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SensorSnapshot {
    pub bump_left: bool,
    pub bump_right: bool,
    /// Operator pause button (the Create's Play button).
    pub pause_button: bool,
}

impl SensorSnapshot {
    /// Snapshot with every input released.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            bump_left: false,
            bump_right: false,
            pause_button: false,
        }
    }

    /// Returns a copy with the pause button set to `pressed`.
    #[must_use]
    pub const fn with_pause_button(mut self, pressed: bool) -> Self {
        self.pause_button = pressed;
        self
    }

    /// Returns a copy with the bumpers set to match `side`.
    #[must_use]
    pub const fn with_bump(mut self, side: Option<BumpSide>) -> Self {
        let (left, right) = match side {
            Some(BumpSide::Both) => (true, true),
            Some(BumpSide::Left) => (true, false),
            Some(BumpSide::Right) => (false, true),
            None => (false, false),
        };
        self.bump_left = left;
        self.bump_right = right;
        self
    }

    /// Collapses the two bumper switches into a single contact description.
    #[must_use]
    pub const fn bump_side(&self) -> Option<BumpSide> {
        match (self.bump_left, self.bump_right) {
            (true, true) => Some(BumpSide::Both),
            (true, false) => Some(BumpSide::Left),
            (false, true) => Some(BumpSide::Right),
            (false, false) => None,
        }
    }
}

/// Cumulative odometry counters maintained outside the statechart.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Odometry {
    /// Signed distance travelled since power-up, in millimetres.
    pub net_distance_mm: i32,
    /// Signed heading change since power-up, in degrees.
    pub net_angle_deg: i32,
}

impl Odometry {
    #[must_use]
    pub const fn new(net_distance_mm: i32, net_angle_deg: i32) -> Self {
        Self {
            net_distance_mm,
            net_angle_deg,
        }
    }
}

/// Raw accelerometer sample in milli-g.
///
/// Accepted on every cycle but not read by any navigation decision.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Acceleration {
    pub x_mg: i16,
    pub y_mg: i16,
    pub z_mg: i16,
}

impl Acceleration {
    #[must_use]
    pub const fn new(x_mg: i16, y_mg: i16, z_mg: i16) -> Self {
        Self { x_mg, y_mg, z_mg }
    }
}
