//! Kinematic model of a Create driving around a walled arena.
//!
//! The robot is a disc with a front bumper. Wheel speeds integrate into a
//! planar pose; translation stops short of any box it would overlap, and a
//! box within reach of the front half closes one or both bump switches.
//! Odometry is reported the way the Create does, as whole-unit deltas folded
//! into net counters.

use std::f64::consts::PI;
use std::fmt;
use std::time::Duration;

use navigation_core::console::ObstacleSpec;
use navigation_core::drive::WheelSpeeds;
use navigation_core::odometry::OdometryAccumulator;
use navigation_core::sensors::{BumpSide, Odometry};

/// Distance between the drive wheels, in mm.
pub const WHEEL_BASE_MM: f64 = 258.0;
/// Radius of the round chassis and bumper, in mm.
pub const BUMPER_RADIUS_MM: f64 = 170.0;
/// Contacts this close to straight ahead close both switches.
pub const BOTH_BUMPERS_ARC_DEG: f64 = 40.0;
/// Side of the square arena, centred on the start pose.
pub const ARENA_SIDE_MM: f64 = 6_000.0;

const WALL_THICKNESS_MM: f64 = 100.0;
// Translation is clamped before overlap, so contact needs a little slack.
const CONTACT_SLACK_MM: f64 = 5.0;

/// Axis-aligned box in arena coordinates (mm).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Obstacle {
    #[must_use]
    pub fn from_spec(spec: ObstacleSpec) -> Self {
        let min_x = f64::from(spec.x);
        let min_y = f64::from(spec.y);
        Self {
            min_x,
            min_y,
            max_x: min_x + f64::from(spec.width),
            max_y: min_y + f64::from(spec.height),
        }
    }

    fn closest_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(self.min_x, self.max_x), y.clamp(self.min_y, self.max_y))
    }

    fn distance_to(&self, x: f64, y: f64) -> f64 {
        let (cx, cy) = self.closest_point(x, y);
        (cx - x).hypot(cy - y)
    }
}

impl fmt::Display for Obstacle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.0}, {:.0})..({:.0}, {:.0})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

/// Planar pose; heading is counter-clockwise from +x, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x_mm: f64,
    pub y_mm: f64,
    pub heading_rad: f64,
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={:.0}mm y={:.0}mm heading={:.1}deg",
            self.x_mm,
            self.y_mm,
            self.heading_rad.to_degrees()
        )
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WorldError {
    /// The new box would overlap the robot's current footprint.
    OverlapsRobot,
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::OverlapsRobot => f.write_str("obstacle overlaps the robot"),
        }
    }
}

pub struct World {
    pose: Pose,
    walls: [Obstacle; 4],
    obstacles: Vec<Obstacle>,
    odometry: OdometryAccumulator,
    travelled_mm: f64,
    turned_deg: f64,
}

impl World {
    /// Empty arena with the robot at the centre facing +x.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pose: Pose::default(),
            walls: arena_walls(ARENA_SIDE_MM / 2.0),
            obstacles: Vec::new(),
            odometry: OdometryAccumulator::new(),
            travelled_mm: 0.0,
            turned_deg: 0.0,
        }
    }

    #[must_use]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[must_use]
    pub fn odometry(&self) -> Odometry {
        self.odometry.odometry()
    }

    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Adds a box unless it overlaps the robot where it stands.
    pub fn add_obstacle(&mut self, spec: ObstacleSpec) -> Result<usize, WorldError> {
        let obstacle = Obstacle::from_spec(spec);
        if obstacle.distance_to(self.pose.x_mm, self.pose.y_mm) < BUMPER_RADIUS_MM {
            return Err(WorldError::OverlapsRobot);
        }
        self.obstacles.push(obstacle);
        Ok(self.obstacles.len())
    }

    /// Returns the robot to the start pose and zeroes odometry. Obstacles stay.
    pub fn reset_robot(&mut self) {
        self.pose = Pose::default();
        self.odometry.reset();
        self.travelled_mm = 0.0;
        self.turned_deg = 0.0;
    }

    /// Bump switches closed at the current pose.
    #[must_use]
    pub fn contact(&self) -> Option<BumpSide> {
        let mut left = false;
        let mut right = false;

        for solid in self.solids() {
            let (cx, cy) = solid.closest_point(self.pose.x_mm, self.pose.y_mm);
            let (dx, dy) = (cx - self.pose.x_mm, cy - self.pose.y_mm);
            if dx.hypot(dy) > BUMPER_RADIUS_MM + CONTACT_SLACK_MM {
                continue;
            }

            let bearing = normalize(dy.atan2(dx) - self.pose.heading_rad).to_degrees();
            if bearing.abs() > 90.0 {
                continue;
            }
            if bearing.abs() <= BOTH_BUMPERS_ARC_DEG / 2.0 {
                left = true;
                right = true;
            } else if bearing > 0.0 {
                left = true;
            } else {
                right = true;
            }
        }

        match (left, right) {
            (true, true) => Some(BumpSide::Both),
            (true, false) => Some(BumpSide::Left),
            (false, true) => Some(BumpSide::Right),
            (false, false) => None,
        }
    }

    /// Integrates one control period of motion and returns the new contacts.
    pub fn advance(&mut self, speeds: WheelSpeeds, dt: Duration) -> Option<BumpSide> {
        let seconds = dt.as_secs_f64();
        let left = f64::from(speeds.left);
        let right = f64::from(speeds.right);
        let linear = (left + right) / 2.0 * seconds;
        let rotation = (right - left) / WHEEL_BASE_MM * seconds;

        let mid_heading = self.pose.heading_rad + rotation / 2.0;
        let x = self.pose.x_mm + linear * mid_heading.cos();
        let y = self.pose.y_mm + linear * mid_heading.sin();

        if !self.blocked_at(x, y) {
            self.pose.x_mm = x;
            self.pose.y_mm = y;
            self.travelled_mm += linear;
        }
        self.pose.heading_rad = normalize(self.pose.heading_rad + rotation);
        self.turned_deg += rotation.to_degrees();

        let before = self.odometry.odometry();
        let distance_delta = whole_units(self.travelled_mm) - i64::from(before.net_distance_mm);
        let angle_delta = whole_units(self.turned_deg) - i64::from(before.net_angle_deg);
        self.odometry
            .accumulate(clamp_delta(distance_delta), clamp_delta(angle_delta));

        self.contact()
    }

    fn solids(&self) -> impl Iterator<Item = &Obstacle> {
        self.walls.iter().chain(self.obstacles.iter())
    }

    fn blocked_at(&self, x: f64, y: f64) -> bool {
        self.solids()
            .any(|solid| solid.distance_to(x, y) < BUMPER_RADIUS_MM)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

fn arena_walls(half: f64) -> [Obstacle; 4] {
    let outer = half + WALL_THICKNESS_MM;
    [
        Obstacle { min_x: -outer, min_y: half, max_x: outer, max_y: outer },
        Obstacle { min_x: -outer, min_y: -outer, max_x: outer, max_y: -half },
        Obstacle { min_x: -outer, min_y: -outer, max_x: -half, max_y: outer },
        Obstacle { min_x: half, min_y: -outer, max_x: outer, max_y: outer },
    ]
}

fn normalize(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(2.0 * PI) - PI;
    if wrapped <= -PI { wrapped + 2.0 * PI } else { wrapped }
}

#[allow(clippy::cast_possible_truncation)]
fn whole_units(value: f64) -> i64 {
    value.round() as i64
}

fn clamp_delta(delta: i64) -> i16 {
    i16::try_from(delta).unwrap_or(if delta < 0 { i16::MIN } else { i16::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(15);

    fn box_ahead(distance: i32) -> ObstacleSpec {
        ObstacleSpec {
            x: distance,
            y: -500,
            width: 200,
            height: 1_000,
        }
    }

    #[test]
    fn driving_forward_counts_distance() {
        let mut world = World::new();
        for _ in 0..100 {
            world.advance(WheelSpeeds::FORWARD, TICK);
        }

        let odometry = world.odometry();
        assert_eq!(odometry.net_distance_mm, 225);
        assert_eq!(odometry.net_angle_deg, 0);
        assert!((world.pose().x_mm - 225.0).abs() < 1e-6);
    }

    #[test]
    fn spinning_right_turns_clockwise() {
        let mut world = World::new();
        for _ in 0..100 {
            world.advance(WheelSpeeds::SPIN_RIGHT, TICK);
        }

        // 200 mm/s differential over 1.5 s on a 258 mm base.
        let expected = -(200.0 * 1.5 / WHEEL_BASE_MM).to_degrees();
        assert_eq!(i64::from(world.odometry().net_angle_deg), whole_units(expected));
        assert!(world.pose().heading_rad < 0.0);
        assert_eq!(world.odometry().net_distance_mm, 0);
    }

    #[test]
    fn head_on_contact_closes_both_bumpers_and_blocks_motion() {
        let mut world = World::new();
        world.add_obstacle(box_ahead(400)).unwrap();

        let mut contact = None;
        for _ in 0..200 {
            contact = world.advance(WheelSpeeds::FORWARD, TICK);
            if contact.is_some() {
                break;
            }
        }

        assert_eq!(contact, Some(BumpSide::Both));

        for _ in 0..10 {
            world.advance(WheelSpeeds::FORWARD, TICK);
        }
        let stopped_at = world.pose().x_mm;
        assert!(stopped_at <= 400.0 - BUMPER_RADIUS_MM);

        assert_eq!(world.advance(WheelSpeeds::FORWARD, TICK), Some(BumpSide::Both));
        assert!((world.pose().x_mm - stopped_at).abs() < 1e-9);
    }

    #[test]
    fn off_axis_contact_closes_one_bumper() {
        let mut world = World::new();
        world.pose.heading_rad = 45f64.to_radians();
        world.pose.x_mm = 400.0 - BUMPER_RADIUS_MM - 1.0;
        world.obstacles.push(Obstacle::from_spec(box_ahead(400)));
        assert_eq!(world.contact(), Some(BumpSide::Right));

        world.pose.heading_rad = -45f64.to_radians();
        assert_eq!(world.contact(), Some(BumpSide::Left));

        world.pose.heading_rad = PI;
        assert_eq!(world.contact(), None);
    }

    #[test]
    fn rejects_obstacle_under_the_robot() {
        let mut world = World::new();
        let spec = ObstacleSpec {
            x: -50,
            y: -50,
            width: 100,
            height: 100,
        };
        assert_eq!(world.add_obstacle(spec), Err(WorldError::OverlapsRobot));
        assert!(world.obstacles().is_empty());
    }

    #[test]
    fn reset_keeps_obstacles_and_zeroes_odometry() {
        let mut world = World::new();
        world.add_obstacle(box_ahead(1_000)).unwrap();
        world.advance(WheelSpeeds::FORWARD, Duration::from_secs(1));
        world.reset_robot();

        assert_eq!(world.odometry(), Odometry::default());
        assert_eq!(world.pose(), Pose::default());
        assert_eq!(world.obstacles().len(), 1);
    }

    #[test]
    fn arena_walls_stop_the_robot() {
        let mut world = World::new();
        let mut contact = None;
        for _ in 0..3_000 {
            contact = world.advance(WheelSpeeds::FORWARD, TICK);
            if contact.is_some() {
                break;
            }
        }
        assert_eq!(contact, Some(BumpSide::Both));
        assert!(world.pose().x_mm < ARENA_SIDE_MM / 2.0);
    }
}
