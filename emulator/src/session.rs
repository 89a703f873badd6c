use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use navigation_core::console::{self, Command, ObstacleSpec, ProfileSetting, catalog};
use navigation_core::drive::WheelSpeeds;
use navigation_core::profile::{ManeuverProfile, ProfileField};
use navigation_core::sensors::{BumpSide, SensorSnapshot};
use navigation_core::statechart::{CycleInput, NavigationStatechart};
use navigation_core::telemetry::{TelemetryInstant, TelemetryRecorder, TransitionRecord};

use crate::world::{World, WorldError};

/// Simulated control period, matching the firmware loop.
pub const CONTROL_PERIOD: Duration = Duration::from_millis(15);

const DEFAULT_LOG_COUNT: usize = 10;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TranscriptProfile {
    Console,
    Obstacle,
    Pause,
}

impl TranscriptProfile {
    pub fn log_path(self) -> &'static str {
        match self {
            TranscriptProfile::Console => "transcripts/emulator-console.log",
            TranscriptProfile::Obstacle => "transcripts/emulator-obstacle.log",
            TranscriptProfile::Pause => "transcripts/emulator-pause.log",
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            TranscriptProfile::Console => "iRobot Navigation Emulator console transcript",
            TranscriptProfile::Obstacle => "iRobot Navigation Emulator obstacle recovery transcript",
            TranscriptProfile::Pause => "iRobot Navigation Emulator pause/resume transcript",
        }
    }

    pub fn from_tag(tag: &str) -> Result<Self, String> {
        if tag.eq_ignore_ascii_case("console") {
            Ok(Self::Console)
        } else if tag.eq_ignore_ascii_case("obstacle") {
            Ok(Self::Obstacle)
        } else if tag.eq_ignore_ascii_case("pause") {
            Ok(Self::Pause)
        } else {
            Err(format!("Unknown transcript profile `{tag}`"))
        }
    }
}

/// Simulated clock reading: control cycles elapsed times [`CONTROL_PERIOD`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SimInstant(Duration);

impl SimInstant {
    fn at_cycle(cycle: u32) -> Self {
        Self(CONTROL_PERIOD * cycle)
    }

    pub fn since_start(self) -> Duration {
        self.0
    }
}

impl TelemetryInstant for SimInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

pub struct Session {
    world: World,
    chart: NavigationStatechart,
    telemetry: TelemetryRecorder<SimInstant>,
    transcript: Option<TranscriptLogger>,
    cycle: u32,
    pause_held: bool,
    forced_bump: Option<BumpSide>,
    speeds: WheelSpeeds,
}

impl Session {
    pub fn new(profile: TranscriptProfile) -> io::Result<Self> {
        let transcript = TranscriptLogger::new(profile)?;
        let mut session = Self::detached();
        session.transcript = Some(transcript);
        Ok(session)
    }

    /// Session that keeps no transcript on disk.
    pub fn detached() -> Self {
        Self {
            world: World::new(),
            chart: NavigationStatechart::new(),
            telemetry: TelemetryRecorder::new(),
            transcript: None,
            cycle: 0,
            pause_held: false,
            forced_bump: None,
            speeds: WheelSpeeds::HALT,
        }
    }

    pub fn chart(&self) -> &NavigationStatechart {
        &self.chart
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let elapsed = self.now().since_start();
        if let Some(transcript) = self.transcript.as_mut() {
            transcript.append_line(elapsed, TranscriptRole::Host, trimmed)?;
        }

        let lines = match console::parse(trimmed) {
            Ok(command) => self.execute(command),
            Err(err) => vec![format!("ERR {err}")],
        };

        self.record_output(elapsed, &lines)?;
        Ok(lines)
    }

    fn execute(&mut self, command: Command<'_>) -> Vec<String> {
        match command {
            Command::Step { cycles } => {
                let mut lines = Vec::new();
                for _ in 0..cycles {
                    self.run_cycle(self.pause_held, &mut lines);
                }
                lines.push(self.summary());
                lines
            }
            Command::Press => {
                self.pause_held = true;
                vec!["pause button held".to_string()]
            }
            Command::Release => {
                self.pause_held = false;
                vec!["pause button released".to_string()]
            }
            Command::Tap => {
                let mut lines = Vec::new();
                self.run_cycle(true, &mut lines);
                self.run_cycle(false, &mut lines);
                self.pause_held = false;
                lines.push(self.summary());
                lines
            }
            Command::Bump(side) => {
                self.forced_bump = Some(side);
                vec![format!("bump {} armed for next cycle", side.label())]
            }
            Command::Obstacle(spec) => vec![self.add_obstacle(spec)],
            Command::Status => self.status_lines(),
            Command::Log { count } => self.log_lines(count.unwrap_or(DEFAULT_LOG_COUNT)),
            Command::Profile(None) => self.profile_lines(),
            Command::Profile(Some(setting)) => self.apply_profile(setting),
            Command::Reset => {
                self.power_cycle(*self.chart.profile());
                vec!["navigator reset to initial".to_string()]
            }
            Command::Help { topic } => help_lines(topic),
        }
    }

    /// Rebuilds the chart around `profile` and puts the robot back at the
    /// start pose. Obstacles stay.
    fn power_cycle(&mut self, profile: ManeuverProfile) {
        self.chart = NavigationStatechart::with_profile(profile);
        self.world.reset_robot();
        self.telemetry.clear();
        self.cycle = 0;
        self.pause_held = false;
        self.forced_bump = None;
        self.speeds = WheelSpeeds::HALT;
    }

    fn apply_profile(&mut self, setting: ProfileSetting) -> Vec<String> {
        let candidate = self.chart.profile().with(setting.field, setting.value);
        if let Err(err) = candidate.validate() {
            return vec![format!("ERR {err}")];
        }

        self.power_cycle(candidate);
        vec![format!(
            "{}={} applied, navigator reset to initial",
            setting.field.name(),
            setting.value
        )]
    }

    fn profile_lines(&self) -> Vec<String> {
        let profile = self.chart.profile();
        ProfileField::ALL
            .into_iter()
            .map(|field| format!("{}={}", field.name(), profile.get(field)))
            .collect()
    }

    fn run_cycle(&mut self, pressed: bool, lines: &mut Vec<String>) {
        let contact = self.forced_bump.take().or_else(|| self.world.contact());
        let sensors = SensorSnapshot::idle()
            .with_bump(contact)
            .with_pause_button(pressed);
        let input = CycleInput::new(self.world.odometry(), sensors).simulated(true);

        let step = self.chart.step(&input);
        if let Some(transition) = step.transition {
            self.telemetry
                .record(self.cycle, transition, step.speeds, self.now());
            if let Some(record) = self.telemetry.latest() {
                lines.push(describe_record(record));
            }
        }

        self.speeds = step.speeds;
        self.world.advance(step.speeds, CONTROL_PERIOD);
        self.cycle = self.cycle.saturating_add(1);
    }

    fn now(&self) -> SimInstant {
        SimInstant::at_cycle(self.cycle)
    }

    fn summary(&self) -> String {
        format!(
            "cycle={} state={} speeds=[{}]",
            self.cycle,
            self.chart.state(),
            self.speeds
        )
    }

    fn add_obstacle(&mut self, spec: ObstacleSpec) -> String {
        match self.world.add_obstacle(spec) {
            Ok(index) => {
                let obstacles = self.world.obstacles();
                format!("obstacle #{index} at {}", obstacles[index - 1])
            }
            Err(WorldError::OverlapsRobot) => {
                format!("ERR {}", WorldError::OverlapsRobot)
            }
        }
    }

    fn status_lines(&self) -> Vec<String> {
        let memory = self.chart.memory();
        let odometry = self.world.odometry();
        vec![
            format!(
                "state={} region={:?} cycle={} pause_button={}",
                self.chart.state(),
                self.chart.state().region(),
                self.cycle,
                if self.pause_held { "held" } else { "up" }
            ),
            format!(
                "recovery={} unpaused={} right_turn={}deg left_turn={}deg",
                memory.phase().label(),
                memory.unpaused_state(),
                memory.right_turn_angle(),
                memory.left_turn_angle()
            ),
            format!(
                "owed distance={}mm angle={}deg segment_start=({}mm, {}deg)",
                memory.distance(),
                memory.angle(),
                memory.distance_at_maneuver_start(),
                memory.angle_at_maneuver_start()
            ),
            format!(
                "odometry=({}mm, {}deg) pose: {} obstacles={}",
                odometry.net_distance_mm,
                odometry.net_angle_deg,
                self.world.pose(),
                self.world.obstacles().len()
            ),
        ]
    }

    fn log_lines(&self, count: usize) -> Vec<String> {
        if self.telemetry.is_empty() {
            return vec!["no transitions recorded".to_string()];
        }

        let records = self.telemetry.to_vec();
        let skip = records.len().saturating_sub(count);
        records[skip..].iter().map(describe_record).collect()
    }

    fn record_output(&mut self, elapsed: Duration, lines: &[String]) -> io::Result<()> {
        if let Some(transcript) = self.transcript.as_mut() {
            for line in lines {
                transcript.append_line(elapsed, TranscriptRole::Emulator, line)?;
            }
        }
        Ok(())
    }
}

fn describe_record(record: &TransitionRecord<SimInstant>) -> String {
    format!(
        "[{:>7} ms] {record}",
        record.timestamp.since_start().as_millis()
    )
}

fn help_lines(topic: Option<&str>) -> Vec<String> {
    let Some(topic) = topic else {
        let mut lines = vec!["commands:".to_string()];
        for spec in catalog::commands() {
            lines.push(format!("  {:<34} {}", spec.usage, spec.summary));
        }
        lines.push(format!("topics: {}", help_topic_list()));
        return lines;
    };

    if let Some(spec) = catalog::find(topic) {
        vec![format!("{}  - {}", spec.usage, spec.summary)]
    } else if let Some(entry) = catalog::help_topic(topic) {
        entry.text.iter().map(|line| (*line).to_string()).collect()
    } else {
        vec![format!(
            "ERR unknown help topic `{topic}`; topics: {}",
            help_topic_list()
        )]
    }
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, topic) in console::HELP_TOPICS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(topic.name);
    }
    buffer
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(profile: TranscriptProfile) -> io::Result<Self> {
        let path = Path::new(profile.log_path());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(profile)?;
        Ok(logger)
    }

    fn write_header(&mut self, profile: TranscriptProfile) -> io::Result<()> {
        writeln!(self.writer, "# {}", profile.header())?;
        writeln!(
            self.writer,
            "# Timestamps are simulated milliseconds ({} ms per control cycle)",
            CONTROL_PERIOD.as_millis()
        )?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(
        &mut self,
        elapsed: Duration,
        role: TranscriptRole,
        line: &str,
    ) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            elapsed.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(&self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
