//! Command catalog and help text for the operator console.
//!
//! The parser and the `help` command read the same table so keywords and
//! usage strings cannot drift apart.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTag {
    Step,
    Press,
    Release,
    Tap,
    Bump,
    Obstacle,
    Status,
    Log,
    Profile,
    Reset,
    Help,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tag: CommandTag,
    /// Argument layout shown in help and parse errors.
    pub usage: &'static str,
    pub summary: &'static str,
}

/// Help entry that is not tied to a single command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HelpTopic {
    pub name: &'static str,
    pub text: &'static [&'static str],
}

const COMMANDS: [CommandSpec; 11] = [
    CommandSpec {
        name: "step",
        tag: CommandTag::Step,
        usage: "step [count]",
        summary: "evaluate count control cycles (default 1)",
    },
    CommandSpec {
        name: "press",
        tag: CommandTag::Press,
        usage: "press",
        summary: "hold the pause button down",
    },
    CommandSpec {
        name: "release",
        tag: CommandTag::Release,
        usage: "release",
        summary: "let go of the pause button",
    },
    CommandSpec {
        name: "tap",
        tag: CommandTag::Tap,
        usage: "tap",
        summary: "press the pause button for one cycle, then release it for one cycle",
    },
    CommandSpec {
        name: "bump",
        tag: CommandTag::Bump,
        usage: "bump <left|right|both>",
        summary: "force the bump sensors closed on the next cycle",
    },
    CommandSpec {
        name: "obstacle",
        tag: CommandTag::Obstacle,
        usage: "obstacle <x> <y> <width> <height>",
        summary: "add a box obstacle to the arena (mm, lower-left corner)",
    },
    CommandSpec {
        name: "status",
        tag: CommandTag::Status,
        usage: "status",
        summary: "show state, manoeuvre memory and pose",
    },
    CommandSpec {
        name: "log",
        tag: CommandTag::Log,
        usage: "log [count]",
        summary: "show the most recent transitions",
    },
    CommandSpec {
        name: "profile",
        tag: CommandTag::Profile,
        usage: "profile [<field> <value>]",
        summary: "show the manoeuvre profile, or change one field and power-cycle",
    },
    CommandSpec {
        name: "reset",
        tag: CommandTag::Reset,
        usage: "reset",
        summary: "power-cycle the navigator and return the robot to the start pose",
    },
    CommandSpec {
        name: "help",
        tag: CommandTag::Help,
        usage: "help [topic]",
        summary: "list commands or describe one command or topic",
    },
];

/// Background topics reachable through `help <topic>`.
pub const HELP_TOPICS: [HelpTopic; 2] = [
    HelpTopic {
        name: "pause",
        text: &[
            "The navigator starts paused. Press and release the pause button to run.",
            "Pressing it while running halts the wheels; release, press and release",
            "again to resume in the state that was interrupted.",
        ],
    },
    HelpTopic {
        name: "recovery",
        text: &[
            "On a collision the robot backs off 50 mm and turns right (90 deg both,",
            "30 deg left, 145 deg right bumper). It drives forward 500 mm, turns left,",
            "drives 600 mm past the obstacle, turns left again, drives the clearance",
            "distance and finally turns right to restore its heading.",
        ],
    },
];

/// Returns the full command catalog.
#[must_use]
pub const fn commands() -> &'static [CommandSpec] {
    &COMMANDS
}

/// Finds a command by name (case insensitive).
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

/// Finds a background help topic by name (case insensitive).
#[must_use]
pub fn help_topic(name: &str) -> Option<&'static HelpTopic> {
    HELP_TOPICS
        .iter()
        .find(|topic| topic.name.eq_ignore_ascii_case(name))
}
