//! Operator console shared by the emulator and scripted transcripts.
//!
//! [`catalog`] lists the commands and help topics; [`grammar`] turns one
//! input line into a [`grammar::Command`] without allocating.

pub mod catalog;
pub mod grammar;

pub use catalog::{CommandSpec, CommandTag, HELP_TOPICS, HelpTopic};
pub use grammar::{Command, ObstacleSpec, ParseError, ProfileSetting, parse};
