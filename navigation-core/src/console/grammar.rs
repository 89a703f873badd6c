#![allow(clippy::module_name_repetitions)]

//! Parser for console command lines.
//!
//! Lines are split into whitespace-separated words with `winnow`
//! combinators directly over the `&str`. The first word selects a
//! [`CommandSpec`] from the catalog; the remaining words are parsed
//! according to that command's argument layout.

use core::fmt;

use winnow::ascii::{dec_int, dec_uint, space0, space1};
use winnow::combinator::{opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

use super::catalog::{self, CommandSpec, CommandTag};
use crate::profile::ProfileField;
use crate::sensors::BumpSide;

/// Upper bound accepted by `step` so a typo cannot stall the console.
pub const MAX_STEP_CYCLES: u32 = 100_000;

type PResult<O> = Result<O, ContextError>;

/// Box obstacle in arena coordinates (mm); `x`/`y` name the lower-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObstacleSpec {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// One `profile <field> <value>` assignment. Range checks are left to
/// [`ManeuverProfile::validate`](crate::profile::ManeuverProfile::validate).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProfileSetting {
    pub field: ProfileField,
    pub value: u32,
}

/// Structured commands produced by the parser.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Step { cycles: u32 },
    Press,
    Release,
    Tap,
    Bump(BumpSide),
    Obstacle(ObstacleSpec),
    Status,
    Log { count: Option<usize> },
    Profile(Option<ProfileSetting>),
    Reset,
    Help { topic: Option<&'a str> },
}

/// Reasons a console line is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError<'a> {
    Empty,
    UnknownCommand(&'a str),
    InvalidArgument {
        command: &'static str,
        expected: &'static str,
    },
    TrailingInput(&'a str),
}

impl fmt::Display for ParseError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::UnknownCommand(word) => write!(f, "unknown command `{word}`"),
            ParseError::InvalidArgument { command, expected } => {
                write!(f, "invalid argument for {command}, usage: {expected}")
            }
            ParseError::TrailingInput(rest) => write!(f, "unexpected input `{rest}`"),
        }
    }
}

/// Parse a console command from the provided line.
///
/// # Errors
///
/// Returns [`ParseError`] when the line is blank, names no command, carries
/// malformed arguments, or has words left over after the arguments.
pub fn parse(line: &str) -> Result<Command<'_>, ParseError<'_>> {
    let mut input = line.trim();
    if input.is_empty() {
        return Err(ParseError::Empty);
    }

    let keyword = word(&mut input).map_err(|_| ParseError::Empty)?;
    let spec = catalog::find(keyword).ok_or(ParseError::UnknownCommand(keyword))?;

    let command = arguments(spec, &mut input).map_err(|_| ParseError::InvalidArgument {
        command: spec.name,
        expected: spec.usage,
    })?;

    let rest = input.trim_start();
    if rest.is_empty() {
        Ok(command)
    } else {
        Err(ParseError::TrailingInput(rest))
    }
}

fn arguments<'a>(spec: &CommandSpec, input: &mut &'a str) -> PResult<Command<'a>> {
    match spec.tag {
        CommandTag::Step => {
            let cycles = match optional_word(input)? {
                Some(text) => cycle_count(text)?,
                None => 1,
            };
            Ok(Command::Step { cycles })
        }
        CommandTag::Press => Ok(Command::Press),
        CommandTag::Release => Ok(Command::Release),
        CommandTag::Tap => Ok(Command::Tap),
        CommandTag::Bump => {
            let side = bump_side(required_word(input)?)?;
            Ok(Command::Bump(side))
        }
        CommandTag::Obstacle => {
            let x = coordinate(required_word(input)?)?;
            let y = coordinate(required_word(input)?)?;
            let width = extent(required_word(input)?)?;
            let height = extent(required_word(input)?)?;
            Ok(Command::Obstacle(ObstacleSpec {
                x,
                y,
                width,
                height,
            }))
        }
        CommandTag::Status => Ok(Command::Status),
        CommandTag::Log => {
            let count = optional_word(input)?.map(record_count).transpose()?;
            Ok(Command::Log { count })
        }
        CommandTag::Profile => {
            let Some(name) = optional_word(input)? else {
                return Ok(Command::Profile(None));
            };
            let field = ProfileField::from_name(name).ok_or_else(ContextError::new)?;
            let value = whole_unsigned::<u32>(required_word(input)?)?;
            Ok(Command::Profile(Some(ProfileSetting { field, value })))
        }
        CommandTag::Reset => Ok(Command::Reset),
        CommandTag::Help => {
            let topic = optional_word(input)?;
            Ok(Command::Help { topic })
        }
    }
}

fn word<'a>(input: &mut &'a str) -> PResult<&'a str> {
    take_while(1.., |c: char| !c.is_whitespace()).parse_next(input)
}

fn required_word<'a>(input: &mut &'a str) -> PResult<&'a str> {
    preceded(space1::<_, ContextError>, word).parse_next(input)
}

fn optional_word<'a>(input: &mut &'a str) -> PResult<Option<&'a str>> {
    let found = opt(required_word).parse_next(input)?;
    if found.is_none() {
        space0::<_, ContextError>(input)?;
    }
    Ok(found)
}

fn cycle_count(text: &str) -> PResult<u32> {
    let cycles = whole_unsigned::<u32>(text)?;
    if (1..=MAX_STEP_CYCLES).contains(&cycles) {
        Ok(cycles)
    } else {
        Err(ContextError::new())
    }
}

fn record_count(text: &str) -> PResult<usize> {
    let count = whole_unsigned::<usize>(text)?;
    if count == 0 {
        Err(ContextError::new())
    } else {
        Ok(count)
    }
}

fn coordinate(text: &str) -> PResult<i32> {
    dec_int::<_, i32, ContextError>
        .parse(text)
        .map_err(winnow::error::ParseError::into_inner)
}

fn extent(text: &str) -> PResult<u32> {
    let value = whole_unsigned::<u32>(text)?;
    if value == 0 {
        Err(ContextError::new())
    } else {
        Ok(value)
    }
}

fn whole_unsigned<O>(text: &str) -> PResult<O>
where
    O: winnow::ascii::Uint,
{
    dec_uint::<_, O, ContextError>
        .parse(text)
        .map_err(winnow::error::ParseError::into_inner)
}

fn bump_side(text: &str) -> PResult<BumpSide> {
    [BumpSide::Left, BumpSide::Right, BumpSide::Both]
        .into_iter()
        .find(|side| side.label().eq_ignore_ascii_case(text))
        .ok_or_else(ContextError::new)
}
