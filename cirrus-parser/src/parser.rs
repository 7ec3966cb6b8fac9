use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_until},
    character::complete::char,
    combinator::{map, opt, rest},
    sequence::{preceded, separated_pair},
    IResult,
};

use crate::{Message, Origin, Parameters, ParsingError, MAX_PARAMETERS};

const TRAILING_MARKER: &str = " :";

// prefix ::= ':' <anything but space> [SPACE]
fn parse_prefix(buf: &str) -> IResult<&str, &str> {
    let (buf, prefix) = preceded(char(':'), take_till(|c: char| c == ' '))(buf)?;
    let (buf, _) = opt(char(' '))(buf)?;
    Ok((buf, prefix))
}

// body ::= <command and parameters> [" :" <trailing>]
// the first " :" wins, the trailing may contain more of them
fn split_trailing(buf: &str) -> IResult<&str, (&str, Option<&str>)> {
    let with_trailing = map(
        separated_pair(take_until(TRAILING_MARKER), tag(TRAILING_MARKER), rest),
        |(region, trailing)| (region, Some(trailing)),
    );
    let without_trailing = map(rest, |region| (region, None));
    alt((with_trailing, without_trailing))(buf)
}

// message ::= [':' <prefix> SPACE] <command> *(SPACE <parameter>) [" :" <trailing>]
pub fn parse_message(line: &str) -> Result<Message, ParsingError> {
    let (buf, prefix) = opt(parse_prefix)(line).map_err(|_| ParsingError::MissingCommand)?;
    // the space closing the prefix may also open the trailing marker
    if prefix.is_some() && buf.starts_with(':') {
        return Err(ParsingError::MissingCommand);
    }
    let (_, (region, trailing)) = split_trailing(buf).map_err(|_| ParsingError::MissingCommand)?;

    let origin = prefix.map(Origin::from_prefix_text).transpose()?;

    let mut tokens = region.split(' ');
    let command = match tokens.next() {
        Some(command) if !command.is_empty() => command,
        _ => return Err(ParsingError::MissingCommand),
    };

    let parameters: Parameters = tokens.map(str::to_string).collect();
    let count = parameters.len() + usize::from(trailing.is_some());
    if count > MAX_PARAMETERS {
        return Err(ParsingError::TooManyParameters { count });
    }

    Ok(Message {
        origin,
        command: command.to_string(),
        parameters,
        trailing: trailing.map(str::to_string),
    })
}

pub(crate) fn write_message(f: &mut impl fmt::Write, message: &Message) -> fmt::Result {
    if let Some(origin) = &message.origin {
        write!(f, ":{origin} ")?;
    }
    f.write_str(&message.command)?;
    for parameter in &message.parameters {
        write!(f, " {parameter}")?;
    }
    if let Some(trailing) = &message.trailing {
        write!(f, "{TRAILING_MARKER}{trailing}")?;
    }
    Ok(())
}
