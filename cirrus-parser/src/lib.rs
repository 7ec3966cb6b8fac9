//! Note: IRCv3 message tags are not handled.
use std::{borrow::Cow, fmt, str::FromStr};

use smallvec::SmallVec;

mod error;
mod origin;
mod parser;
mod stream;

pub use crate::error::ParsingError;
pub use crate::origin::Origin;
pub use crate::parser::parse_message;
pub use crate::stream::{LendingIterator, MessageIterator, StreamParser};

/// Parameters of a message, trailing included.
pub const MAX_PARAMETERS: usize = 15;

const CTCP_DELIMITER: char = '\x01';

pub type Parameters = SmallVec<[String; MAX_PARAMETERS]>;

///
/// See: https://modern.ircdocs.horse/#message-format
///
/// A message is immutable once built, either by [`Message::parse`] on inbound lines or
/// by [`Message::builder`] for outbound ones.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    origin: Option<Origin>,
    command: String,
    parameters: Parameters,
    trailing: Option<String>,
}

impl Message {
    pub fn parse(line: &str) -> Result<Self, ParsingError> {
        parse_message(line)
    }

    /// Parse a line received from the network. Invalid UTF-8 is replaced, not rejected.
    pub fn parse_bytes(line: &[u8]) -> Result<Self, ParsingError> {
        let line: Cow<'_, str> = String::from_utf8_lossy(line);
        parse_message(&line)
    }

    pub fn builder(command: impl Into<String>) -> MessageBuilder {
        MessageBuilder {
            origin: None,
            command: command.into(),
            parameters: Parameters::new(),
            trailing: None,
        }
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn first_parameter(&self) -> Option<&str> {
        self.parameters.first().map(String::as_str)
    }

    pub fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref()
    }

    /// The three-digit code of a numeric reply.
    pub fn numeric(&self) -> Option<u16> {
        let command = self.command.as_bytes();
        if command.len() != 3 || !command.iter().all(u8::is_ascii_digit) {
            return None;
        }
        self.command.parse().ok()
    }

    pub fn is_ctcp(&self) -> bool {
        self.ctcp_body().is_some()
    }

    /// Text between the `\x01` delimiters of a CTCP trailing.
    pub fn ctcp_body(&self) -> Option<&str> {
        let trailing = self.trailing.as_deref()?;
        let inner = trailing.strip_prefix(CTCP_DELIMITER)?;
        if inner.is_empty() {
            // a lone delimiter is both the first and the last character
            return Some(inner);
        }
        inner.strip_suffix(CTCP_DELIMITER)
    }
}

impl Message {
    pub fn pass(password: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("PASS").parameter(password).build()
    }

    pub fn nick(nickname: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("NICK").parameter(nickname).build()
    }

    pub fn user(
        username: impl Into<String>,
        mode: impl fmt::Display,
        realname: impl Into<String>,
    ) -> Result<Self, ParsingError> {
        Message::builder("USER")
            .parameter(username)
            .parameter(mode.to_string())
            .parameter("*")
            .trailing(realname)
            .build()
    }

    pub fn join(channel: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("JOIN").parameter(channel).build()
    }

    pub fn part(channel: impl Into<String>, reason: Option<&str>) -> Result<Self, ParsingError> {
        let builder = Message::builder("PART").parameter(channel);
        let builder = match reason {
            Some(reason) => builder.trailing(reason),
            None => builder,
        };
        builder.build()
    }

    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("PRIVMSG")
            .parameter(target)
            .trailing(text)
            .build()
    }

    pub fn notice(target: impl Into<String>, text: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("NOTICE")
            .parameter(target)
            .trailing(text)
            .build()
    }

    pub fn ctcp_reply(target: impl Into<String>, body: &str) -> Result<Self, ParsingError> {
        Message::notice(target, format!("{CTCP_DELIMITER}{body}{CTCP_DELIMITER}"))
    }

    pub fn pong(token: impl Into<String>) -> Result<Self, ParsingError> {
        Message::builder("PONG").trailing(token).build()
    }

    pub fn quit(reason: Option<&str>) -> Result<Self, ParsingError> {
        let builder = Message::builder("QUIT");
        let builder = match reason {
            Some(reason) => builder.trailing(reason),
            None => builder,
        };
        builder.build()
    }
}

impl FromStr for Message {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_message(s)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        parser::write_message(f, self)
    }
}

/// Outbound message under construction. `build()` checks what the wire format cannot
/// express: spaces in the command or in a parameter, a parameter that would read as the
/// trailing, line breaks anywhere, and more than [`MAX_PARAMETERS`] parameters.
#[derive(Debug, Clone)]
#[must_use]
pub struct MessageBuilder {
    origin: Option<Origin>,
    command: String,
    parameters: Parameters,
    trailing: Option<String>,
}

fn has_forbidden_char(s: &str) -> bool {
    s.contains(['\r', '\n', '\0'])
}

impl MessageBuilder {
    pub fn origin(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn parameters<I, S>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parameters.extend(parameters.into_iter().map(Into::into));
        self
    }

    pub fn trailing(mut self, trailing: impl Into<String>) -> Self {
        self.trailing = Some(trailing.into());
        self
    }

    pub fn build(self) -> Result<Message, ParsingError> {
        let command = &self.command;
        if command.is_empty() {
            return Err(ParsingError::MissingCommand);
        }
        if command.starts_with(':') || command.contains(' ') || has_forbidden_char(command) {
            return Err(ParsingError::InvalidCommand {
                command: self.command,
            });
        }

        if let Some(origin) = self.origin.as_ref().filter(|o| !o.is_writable()) {
            return Err(ParsingError::InvalidOrigin {
                origin: origin.to_string(),
            });
        }

        if let Some(parameter) = self
            .parameters
            .iter()
            .find(|p| p.starts_with(':') || p.contains(' ') || has_forbidden_char(p))
        {
            return Err(ParsingError::InvalidParameter {
                parameter: parameter.clone(),
            });
        }
        if let Some(trailing) = self.trailing.as_ref().filter(|t| has_forbidden_char(t)) {
            return Err(ParsingError::InvalidParameter {
                parameter: trailing.clone(),
            });
        }

        let count = self.parameters.len() + usize::from(self.trailing.is_some());
        if count > MAX_PARAMETERS {
            return Err(ParsingError::TooManyParameters { count });
        }

        Ok(Message {
            origin: self.origin,
            command: self.command,
            parameters: self.parameters,
            trailing: self.trailing,
        })
    }
}
