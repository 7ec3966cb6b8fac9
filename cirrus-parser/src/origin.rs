use std::{fmt, str::FromStr};

use crate::{ParsingError, has_forbidden_char};

///
/// Source of a message: either `name!user@host` or a bare server name.
///
/// A `user` is never present without a `name`.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    name: Option<String>,
    user: Option<String>,
    host: String,
}

impl Origin {
    pub fn from_host(host: impl Into<String>) -> Self {
        Self {
            name: None,
            user: None,
            host: host.into(),
        }
    }

    pub fn from_parts(
        name: impl Into<String>,
        user: Option<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            user,
            host: host.into(),
        }
    }

    /// Parse a prefix, with or without its leading `:`.
    ///
    /// `name!user@host` gives all three parts, `name!host` (no `@` after the `!`) is
    /// tolerated and gives no user, anything without a `!` is a bare host.
    pub fn parse(prefix: &str) -> Result<Self, ParsingError> {
        let prefix = prefix.strip_prefix(':').unwrap_or(prefix);
        Origin::from_prefix_text(prefix)
    }

    /// Same as [`Origin::parse`] for a prefix whose leading `:` is already gone, so that
    /// a `:` starting the text itself is kept.
    pub(crate) fn from_prefix_text(prefix: &str) -> Result<Self, ParsingError> {
        if prefix.is_empty() {
            return Err(ParsingError::EmptyOrigin);
        }

        let origin = match prefix.split_once('!') {
            Some((name, rest)) => match rest.split_once('@') {
                Some((user, host)) => Origin::from_parts(name, Some(user.to_string()), host),
                None => Origin::from_parts(name, None, rest),
            },
            None => Origin::from_host(prefix),
        };
        Ok(origin)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The nickname when this origin is a user, `None` for a server.
    pub fn nickname(&self) -> Option<&str> {
        self.name()
    }

    /// Whether the origin would be read back as the same parts once written in a prefix.
    pub(crate) fn is_writable(&self) -> bool {
        let fits = |part: &str| !part.contains(' ') && !has_forbidden_char(part);
        let host_fits = match (&self.name, &self.user) {
            (None, _) => !self.host.is_empty() && !self.host.contains('!'),
            (Some(_), None) => !self.host.contains('@'),
            (Some(_), Some(_)) => true,
        };
        let name_fits = self
            .name
            .as_deref()
            .is_none_or(|name| fits(name) && !name.contains('!'));
        let user_fits = self
            .user
            .as_deref()
            .is_none_or(|user| fits(user) && !user.contains('@'));

        host_fits && name_fits && user_fits && fits(&self.host)
    }
}

impl FromStr for Origin {
    type Err = ParsingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Origin::parse(s)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{name}!")?;
            if let Some(user) = &self.user {
                write!(f, "{user}@")?;
            }
        }
        f.write_str(&self.host)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Origin;
    use crate::ParsingError;

    #[test]
    fn server_name() {
        let origin = Origin::parse("irc.example.net").unwrap();
        assert_eq!(origin.name(), None);
        assert_eq!(origin.user(), None);
        assert_eq!(origin.host(), "irc.example.net");
    }

    #[test]
    fn full_mask() {
        let origin = Origin::parse(":nick!user@host").unwrap();
        assert_eq!(origin.name(), Some("nick"));
        assert_eq!(origin.user(), Some("user"));
        assert_eq!(origin.host(), "host");
    }

    #[test]
    fn name_without_user() {
        let origin = Origin::parse("nick!host.example").unwrap();
        assert_eq!(origin.name(), Some("nick"));
        assert_eq!(origin.user(), None);
        assert_eq!(origin.host(), "host.example");
    }

    #[test]
    fn at_before_bang_is_part_of_the_name() {
        let origin = Origin::parse("a@b!c").unwrap();
        assert_eq!(origin.name(), Some("a@b"));
        assert_eq!(origin.user(), None);
        assert_eq!(origin.host(), "c");
    }

    #[rstest]
    #[case("")]
    #[case(":")]
    fn empty(#[case] prefix: &str) {
        assert_eq!(Origin::parse(prefix), Err(ParsingError::EmptyOrigin));
    }

    #[test]
    fn colon_inside_the_text_is_kept() {
        let origin = Origin::from_prefix_text(":x").unwrap();
        assert_eq!(origin.host(), ":x");
        assert_eq!(origin.to_string(), ":x");
    }

    #[rstest]
    #[case(Origin::from_host("irc.example.net"), true)]
    #[case(Origin::from_parts("nick", Some("user".to_string()), "host"), true)]
    #[case(Origin::from_parts("nick", None, "host"), true)]
    #[case(Origin::from_host(""), false)]
    #[case(Origin::from_host("a b"), false)]
    #[case(Origin::from_host("host\r\nQUIT"), false)]
    #[case(Origin::from_host("nick!host"), false)]
    #[case(Origin::from_parts("ni!ck", None, "host"), false)]
    #[case(Origin::from_parts("nick", Some("us@er".to_string()), "host"), false)]
    #[case(Origin::from_parts("nick", None, "user@host"), false)]
    #[case(Origin::from_parts("nick", Some("user".to_string()), "ho st"), false)]
    fn writable(#[case] origin: Origin, #[case] expected: bool) {
        assert_eq!(origin.is_writable(), expected);
    }

    #[rstest]
    #[case("irc.example.net")]
    #[case("nick!user@host")]
    #[case("nick!host")]
    #[case("nick!user@host@extra")]
    #[case("!@")]
    fn display_restores_the_prefix(#[case] prefix: &str) {
        let origin: Origin = prefix.parse().unwrap();
        assert_eq!(origin.to_string(), prefix);
    }
}
