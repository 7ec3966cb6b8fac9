use cirrus_parser::{Message, ParsingError};

/// Registration parameters, sent right after connecting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    /// `PASS *` is sent when there is none.
    pub password: Option<String>,
    pub mode: u8,
    pub nickname: String,
    pub username: String,
    pub realname: String,
}

impl Login {
    pub fn messages(&self) -> Result<[Message; 3], ParsingError> {
        let password = self.password.as_deref().unwrap_or("*");
        Ok([
            Message::pass(password)?,
            Message::nick(self.nickname.as_str())?,
            Message::user(self.username.as_str(), self.mode, self.realname.as_str())?,
        ])
    }
}
