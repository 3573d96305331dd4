use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Primary account number: 12 to 19 decimal digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Pan(String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected 12 to 19 digits, received {0} characters")]
    InvalidLength(usize),
    #[error("pan may only contain decimal digits")]
    InvalidCharacter,
}

impl Pan {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First six and last four digits with the middle masked, for log
    /// and audit output. Never used in derivation.
    pub fn masked(&self) -> String {
        let (bin, rest) = self.0.split_at(6);
        let last_four = &rest[rest.len() - 4..];
        format!("{bin}{}{last_four}", "*".repeat(rest.len() - 4))
    }
}

impl FromStr for Pan {
    type Err = Error;

    fn from_str(s: &str) -> Result<Pan, Error> {
        if !(12..=19).contains(&s.len()) {
            return Err(Error::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidCharacter);
        }
        Ok(Pan(s.to_string()))
    }
}

impl TryFrom<String> for Pan {
    type Error = Error;

    fn try_from(s: String) -> Result<Pan, Error> {
        s.parse()
    }
}

impl From<Pan> for String {
    fn from(Pan(s): Pan) -> String {
        s
    }
}
