use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Card expiry as the four digits personalized on the card (YYMM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Expiry(String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected 4 digits, received '{0}'")]
    Malformed(String),
}

impl Expiry {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Expiry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Expiry, Error> {
        if s.len() != 4 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Malformed(s.to_string()));
        }
        Ok(Expiry(s.to_string()))
    }
}

impl TryFrom<String> for Expiry {
    type Error = Error;

    fn try_from(s: String) -> Result<Expiry, Error> {
        s.parse()
    }
}

impl From<Expiry> for String {
    fn from(Expiry(s): Expiry) -> String {
        s
    }
}
