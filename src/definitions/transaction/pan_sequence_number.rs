use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// PAN sequence number: two digits distinguishing cards issued against
/// the same account number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PanSequenceNumber(String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected 2 digits, received '{0}'")]
    Malformed(String),
}

impl PanSequenceNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PanSequenceNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<PanSequenceNumber, Error> {
        if s.len() != 2 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Malformed(s.to_string()));
        }
        Ok(PanSequenceNumber(s.to_string()))
    }
}

impl TryFrom<String> for PanSequenceNumber {
    type Error = Error;

    fn try_from(s: String) -> Result<PanSequenceNumber, Error> {
        s.parse()
    }
}

impl From<PanSequenceNumber> for String {
    fn from(PanSequenceNumber(s): PanSequenceNumber) -> String {
        s
    }
}
