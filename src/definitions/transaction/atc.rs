use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Application transaction counter: a two byte counter incremented by
/// the chip on every transaction, carried on the wire as four hex
/// digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Atc([u8; 2]);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected 4 hex digits, received {0} characters")]
    InvalidLength(usize),
    #[error("atc may only contain hex digits")]
    InvalidCharacter,
}

impl Atc {
    pub fn to_bytes(self) -> [u8; 2] {
        self.0
    }
}

impl FromStr for Atc {
    type Err = Error;

    fn from_str(s: &str) -> Result<Atc, Error> {
        if s.len() != 4 {
            return Err(Error::InvalidLength(s.len()));
        }
        let bytes = hex::decode(s).map_err(|_| Error::InvalidCharacter)?;
        Ok(Atc([bytes[0], bytes[1]]))
    }
}

impl TryFrom<String> for Atc {
    type Error = Error;

    fn try_from(s: String) -> Result<Atc, Error> {
        s.parse()
    }
}

impl From<Atc> for String {
    fn from(atc: Atc) -> String {
        atc.to_string()
    }
}

impl fmt::Display for Atc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:02X}{:02X}", self.0[0], self.0[1])
    }
}
