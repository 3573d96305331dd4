use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Three digit service code from track data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceCode(String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected 3 digits, received '{0}'")]
    Malformed(String),
}

impl ServiceCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ServiceCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<ServiceCode, Error> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Malformed(s.to_string()));
        }
        Ok(ServiceCode(s.to_string()))
    }
}

impl TryFrom<String> for ServiceCode {
    type Error = Error;

    fn try_from(s: String) -> Result<ServiceCode, Error> {
        s.parse()
    }
}

impl From<ServiceCode> for String {
    fn from(ServiceCode(s): ServiceCode) -> String {
        s
    }
}
