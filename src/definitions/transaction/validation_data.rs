use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The computed dCVV2: a three digit decimal string. Produced by the
/// codec, returned to the caller, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ValidationData(String);

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("expected a 3 digit value")]
    Malformed,
}

impl ValidationData {
    /// Constructor for the codec, which only ever produces well formed
    /// digit strings.
    pub(crate) fn from_digits(digits: String) -> Self {
        debug_assert!(digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()));
        ValidationData(digits)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ValidationData {
    type Err = Error;

    fn from_str(s: &str) -> Result<ValidationData, Error> {
        if s.len() != 3 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Malformed);
        }
        Ok(ValidationData(s.to_string()))
    }
}

impl TryFrom<String> for ValidationData {
    type Error = Error;

    fn try_from(s: String) -> Result<ValidationData, Error> {
        s.parse()
    }
}

impl From<ValidationData> for String {
    fn from(ValidationData(s): ValidationData) -> String {
        s
    }
}

impl fmt::Display for ValidationData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_three_digits_only() {
        assert!("221".parse::<ValidationData>().is_ok());
        assert!("22".parse::<ValidationData>().is_err());
        assert!("2211".parse::<ValidationData>().is_err());
        assert!("22a".parse::<ValidationData>().is_err());
    }
}
