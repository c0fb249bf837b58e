//! Validated contact field types for shipping addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly the expected number of digits.
    #[error("phone number must be exactly {expected} digits")]
    WrongLength {
        /// Required digit count.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NonDigit,
}

/// A 10-digit mobile phone number.
///
/// ## Examples
///
/// ```
/// use bagworks_core::Phone;
///
/// assert!(Phone::parse("9876543210").is_ok());
/// assert!(Phone::parse("98765").is_err());      // too short
/// assert!(Phone::parse("98765-43210").is_err()); // non-digit
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required digit count for a mobile number.
    pub const DIGITS: usize = 10;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit
    /// characters, or is not exactly 10 digits.
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }
        if s.chars().any(|c| !c.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }
        if s.len() != Self::DIGITS {
            return Err(PhoneError::WrongLength {
                expected: Self::DIGITS,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing a [`Pincode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PincodeError {
    /// The input string is empty.
    #[error("pincode cannot be empty")]
    Empty,
    /// The input is not exactly the expected number of digits.
    #[error("pincode must be exactly {expected} digits")]
    WrongLength {
        /// Required digit count.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("pincode must contain only digits")]
    NonDigit,
}

/// A 6-digit postal pincode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Pincode(String);

impl Pincode {
    /// Required digit count for a pincode.
    pub const DIGITS: usize = 6;

    /// Parse a `Pincode` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, contains non-digit
    /// characters, or is not exactly 6 digits.
    pub fn parse(s: &str) -> Result<Self, PincodeError> {
        if s.is_empty() {
            return Err(PincodeError::Empty);
        }
        if s.chars().any(|c| !c.is_ascii_digit()) {
            return Err(PincodeError::NonDigit);
        }
        if s.len() != Self::DIGITS {
            return Err(PincodeError::WrongLength {
                expected: Self::DIGITS,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the pincode as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Pincode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Pincode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Pincode {
    type Err = PincodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Pincode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_phone() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_parse_phone_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_phone_wrong_length() {
        assert!(matches!(
            Phone::parse("12345"),
            Err(PhoneError::WrongLength { expected: 10 })
        ));
        assert!(matches!(
            Phone::parse("12345678901"),
            Err(PhoneError::WrongLength { expected: 10 })
        ));
    }

    #[test]
    fn test_parse_phone_non_digit() {
        assert!(matches!(
            Phone::parse("98765-4321"),
            Err(PhoneError::NonDigit)
        ));
        assert!(matches!(
            Phone::parse("+919876543"),
            Err(PhoneError::NonDigit)
        ));
    }

    #[test]
    fn test_parse_valid_pincode() {
        let pin = Pincode::parse("560001").unwrap();
        assert_eq!(pin.as_str(), "560001");
    }

    #[test]
    fn test_parse_pincode_wrong_length() {
        assert!(matches!(
            Pincode::parse("5600"),
            Err(PincodeError::WrongLength { expected: 6 })
        ));
    }

    #[test]
    fn test_parse_pincode_non_digit() {
        assert!(matches!(
            Pincode::parse("56000a"),
            Err(PincodeError::NonDigit)
        ));
    }

    #[test]
    fn test_serde_transparent() {
        let phone = Phone::parse("9876543210").unwrap();
        assert_eq!(serde_json::to_string(&phone).unwrap(), "\"9876543210\"");
    }
}
