//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a string so secrets never appear in debug output.
///
/// Short strings are redacted entirely; for 12 characters or more only the
/// first and last three are kept. This keeps different redacted values
/// distinguishable without leaking anything useful.
pub struct Redact<'a>(&'a str);

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact(""),
            Some(v) => Redact(v),
        }
    }
}

impl<'a> Debug for Redact<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.len() {
            0 => f.write_str("EMPTY"),
            1..=11 => f.write_str("***"),
            n => {
                f.write_str(&self.0[..3])?;
                f.write_str("***")?;
                f.write_str(&self.0[n - 3..])
            }
        }
    }
}
