//! Host name entry type.

use crate::error::HostNameError;
use std::fmt;
use std::str::FromStr;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated host name or IP literal.
///
/// Holds the name as given (trimmed); a single trailing dot is kept so
/// absolute names stay absolute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostName(String);

impl HostName {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name in absolute form, ending with a dot.
    #[must_use]
    pub fn to_absolute(&self) -> String {
        if self.0.ends_with('.') {
            self.0.clone()
        } else {
            format!("{}.", self.0)
        }
    }
}

impl FromStr for HostName {
    type Err = HostNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let relative = name.strip_suffix('.').unwrap_or(name);

        if relative.is_empty() {
            return Err(HostNameError::Empty);
        }

        if relative.len() > MAX_NAME_LEN {
            return Err(HostNameError::TooLong(relative.len()));
        }

        for label in relative.split('.') {
            if label.is_empty() {
                return Err(HostNameError::EmptyLabel(name.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(HostNameError::LabelTooLong(label.to_string()));
            }
        }

        Ok(HostName(name.to_string()))
    }
}

impl fmt::Display for HostName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HostName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
