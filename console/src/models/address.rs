//! Console network addresses

use std::fmt;
use std::net::IpAddr;

use crate::errors::ConsoleError;

const MAX_HOST_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// A validated console address: an IP literal or a DNS host name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    /// Validate `raw` as a console address.
    ///
    /// Fails with `InvalidArgument` on the `address` parameter.
    pub fn parse(raw: &str) -> Result<Self, ConsoleError> {
        if raw.is_empty() {
            return Err(ConsoleError::invalid_argument("address", "must not be empty"));
        }

        if raw.parse::<IpAddr>().is_ok() || is_host_name(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(ConsoleError::invalid_argument(
                "address",
                format!("'{}' is neither an IP address nor a host name", raw),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_host_name(raw: &str) -> bool {
    if raw.len() > MAX_HOST_NAME_LEN {
        return false;
    }

    // All digits and dots is a mistyped IPv4 literal, not a name
    if raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return false;
    }

    // An absolute name ends with the root label
    let name = raw.strip_suffix('.').unwrap_or(raw);
    name.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= MAX_LABEL_LEN
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DeviceAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
