use crate::error::ConversionError;
use std::{fmt, net::IpAddr, str::FromStr};

///
/// Inet
///
/// Host address with an optional network prefix, `10.0.0.1/24` style.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Inet {
    pub addr: IpAddr,
    pub prefix: Option<u8>,
}

impl Inet {
    #[must_use]
    pub const fn new(addr: IpAddr, prefix: Option<u8>) -> Self {
        Self { addr, prefix }
    }

    // max_prefix
    const fn max_prefix(&self) -> u8 {
        match self.addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        }
    }
}

impl Default for Inet {
    fn default() -> Self {
        Self::new(IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED), None)
    }
}

impl FromStr for Inet {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConversionError::Inet(s.to_string());

        let (addr, prefix) = match s.split_once('/') {
            Some((addr, prefix)) => (addr, Some(prefix.parse::<u8>().map_err(|_| invalid())?)),
            None => (s, None),
        };
        let inet = Self::new(addr.parse().map_err(|_| invalid())?, prefix);

        match inet.prefix {
            Some(p) if p > inet.max_prefix() => Err(invalid()),
            _ => Ok(inet),
        }
    }
}

impl fmt::Display for Inet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix {
            Some(prefix) => write!(f, "{}/{prefix}", self.addr),
            None => write!(f, "{}", self.addr),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hosts_and_networks() {
        for text in ["10.0.0.1", "10.0.0.0/8", "::1", "fe80::/10"] {
            let inet: Inet = text.parse().expect("valid inet");
            assert_eq!(inet.to_string(), text, "display should round trip");
        }
    }

    #[test]
    fn rejects_bad_prefixes_and_hosts() {
        for text in ["10.0.0.1/33", "::1/129", "10.0.0/8", "host", "10.0.0.1/x"] {
            assert!(text.parse::<Inet>().is_err(), "{text} should be rejected");
        }
    }
}
