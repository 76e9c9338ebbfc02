//! VID:PID device filters
//!
//! Filter strings look like `0x1234:0x5678`. Either side may be `*`. An
//! empty filter set matches every device.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// A single `VID:PID` rule; `None` is a wildcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterRule {
    pub vendor_id: Option<u16>,
    pub product_id: Option<u16>,
}

impl FilterRule {
    pub fn matches(&self, vendor_id: u16, product_id: u16) -> bool {
        self.vendor_id.is_none_or(|v| v == vendor_id)
            && self.product_id.is_none_or(|p| p == product_id)
    }
}

impl FromStr for FilterRule {
    type Err = Error;

    fn from_str(filter: &str) -> Result<Self> {
        let invalid = |reason: String| Error::Filter {
            filter: filter.to_string(),
            reason,
        };

        let (vid, pid) = filter.split_once(':').ok_or_else(|| {
            invalid("expected VID:PID (e.g. '0x1234:0x5678' or '0x1234:*')".to_string())
        })?;

        Ok(Self {
            vendor_id: parse_id(vid, "VID").map_err(invalid)?,
            product_id: parse_id(pid, "PID").map_err(invalid)?,
        })
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.vendor_id {
            Some(v) => write!(f, "{:#06x}", v)?,
            None => write!(f, "*")?,
        }
        write!(f, ":")?;
        match self.product_id {
            Some(p) => write!(f, "{:#06x}", p),
            None => write!(f, "*"),
        }
    }
}

fn parse_id(id: &str, name: &str) -> std::result::Result<Option<u16>, String> {
    if id == "*" {
        return Ok(None);
    }

    let hex = id
        .strip_prefix("0x")
        .or_else(|| id.strip_prefix("0X"))
        .ok_or_else(|| format!("{} '{}' must start with '0x'", name, id))?;

    if hex.is_empty() || hex.len() > 4 {
        return Err(format!("{} '{}' must have 1-4 hex digits", name, id));
    }

    u16::from_str_radix(hex, 16)
        .map(Some)
        .map_err(|_| format!("{} '{}' is not a valid hex number", name, id))
}

/// A set of rules; a device passes if any rule matches
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceFilter {
    rules: Vec<FilterRule>,
}

impl DeviceFilter {
    /// Parse every filter string. The first invalid one is returned as an error.
    pub fn parse<S: AsRef<str>>(filters: &[S]) -> Result<Self> {
        let rules = filters
            .iter()
            .map(|f| f.as_ref().parse())
            .collect::<Result<Vec<_>>>()?;
        debug!("Parsed {} device filter(s)", rules.len());
        Ok(Self { rules })
    }

    pub fn allows(&self, vendor_id: u16, product_id: u16) -> bool {
        self.rules.is_empty() || self.rules.iter().any(|r| r.matches(vendor_id, product_id))
    }

    pub fn rules(&self) -> &[FilterRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_logic() {
        let filter = DeviceFilter::parse(&["0x1234:0x5678", "0xABCD:*"]).unwrap();

        assert!(filter.allows(0x1234, 0x5678));
        assert!(filter.allows(0xABCD, 0x1111));
        assert!(filter.allows(0xABCD, 0x9999));

        assert!(!filter.allows(0x1234, 0x9999));
        assert!(!filter.allows(0x9999, 0x5678));
        assert!(!filter.allows(0x0000, 0x0000));
    }

    #[test]
    fn test_empty_filter_allows_all() {
        let filter = DeviceFilter::parse::<&str>(&[]).unwrap();
        assert!(filter.allows(0x1234, 0x5678));
        assert!(filter.rules().is_empty());
    }

    #[test]
    fn test_vendor_wildcard() {
        let rule: FilterRule = "*:0x0042".parse().unwrap();
        assert_eq!(rule.vendor_id, None);
        assert_eq!(rule.product_id, Some(0x42));
        assert!(rule.matches(0x04f9, 0x0042));
        assert!(!rule.matches(0x04f9, 0x0043));
    }

    #[test]
    fn test_invalid_filters() {
        assert!("1234:5678".parse::<FilterRule>().is_err());
        assert!("0x1234".parse::<FilterRule>().is_err());
        assert!("0x:0x1".parse::<FilterRule>().is_err());
        assert!("0x12345:*".parse::<FilterRule>().is_err());
        assert!("0xGGGG:*".parse::<FilterRule>().is_err());
    }

    #[test]
    fn test_display() {
        let rule: FilterRule = "0x4f9:*".parse().unwrap();
        assert_eq!(rule.to_string(), "0x04f9:*");
    }
}
