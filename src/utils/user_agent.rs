//! User-agent parsing with `"unknown"` sentinels.

use crate::domain::entities::UNKNOWN;
use woothee::parser::Parser;

/// Parsed user-agent fields. Every field is always present; unparseable
/// input yields the `"unknown"` sentinel, which the aggregation engine
/// counts as a literal value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub browser: String,
    pub os: String,
    pub device: String,
}

impl Default for UserAgentInfo {
    fn default() -> Self {
        Self {
            browser: UNKNOWN.to_string(),
            os: UNKNOWN.to_string(),
            device: UNKNOWN.to_string(),
        }
    }
}

/// Parses a raw user-agent string.
///
/// Woothee reports unidentified fields as `"UNKNOWN"`; those are folded into
/// the lowercase sentinel so distribution keys stay uniform.
pub fn parse_user_agent(raw: Option<&str>) -> UserAgentInfo {
    let Some(raw) = raw else {
        return UserAgentInfo::default();
    };

    let parser = Parser::new();
    let Some(result) = parser.parse(raw) else {
        return UserAgentInfo::default();
    };

    let clean = |s: &str| {
        if s.is_empty() || s == "UNKNOWN" {
            UNKNOWN.to_string()
        } else {
            s.to_string()
        }
    };

    UserAgentInfo {
        browser: clean(result.name),
        os: clean(result.os),
        device: clean(result.category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIREFOX_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";

    #[test]
    fn test_parses_common_browser() {
        let info = parse_user_agent(Some(FIREFOX_LINUX));
        assert_eq!(info.browser, "Firefox");
        assert_eq!(info.os, "Linux");
        assert_eq!(info.device, "pc");
    }

    #[test]
    fn test_missing_header_yields_sentinels() {
        let info = parse_user_agent(None);
        assert_eq!(info.browser, UNKNOWN);
        assert_eq!(info.os, UNKNOWN);
        assert_eq!(info.device, UNKNOWN);
    }

    #[test]
    fn test_garbage_yields_sentinels() {
        let info = parse_user_agent(Some("definitely-not-a-user-agent"));
        assert_eq!(info.browser, UNKNOWN);
        assert_eq!(info.device, UNKNOWN);
    }
}
