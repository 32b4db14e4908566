//! Per-request trace identifiers.
//!
//! A [`TraceId`] is minted once for every accepted GET and is attached to
//! every log record and outbound call derived from it. It is only used for
//! correlation, never for routing or lookups.

use std::fmt;
use std::str::FromStr;

use axum::http::HeaderName;
use uuid::Uuid;

/// Header carrying the trace id on the acknowledgment and on every
/// forwarded request.
pub const TRACE_HEADER: HeaderName = HeaderName::from_static("x-correlation-id");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    /// A fresh random (v4) identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for TraceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let ids: HashSet<TraceId> = (0..1000).map(|_| TraceId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn display_parses_back() {
        let id = TraceId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 36);
        assert_eq!(text.parse::<TraceId>().unwrap(), id);
    }

    #[test]
    fn ids_are_random_v4() {
        assert_eq!(TraceId::generate().as_uuid().get_version_num(), 4);
    }
}
