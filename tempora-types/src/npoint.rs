use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A position on a route of a network, given as a route id and a relative
/// position in `[0, 1]` along the route.
///
/// # Examples
///
/// ```
/// use tempora_types::NPoint;
///
/// let np = NPoint::new(7, 0.25);
/// assert!(np.is_valid());
/// assert_eq!(np.to_string(), "NPoint(7,0.25)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NPoint {
    pub rid: i64,
    pub pos: f64,
}

impl NPoint {
    pub fn new(rid: i64, pos: f64) -> Self {
        Self { rid, pos }
    }

    /// True when the position lies within `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        (0.0..=1.0).contains(&self.pos)
    }

    /// True when both points lie on the same route.
    pub fn same_route(&self, other: &NPoint) -> bool {
        self.rid == other.rid
    }
}

impl fmt::Display for NPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NPoint({},{})", self.rid, self.pos)
    }
}

/// Error returned when a network point literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NPointParseError(String);

impl fmt::Display for NPointParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid network point literal: {}", self.0)
    }
}

impl std::error::Error for NPointParseError {}

impl FromStr for NPoint {
    type Err = NPointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || NPointParseError(s.to_string());
        let trimmed = s.trim();
        let prefix_len = "NPOINT".len();
        let head = trimmed.get(..prefix_len).ok_or_else(err)?;
        if !head.eq_ignore_ascii_case("NPOINT") {
            return Err(err());
        }
        let body = trimmed[prefix_len..]
            .trim_start()
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(err)?;
        let (rid, pos) = body.split_once(',').ok_or_else(err)?;
        let rid = rid.trim().parse::<i64>().map_err(|_| err())?;
        let pos = pos.trim().parse::<f64>().map_err(|_| err())?;
        Ok(NPoint::new(rid, pos))
    }
}
