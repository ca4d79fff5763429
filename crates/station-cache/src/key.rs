//! Composite cache keys.

use std::fmt;

use chrono::{DateTime, Utc};
use marine_common::Datum;

/// One primitive component of a cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPart {
    Text(String),
    Int(i64),
    /// Unix timestamp in seconds.
    Time(i64),
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Text(s) => f.write_str(s),
            KeyPart::Int(n) => write!(f, "{}", n),
            KeyPart::Time(t) => write!(f, "@{}", t),
        }
    }
}

impl From<&str> for KeyPart {
    fn from(s: &str) -> Self {
        KeyPart::Text(s.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(s: String) -> Self {
        KeyPart::Text(s)
    }
}

impl From<i64> for KeyPart {
    fn from(n: i64) -> Self {
        KeyPart::Int(n)
    }
}

impl From<u32> for KeyPart {
    fn from(n: u32) -> Self {
        KeyPart::Int(i64::from(n))
    }
}

impl From<usize> for KeyPart {
    fn from(n: usize) -> Self {
        KeyPart::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<DateTime<Utc>> for KeyPart {
    fn from(t: DateTime<Utc>) -> Self {
        KeyPart::Time(t.timestamp())
    }
}

impl From<Datum> for KeyPart {
    fn from(d: Datum) -> Self {
        KeyPart::Text(d.as_str().to_string())
    }
}

/// An ordered tuple of primitive values identifying one upstream request.
///
/// Equal request inputs always produce equal keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<KeyPart>);

impl CacheKey {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a component.
    pub fn with(mut self, part: impl Into<KeyPart>) -> Self {
        self.0.push(part.into());
        self
    }

    pub fn parts(&self) -> &[KeyPart] {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_equal_inputs_give_equal_keys() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let a = CacheKey::new()
            .with("8452660")
            .with(start)
            .with(Datum::MeanSeaLevel);
        let b = CacheKey::new()
            .with("8452660".to_string())
            .with(start)
            .with(Datum::MeanSeaLevel);
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_matters() {
        let a = CacheKey::new().with("44013").with(20u32);
        let b = CacheKey::new().with(20u32).with("44013");
        assert_ne!(a, b);
    }

    #[test]
    fn test_text_and_int_do_not_collide() {
        let a = CacheKey::new().with("44013").with("20");
        let b = CacheKey::new().with("44013").with(20u32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display() {
        let key = CacheKey::new()
            .with("44013")
            .with(20u32)
            .with(Datum::MeanLowerLowWater);
        assert_eq!(key.to_string(), "44013:20:mean_lower_low_water");
    }
}
