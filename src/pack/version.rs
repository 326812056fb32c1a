//! Dot-separated numeric versions (`1.12.2`, `3.0.0.4`).

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A malformed version string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseVersionError {
    #[error("version string is empty")]
    Empty,
    #[error("version component {position} ({component:?}) of {input:?} is not a non-negative integer")]
    InvalidComponent {
        input: String,
        position: usize,
        component: String,
    },
}

/// An ordered sequence of non-negative integers, most significant first.
///
/// Versions compare component by component with missing trailing
/// components counting as zero, so `1.2` and `1.2.0` are equal.
#[derive(Debug, Clone, Default)]
pub struct Version(Vec<u64>);

impl Version {
    pub fn is_greater(&self, other: &Version) -> bool {
        self > other
    }

    pub fn is_smaller(&self, other: &Version) -> bool {
        self < other
    }

    /// Parses both strings and compares `a` against `b`.
    pub fn parse_and_compare(a: &str, b: &str) -> Result<Ordering, ParseVersionError> {
        Ok(a.parse::<Version>()?.cmp(&b.parse::<Version>()?))
    }
}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseVersionError::Empty);
        }

        s.split('.')
            .enumerate()
            .map(|(position, component)| {
                let invalid = || ParseVersionError::InvalidComponent {
                    input: s.to_string(),
                    position,
                    component: component.to_string(),
                };
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                component.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Version)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|i| {
                let a = self.0.get(i).copied().unwrap_or(0);
                let b = other.0.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_and_format() {
        for s in ["1", "1.2", "1.2.0.4", "0.0.0", "10.20.30", "2019.12.31.235959"] {
            assert_eq!(v(s).to_string(), s);
        }
        assert_eq!(v("1.2.0.4").0, vec![1, 2, 0, 4]);
    }

    #[test]
    fn test_format_canonicalizes_leading_zeros() {
        assert_eq!(v("01.002").to_string(), "1.2");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!("".parse::<Version>(), Err(ParseVersionError::Empty));
        for bad in ["1.x", "1..2", "1.2.", ".1", "v1.0", "1.-2", "+1", " 1", "1.2-rc1"] {
            assert!(bad.parse::<Version>().is_err(), "{:?} should not parse", bad);
        }

        match "1.2.beta".parse::<Version>() {
            Err(ParseVersionError::InvalidComponent {
                position, component, ..
            }) => {
                assert_eq!(position, 2);
                assert_eq!(component, "beta");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_compare_basic() {
        assert!(v("1.2.1") > v("1.2.0"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("2") > v("1.99.99"));
        assert!(v("0.9.9") < v("1"));
        assert!(v("1.2.3").is_greater(&v("1.2.2")));
        assert!(v("1.2.2").is_smaller(&v("1.2.3")));
    }

    #[test]
    fn test_compare_missing_trailing_components_are_zero() {
        assert_eq!(v("1.2"), v("1.2.0"));
        assert_eq!(v("1.2"), v("1.2.0.0"));
        assert_eq!(v("1.2").cmp(&v("1.2.0.0")), Ordering::Equal);
        assert!(v("1.2.0.1") > v("1.2"));
        assert!(v("1.2") < v("1.2.0.1"));
        assert!(v("1.3") > v("1.2.9.9"));
    }

    #[test]
    fn test_compare_reflexive_antisymmetric_transitive() {
        let samples: Vec<Version> = ["0", "0.1", "1", "1.0.0", "1.0.1", "1.2", "1.10", "2.0.0.1"]
            .iter()
            .map(|s| v(s))
            .collect();

        for a in &samples {
            assert_eq!(a.cmp(a), Ordering::Equal);
            for b in &samples {
                assert_eq!(a.cmp(b), b.cmp(a).reverse());
                for c in &samples {
                    if a <= b && b <= c {
                        assert!(a <= c, "{} <= {} <= {} but not {} <= {}", a, b, c, a, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_parse_and_compare() {
        assert_eq!(
            Version::parse_and_compare("1.0.1", "1.0.0"),
            Ok(Ordering::Greater)
        );
        assert_eq!(Version::parse_and_compare("1", "1.0"), Ok(Ordering::Equal));
        assert!(Version::parse_and_compare("1.0", "latest").is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let version: Version = serde_json::from_str("\"1.12.2\"").unwrap();
        assert_eq!(version, v("1.12.2"));
        assert_eq!(serde_json::to_string(&version).unwrap(), "\"1.12.2\"");

        assert!(serde_json::from_str::<Version>("\"1.a\"").is_err());
        assert!(serde_json::from_str::<Version>("12").is_err());
    }
}
