//! Client build numbers (`expansion.major.minor.build`) and inclusive ranges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Build {
    pub expansion: u32,
    pub major: u32,
    pub minor: u32,
    pub build: u32,
}

impl Build {
    pub fn new(expansion: u32, major: u32, minor: u32, build: u32) -> Self {
        Build {
            expansion,
            major,
            minor,
            build,
        }
    }
}

impl FromStr for Build {
    type Err = Diagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| {
            Diagnostic::error(
                DiagnosticCode::D2C0002InvalidBuild,
                format!("invalid build {s:?}: {why}"),
            )
        };

        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 4 {
            return Err(invalid("expected four dot-separated components"));
        }
        let mut nums = [0u32; 4];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u32>()
                .map_err(|_| invalid(&format!("component {part:?} is not a number")))?;
        }
        Ok(Build::new(nums[0], nums[1], nums[2], nums[3]))
    }
}

impl fmt::Display for Build {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.expansion, self.major, self.minor, self.build
        )
    }
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRange {
    pub min: Build,
    pub max: Build,
}

impl BuildRange {
    pub fn contains(&self, build: &Build) -> bool {
        self.min <= *build && *build <= self.max
    }
}

impl FromStr for BuildRange {
    type Err = Diagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((min, max)) = s.split_once('-') else {
            return Err(Diagnostic::error(
                DiagnosticCode::D2C0002InvalidBuild,
                format!("invalid build range {s:?}: expected <min>-<max>"),
            ));
        };
        Ok(BuildRange {
            min: min.parse()?,
            max: max.parse()?,
        })
    }
}

impl fmt::Display for BuildRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_four_components() {
        let b: Build = "10.0.2.45969".parse().expect("valid build");
        assert_eq!(b, Build::new(10, 0, 2, 45969));
        assert_eq!(b.to_string(), "10.0.2.45969");
    }

    #[test]
    fn rejects_short_build() {
        let err = "10.0.2".parse::<Build>().expect_err("three components");
        assert_eq!(err.code, DiagnosticCode::D2C0002InvalidBuild);
    }

    #[test]
    fn rejects_non_numeric_component() {
        let err = "10.0.x.1".parse::<Build>().expect_err("non-numeric");
        assert!(err.message.contains("\"x\""), "{}", err.message);
    }

    #[test]
    fn ordering_is_component_wise() {
        let a: Build = "9.2.7.45745".parse().unwrap();
        let b: Build = "10.0.0.1".parse().unwrap();
        assert!(a < b);
    }

    #[test]
    fn range_is_inclusive() {
        let r: BuildRange = "10.0.2.45000-10.0.2.46000".parse().expect("range");
        assert!(r.contains(&"10.0.2.45000".parse().unwrap()));
        assert!(r.contains(&"10.0.2.46000".parse().unwrap()));
        assert!(!r.contains(&"10.0.2.46001".parse().unwrap()));
        assert!(!r.contains(&"10.0.5.45500".parse().unwrap()));
    }
}
