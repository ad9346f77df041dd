//! Version - 비교 가능한 아티팩트 버전 값 타입
//!
//! `"2"`, `"2.0"`, `"1.4.10"`, `"3.0.0-beta1"` 형식을 지원합니다.
//! 뒤쪽에 빠진 숫자는 0으로 취급하므로 `2.0 == 2.0.0` 입니다.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// 아티팩트 버전
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    components: Vec<u32>,
    pre_release: Option<String>,
}

impl Version {
    /// major.minor.patch 버전 생성
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            components: vec![major, minor, patch],
            pre_release: None,
        }
    }

    /// 버전 문자열 파싱 (예: "1.2.3", "2.0", "1.0.0-rc1")
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (numbers, pre_release) = match s.split_once('-') {
            Some((numbers, pre)) if !pre.is_empty() => (numbers, Some(pre.to_string())),
            Some(_) => return Err(Error::InvalidInput(format!("Invalid version: {:?}", s))),
            None => (s, None),
        };

        if numbers.is_empty() {
            return Err(Error::InvalidInput(format!("Invalid version: {:?}", s)));
        }

        let components = numbers
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| Error::InvalidInput(format!("Invalid version: {:?}", s)))?;

        Ok(Self {
            components,
            pre_release,
        })
    }

    /// 숫자 구성요소
    pub fn components(&self) -> &[u32] {
        &self.components
    }

    pub fn major(&self) -> u32 {
        self.component(0)
    }

    pub fn minor(&self) -> u32 {
        self.component(1)
    }

    pub fn patch(&self) -> u32 {
        self.component(2)
    }

    /// pre-release 태그 (있는 경우)
    pub fn pre_release(&self) -> Option<&str> {
        self.pre_release.as_deref()
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    fn component(&self, index: usize) -> u32 {
        self.components.get(index).copied().unwrap_or(0)
    }

    /// 뒤쪽 0을 제거한 구성요소 (해시/동등성 기준)
    fn significant(&self) -> &[u32] {
        let len = self
            .components
            .iter()
            .rposition(|c| *c != 0)
            .map_or(0, |idx| idx + 1);
        &self.components[..len]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for idx in 0..len {
            match self.component(idx).cmp(&other.component(idx)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }

        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(b),
        }
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

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant().hash(state);
        self.pre_release.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", numbers.join("."))?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse() {
        let version = v("1.2.3");
        assert_eq!(version.major(), 1);
        assert_eq!(version.minor(), 2);
        assert_eq!(version.patch(), 3);
        assert!(!version.is_pre_release());

        let short = v("2");
        assert_eq!(short.components(), &[2]);
        assert_eq!(short.minor(), 0);

        let pre = v("3.0.0-beta1");
        assert_eq!(pre.pre_release(), Some("beta1"));
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!(Version::parse("").is_err());
        assert!(Version::parse("1..2").is_err());
        assert!(Version::parse("1.x").is_err());
        assert!(Version::parse("1.0-").is_err());
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(v("2.0"), v("2.0.0"));
        assert_eq!(v("2"), v("2.0.0.0"));

        let mut set = HashSet::new();
        set.insert(v("2.0"));
        assert!(set.contains(&v("2.0.0")));
    }

    #[test]
    fn test_ordering() {
        assert!(v("2.1") > v("2.0.9"));
        assert!(v("1.10") > v("1.9"));
        assert!(v("1.0.0-rc1") < v("1.0.0"));
        assert!(v("1.0.0-alpha") < v("1.0.0-beta"));

        let mut versions = vec![v("1.0"), v("3.0"), v("2.5"), v("2.10")];
        versions.sort_by(|a, b| b.cmp(a));
        let rendered: Vec<String> = versions.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, vec!["3.0", "2.10", "2.5", "1.0"]);
    }

    #[test]
    fn test_display_preserves_components() {
        assert_eq!(v("2.0").to_string(), "2.0");
        assert_eq!(v("1.4.10-rc2").to_string(), "1.4.10-rc2");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("1.2")).unwrap();
        assert_eq!(json, "\"1.2\"");

        let parsed: Version = serde_json::from_str("\"4.0.1\"").unwrap();
        assert_eq!(parsed, Version::new(4, 0, 1));

        assert!(serde_json::from_str::<Version>("\"nope\"").is_err());
    }
}
