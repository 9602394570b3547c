use crate::error::RulekitError;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// 32-byte BLAKE3 digest of a document's content.
///
/// Hash equality is the only content comparison the sync engine performs.
/// Serialized as a lowercase hex string in state files and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn of(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// First 12 hex chars, for human-readable output.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for ContentHash {
    type Err = RulekitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| RulekitError::InvalidHash(s.to_string()))?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| RulekitError::InvalidHash(s.to_string()))?;
        Ok(Self(arr))
    }
}

impl serde::Serialize for ContentHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ContentHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(ContentHash::of(b"hello"), ContentHash::of(b"hello"));
        assert_ne!(ContentHash::of(b"hello"), ContentHash::of(b"world"));
    }

    #[test]
    fn display_and_parse_roundtrip() {
        let hash = ContentHash::of(b"content");
        let parsed: ContentHash = hash.to_string().parse().unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("not-hex".parse::<ContentHash>().is_err());
        assert!("abcd".parse::<ContentHash>().is_err());
    }

    #[test]
    fn short_is_prefix() {
        let hash = ContentHash::of(b"content");
        assert_eq!(hash.short().len(), 12);
        assert!(hash.to_string().starts_with(&hash.short()));
    }

    #[test]
    fn yaml_roundtrip() {
        let hash = ContentHash::of(b"content");
        let yaml = serde_yaml::to_string(&hash).unwrap();
        let decoded: ContentHash = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(hash, decoded);
    }
}
