use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Inference backend selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Complete batch result per request.
    #[default]
    Reference,
    /// Segments produced lazily, window by window.
    Streaming,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported method: {0}. Expected one of: reference, streaming")]
pub struct UnsupportedMethodError(pub String);

impl Method {
    pub const ALL: [Method; 2] = [Method::Reference, Method::Streaming];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Reference => "reference",
            Method::Streaming => "streaming",
        }
    }
}

impl FromStr for Method {
    type Err = UnsupportedMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reference" => Ok(Method::Reference),
            "streaming" => Ok(Method::Streaming),
            other => Err(UnsupportedMethodError(other.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> serde::Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
