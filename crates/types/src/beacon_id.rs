use std::fmt;

/// Name of a beacon chain; a single node can run several beacons side by
/// side, each with its own group and round sequence (spec §3).
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BeaconId(String);

impl BeaconId {
    pub const DEFAULT_NAME: &'static str = "default";

    pub fn new(name: impl Into<String>) -> Self {
        BeaconId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BeaconId {
    fn default() -> Self {
        BeaconId(Self::DEFAULT_NAME.to_string())
    }
}

impl fmt::Display for BeaconId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
