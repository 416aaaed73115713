//! Round configuration.
//!
//! Round length follows the slot clock's delegate-count schedule; only the
//! snapshot stop is configured here.

use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundConfig {
    /// Round at which the node stops and truncates the chain, if any.
    pub snapshot_round: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(RoundConfig::default().snapshot_round, None);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RoundConfig = serde_json::from_str(r#"{ "snapshotRound": 7 }"#).unwrap();
        assert_eq!(config.snapshot_round, Some(7));
    }
}
