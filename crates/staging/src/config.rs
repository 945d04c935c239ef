use serde::Deserialize;

pub const ENV_STRICT_CANDIDATES: &str = "SLOTWISE__STAGING__STRICT_CANDIDATES";

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StagingConfig {
    /// Reject a stage request locally when the (day, period) pair is not one
    /// of the loaded candidates. Off by default: the staging service decides.
    #[serde(default)]
    pub strict_candidates: bool,
}

impl StagingConfig {
    pub fn from_env() -> Self {
        let strict_candidates = std::env::var(ENV_STRICT_CANDIDATES)
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self { strict_candidates }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_accept_common_truthy_spellings() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("ON"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: StagingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, StagingConfig::default());
        let cfg: StagingConfig = serde_json::from_str(r#"{"strictCandidates": true}"#).unwrap();
        assert!(cfg.strict_candidates);
    }
}
