//! Game settings and pacing
//!
//! Persisted in LocalStorage on the web build; native builds use defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GameError;

/// What to do when a token runs out of placement attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExhaustionPolicy {
    /// Drop the partial round and pack every token into random grid cells
    #[default]
    GridPack,
    /// Give up on the round
    Fail,
}

impl ExhaustionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExhaustionPolicy::GridPack => "GridPack",
            ExhaustionPolicy::Fail => "Fail",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "gridpack" | "grid" => Some(ExhaustionPolicy::GridPack),
            "fail" => Some(ExhaustionPolicy::Fail),
            _ => None,
        }
    }
}

/// Shuffle timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// First look before the first shuffle, multiplied by the round count
    pub first_look_per_round_ms: u64,
    /// Delay between consecutive shuffles (and before the final hide)
    pub round_interval_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            first_look_per_round_ms: FIRST_LOOK_PER_ROUND_MS,
            round_interval_ms: ROUND_INTERVAL_MS,
        }
    }
}

impl Pacing {
    /// Delay before the first shuffle of a run with `max_rounds` rounds
    pub fn first_look(&self, max_rounds: u32) -> Duration {
        Duration::from_millis(self.first_look_per_round_ms.saturating_mul(max_rounds as u64))
    }

    /// Delay between shuffles
    pub fn round_interval(&self) -> Duration {
        Duration::from_millis(self.round_interval_ms)
    }
}

/// Random layout tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementSettings {
    /// Candidate draws per token before `exhaustion` applies
    pub max_attempts: u32,
    pub exhaustion: ExhaustionPolicy,
}

impl Default for PlacementSettings {
    fn default() -> Self {
        Self {
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
            exhaustion: ExhaustionPolicy::GridPack,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Smallest accepted token count
    pub min_tokens: usize,
    /// Largest accepted token count
    pub max_tokens: usize,
    pub pacing: Pacing,
    pub placement: PlacementSettings,
    /// Button colors; needs at least `max_tokens` entries
    pub palette: Vec<String>,
    /// Text shown in place of an obscured label
    pub hidden_label: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_tokens: MIN_TOKENS,
            max_tokens: MAX_TOKENS,
            pacing: Pacing::default(),
            placement: PlacementSettings::default(),
            palette: PALETTE.iter().map(|c| c.to_string()).collect(),
            hidden_label: HIDDEN_LABEL.to_string(),
        }
    }
}

impl Settings {
    /// Check that the settings can drive a run
    pub fn validate(&self) -> Result<(), GameError> {
        if self.min_tokens == 0 || self.min_tokens > self.max_tokens {
            return Err(GameError::InvalidSettings(format!(
                "token range {}..={} is empty",
                self.min_tokens, self.max_tokens
            )));
        }
        if self.palette.len() < self.max_tokens {
            return Err(GameError::InvalidSettings(format!(
                "palette has {} colors but runs may use {} tokens",
                self.palette.len(),
                self.max_tokens
            )));
        }
        if self.placement.max_attempts == 0 {
            return Err(GameError::InvalidSettings(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Reject token counts outside the configured range
    pub fn check_token_count(&self, count: usize) -> Result<(), GameError> {
        if count < self.min_tokens || count > self.max_tokens {
            return Err(GameError::TokenCountOutOfRange {
                count,
                min: self.min_tokens,
                max: self.max_tokens,
            });
        }
        Ok(())
    }

    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "shuffle_recall_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.palette.len(), MAX_TOKENS);
        assert_eq!(settings.pacing.first_look(3), Duration::from_millis(3000));
        assert_eq!(settings.pacing.round_interval(), Duration::from_millis(2000));
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let settings = Settings::from_json(r#"{"pacing":{"first_look_per_round_ms":10,"round_interval_ms":20}}"#)
            .unwrap();
        assert_eq!(settings.pacing.first_look(4), Duration::from_millis(40));
        assert_eq!(settings.max_tokens, MAX_TOKENS);
        assert_eq!(settings.hidden_label, "?");
    }

    #[test]
    fn test_from_json_rejects_short_palette() {
        let err = Settings::from_json(r##"{"palette":["#000000"]}"##).unwrap_err();
        assert!(matches!(err, GameError::InvalidSettings(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        assert!(matches!(
            Settings::from_json("{not json"),
            Err(GameError::SettingsFormat(_))
        ));
    }

    #[test]
    fn test_json_preserves_policy() {
        let mut settings = Settings::default();
        settings.placement.exhaustion = ExhaustionPolicy::Fail;
        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(ExhaustionPolicy::from_str("grid"), Some(ExhaustionPolicy::GridPack));
        assert_eq!(ExhaustionPolicy::from_str("FAIL"), Some(ExhaustionPolicy::Fail));
        assert_eq!(ExhaustionPolicy::from_str("pack"), None);
        assert_eq!(ExhaustionPolicy::Fail.as_str(), "Fail");
    }
}
