//! Shuffle Recall - a short-term visual memory trainer
//!
//! Core modules:
//! - `sim`: Placement, round scheduling and sequence judging
//! - `platform`: Rendering, messaging and timer abstraction
//! - `settings`: Data-driven pacing and layout configuration

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{GameError, PlacementError};
pub use settings::{ExhaustionPolicy, Pacing, PlacementSettings, Settings};

/// Game configuration constants
pub mod consts {
    /// Smallest token count a run accepts
    pub const MIN_TOKENS: usize = 3;
    /// Largest token count a run accepts (one palette color each)
    pub const MAX_TOKENS: usize = 7;

    /// First look lasts this long per round before the first shuffle
    pub const FIRST_LOOK_PER_ROUND_MS: u64 = 1000;
    /// Pause between two shuffles
    pub const ROUND_INTERVAL_MS: u64 = 2000;

    /// Candidate draws per token before the exhaustion policy kicks in
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 512;

    /// Label shown once a token has been obscured
    pub const HIDDEN_LABEL: &str = "?";

    /// Button colors, one per token
    pub const PALETTE: [&str; MAX_TOKENS] = [
        "#FF5733", "#33FF57", "#3357FF", "#FFFF33", "#FF33F6", "#33FFF6", "#FF9933",
    ];

    /// Message shown when the whole order was reproduced
    pub const MSG_SUCCESS: &str = "Excellent Memory!";
    /// Message shown on the first wrong selection
    pub const MSG_WRONG_ORDER: &str = "Wrong order!";
    /// Message shown when a round could not be laid out
    pub const MSG_PLACEMENT_FAILED: &str = "Could not place the buttons, please try again.";
}

/// Prompt shown when the requested token count is rejected
pub fn token_count_prompt(min: usize, max: usize) -> String {
    format!("Please enter a number between {} and {}.", min, max)
}

/// Parse and bounds-check the user-supplied token count
pub fn parse_token_count(input: &str, settings: &Settings) -> Result<usize, GameError> {
    let trimmed = input.trim();
    let count: usize = trimmed
        .parse()
        .map_err(|_| GameError::InvalidTokenCount(trimmed.to_string()))?;
    settings.check_token_count(count)?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token_count_accepts_range() {
        let settings = Settings::default();
        assert_eq!(parse_token_count("3", &settings).unwrap(), 3);
        assert_eq!(parse_token_count(" 7\n", &settings).unwrap(), 7);
    }

    #[test]
    fn test_parse_token_count_rejects_out_of_range() {
        let settings = Settings::default();
        assert!(matches!(
            parse_token_count("2", &settings),
            Err(GameError::TokenCountOutOfRange { count: 2, min: 3, max: 7 })
        ));
        assert!(matches!(
            parse_token_count("8", &settings),
            Err(GameError::TokenCountOutOfRange { count: 8, .. })
        ));
    }

    #[test]
    fn test_parse_token_count_rejects_garbage() {
        let settings = Settings::default();
        assert!(matches!(
            parse_token_count("five", &settings),
            Err(GameError::InvalidTokenCount(s)) if s == "five"
        ));
        assert!(parse_token_count("", &settings).is_err());
        assert!(parse_token_count("-3", &settings).is_err());
    }

    #[test]
    fn test_prompt_text() {
        assert_eq!(token_count_prompt(3, 7), "Please enter a number between 3 and 7.");
    }
}
