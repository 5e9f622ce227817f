use serde::{Deserialize, Serialize};

/// Lower bound accepted for `max_output_tokens`.
pub const MIN_OUTPUT_TOKENS: u32 = 50;

/// Upper bound accepted for `max_output_tokens`.
pub const MAX_OUTPUT_TOKENS: u32 = 4096;

/// Sampling parameters sent with a generation request.
///
/// A `GenerationConfig` is immutable per request; the chat configuration may
/// change between requests without affecting past turns. Fields left `None`
/// fall back to the endpoint defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Sampling temperature, between 0.0 and 1.0.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum number of tokens in the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl GenerationConfig {
    /// Create a config with the given temperature and output-token ceiling.
    pub fn new(temperature: f32, max_output_tokens: u32) -> Self {
        Self {
            temperature: Some(temperature),
            max_output_tokens: Some(max_output_tokens),
        }
    }

    /// Returns true if neither field is set, i.e. the endpoint defaults apply.
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.max_output_tokens.is_none()
    }
}

/// Validates a temperature value against the accepted range.
pub fn temperature_in_range(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Validates a max-output-tokens value against the accepted range.
pub fn output_tokens_in_range(value: u32) -> bool {
    (MIN_OUTPUT_TOKENS..=MAX_OUTPUT_TOKENS).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn serializes_camel_case() {
        let config = GenerationConfig::new(0.75, 512);
        let value = to_value(&config).unwrap();
        assert_eq!(
            value,
            json!({
                "temperature": 0.75,
                "maxOutputTokens": 512
            })
        );
    }

    #[test]
    fn empty_config_serializes_empty() {
        let config = GenerationConfig::default();
        assert!(config.is_empty());
        assert_eq!(to_value(&config).unwrap(), json!({}));
    }

    #[test]
    fn temperature_range() {
        assert!(temperature_in_range(0.0));
        assert!(temperature_in_range(1.0));
        assert!(!temperature_in_range(1.5));
        assert!(!temperature_in_range(-0.1));
        assert!(!temperature_in_range(f32::NAN));
    }

    #[test]
    fn output_tokens_range() {
        assert!(output_tokens_in_range(50));
        assert!(output_tokens_in_range(4096));
        assert!(!output_tokens_in_range(49));
        assert!(!output_tokens_in_range(4097));
    }
}
