use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::PathBuf};

use crate::ConfigError;

/// Limits and policies applied by the listing wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "WizardConfig::default_max_offers")]
    pub max_offers: usize,
    #[serde(default = "WizardConfig::default_max_items_per_offer")]
    pub max_items_per_offer: usize,
    #[serde(default = "WizardConfig::default_max_item_quantity")]
    pub max_item_quantity: u32,
    #[serde(default)]
    pub single_kind_policy: SingleKindPolicy,
    #[serde(default = "WizardConfig::default_validate_on_change")]
    pub validate_on_change: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Directory where file-backed submissions are written. Defaults to
    /// `<data dir>/onboard/submissions`.
    pub submission_dir: Option<PathBuf>,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            max_offers: Self::default_max_offers(),
            max_items_per_offer: Self::default_max_items_per_offer(),
            max_item_quantity: Self::default_max_item_quantity(),
            single_kind_policy: SingleKindPolicy::default(),
            validate_on_change: Self::default_validate_on_change(),
            submission_dir: None,
        }
    }
}

impl WizardConfig {
    pub fn default_max_offers() -> usize {
        Self::MAX_OFFERS
    }

    pub fn default_max_items_per_offer() -> usize {
        Self::MAX_ITEMS_PER_OFFER
    }

    pub fn default_max_item_quantity() -> u32 {
        Self::MAX_ITEM_QUANTITY
    }

    pub fn default_validate_on_change() -> bool {
        true
    }

    /// Upper bounds for the configurable limits. Limits may be tightened
    /// below these but never raised above them.
    pub const MAX_OFFERS: usize = 6;
    pub const MAX_ITEMS_PER_OFFER: usize = 10;
    pub const MAX_ITEM_QUANTITY: u32 = 10;

    /// Rejects limits that would make every offer invalid or that exceed
    /// the listing bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_offers > Self::MAX_OFFERS {
            return Err(ConfigError::Invalid(format!(
                "max_offers must be at most {}",
                Self::MAX_OFFERS
            )));
        }
        if !(1..=Self::MAX_ITEMS_PER_OFFER).contains(&self.max_items_per_offer) {
            return Err(ConfigError::Invalid(format!(
                "max_items_per_offer must be between 1 and {}",
                Self::MAX_ITEMS_PER_OFFER
            )));
        }
        if !(1..=Self::MAX_ITEM_QUANTITY).contains(&self.max_item_quantity) {
            return Err(ConfigError::Invalid(format!(
                "max_item_quantity must be between 1 and {}",
                Self::MAX_ITEM_QUANTITY
            )));
        }
        Ok(())
    }

    pub fn resolve_submission_dir(&self) -> PathBuf {
        if let Some(path) = &self.submission_dir {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join("onboard").join("submissions")
    }
}

/// What happens to extra items when a combo offer is switched back to single.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SingleKindPolicy {
    /// Keep the first item, discard the rest.
    KeepFirst,
    /// Refuse the switch while the offer holds more than one item.
    Reject,
}

impl SingleKindPolicy {
    fn from_value(value: Option<String>) -> Self {
        value
            .map(|v| SingleKindPolicy::from_str(v.trim()))
            .unwrap_or_default()
    }

    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => SingleKindPolicy::Reject,
            _ => SingleKindPolicy::KeepFirst,
        }
    }
}

impl Default for SingleKindPolicy {
    fn default() -> Self {
        SingleKindPolicy::KeepFirst
    }
}

impl fmt::Display for SingleKindPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SingleKindPolicy::KeepFirst => "keep_first",
            SingleKindPolicy::Reject => "reject",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for SingleKindPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(SingleKindPolicy::from_value(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_defaults() {
        let config: WizardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, WizardConfig::default());
        assert_eq!(config.max_offers, 6);
        assert_eq!(config.max_items_per_offer, 10);
    }

    #[test]
    fn unknown_policy_falls_back_to_keep_first() {
        let config: WizardConfig =
            serde_json::from_str(r#"{"single_kind_policy": "shrug"}"#).unwrap();
        assert_eq!(config.single_kind_policy, SingleKindPolicy::KeepFirst);

        let config: WizardConfig =
            serde_json::from_str(r#"{"single_kind_policy": "Reject"}"#).unwrap();
        assert_eq!(config.single_kind_policy, SingleKindPolicy::Reject);
    }

    #[test]
    fn zero_item_limit_is_invalid() {
        let config = WizardConfig {
            max_items_per_offer: 0,
            ..WizardConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn limits_above_listing_bounds_are_invalid() {
        for config in [
            WizardConfig {
                max_offers: 50,
                ..WizardConfig::default()
            },
            WizardConfig {
                max_items_per_offer: 40,
                ..WizardConfig::default()
            },
            WizardConfig {
                max_item_quantity: 11,
                ..WizardConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        }

        let tighter = WizardConfig {
            max_offers: 3,
            max_items_per_offer: 4,
            ..WizardConfig::default()
        };
        assert!(tighter.validate().is_ok());
        assert!(WizardConfig::default().validate().is_ok());
    }
}
