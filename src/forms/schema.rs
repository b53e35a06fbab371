//! Declarative step descriptions and the built-in listing wizard.

use onboard_config::WizardConfig;
use onboard_domain::{keys, LocationCatalog, Platform, CATEGORIES, LANGUAGES};
use serde::Serialize;

use super::rules::{Condition, OfferLimits, Pattern, RuleSet};

/// Supported input shapes for step fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "options", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Number,
    Url,
    Choice(Vec<String>),
    MultiChoice(Vec<String>),
    /// Options depend on another field's value.
    DependentChoice(String),
    Offers,
    File,
}

/// Declarative description of a single rendered field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
}

impl FieldDescriptor {
    pub fn new(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            help: None,
        }
    }

    pub fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

/// Validation rules bound to one step, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct StepSchema {
    pub step_number: usize,
    field_rules: Vec<(String, RuleSet)>,
}

impl StepSchema {
    pub fn new(step_number: usize) -> Self {
        Self {
            step_number,
            field_rules: Vec::new(),
        }
    }

    pub fn field(mut self, key: impl Into<String>, rules: RuleSet) -> Self {
        self.field_rules.push((key.into(), rules));
        self
    }

    pub fn field_rules(&self) -> impl Iterator<Item = (&str, &RuleSet)> {
        self.field_rules
            .iter()
            .map(|(key, rules)| (key.as_str(), rules))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.field_rules.iter().map(|(key, _)| key.as_str())
    }

    pub fn rules_for(&self, key: &str) -> Option<&RuleSet> {
        self.field_rules
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, rules)| rules)
    }
}

/// One page of the wizard: what to render and what must hold to leave it.
#[derive(Debug, Clone)]
pub struct StepDefinition {
    pub number: usize,
    pub title: &'static str,
    pub fields: Vec<FieldDescriptor>,
    pub schema: StepSchema,
    pub terminal: bool,
}

impl StepDefinition {
    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Keys rendered by this step plus keys its schema validates.
    pub fn field_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.fields.iter().map(|field| field.key.to_string()).collect();
        for key in self.schema.fields() {
            if !keys.iter().any(|existing| existing == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn platform_keys() -> Vec<String> {
    Platform::ALL
        .iter()
        .map(|platform| platform.key().to_string())
        .collect()
}

fn price_rules(sibling: &str, message: &str) -> RuleSet {
    RuleSet::new()
        .required_if(sibling, Condition::Present, message)
        .min(0.0, "Price must be zero or positive")
}

/// Step 1: who the influencer is and where they publish.
pub fn profile_step() -> StepDefinition {
    let schema = StepSchema::new(1)
        .field(
            keys::NAME,
            RuleSet::new()
                .required("Name is required")
                .min_length(2, "Name must be at least 2 characters")
                .max_length(60, "Name cannot exceed 60 characters"),
        )
        .field(
            keys::PLATFORMS,
            RuleSet::new()
                .min_length(1, "Select at least one platform")
                .one_of(platform_keys(), "Unknown platform selected"),
        )
        .field(
            keys::INSTAGRAM_URL,
            RuleSet::new()
                .required_if(
                    keys::PLATFORMS,
                    Condition::Contains(Platform::Instagram.key().into()),
                    "Instagram URL is required",
                )
                .matches(Pattern::Url, "Enter a valid Instagram URL"),
        )
        .field(
            keys::YOUTUBE_URL,
            RuleSet::new()
                .required_if(
                    keys::PLATFORMS,
                    Condition::Contains(Platform::YouTube.key().into()),
                    "YouTube URL is required",
                )
                .matches(Pattern::Url, "Enter a valid YouTube URL"),
        )
        .field(
            keys::CATEGORIES,
            RuleSet::new()
                .min_length(1, "Select at least one category")
                .max_length(5, "Select at most 5 categories")
                .one_of(strings(CATEGORIES), "Unknown category selected"),
        )
        .field(
            keys::LANGUAGES,
            RuleSet::new()
                .min_length(1, "Select at least one language")
                .one_of(strings(LANGUAGES), "Unknown language selected"),
        )
        .field(
            keys::STATE,
            RuleSet::new()
                .required("State is required")
                .one_of(strings(&LocationCatalog::states()), "Unknown state"),
        )
        .field(
            keys::CITY,
            RuleSet::new().required("City is required").one_of_under(
                keys::STATE,
                LocationCatalog::cities_by_state(),
                "Select a city in the chosen state",
            ),
        )
        .field(
            keys::LOCALITY,
            RuleSet::new().one_of_under(
                keys::CITY,
                LocationCatalog::localities_by_city(),
                "Select a locality in the chosen city",
            ),
        );

    StepDefinition {
        number: 1,
        title: "Profile",
        fields: vec![
            FieldDescriptor::new(keys::NAME, "Display name", FieldKind::Text),
            FieldDescriptor::new(keys::PLATFORMS, "Platforms", FieldKind::MultiChoice(platform_keys())),
            FieldDescriptor::new(keys::INSTAGRAM_URL, "Instagram URL", FieldKind::Url)
                .with_help("Required when Instagram is one of your platforms."),
            FieldDescriptor::new(keys::YOUTUBE_URL, "YouTube URL", FieldKind::Url)
                .with_help("Required when YouTube is one of your platforms."),
            FieldDescriptor::new(
                keys::CATEGORIES,
                "Categories",
                FieldKind::MultiChoice(strings(CATEGORIES)),
            ),
            FieldDescriptor::new(
                keys::LANGUAGES,
                "Languages",
                FieldKind::MultiChoice(strings(LANGUAGES)),
            ),
            FieldDescriptor::new(
                keys::STATE,
                "State",
                FieldKind::Choice(strings(&LocationCatalog::states())),
            )
            .with_help("Changing the state clears city and locality."),
            FieldDescriptor::new(keys::CITY, "City", FieldKind::DependentChoice(keys::STATE.into())),
            FieldDescriptor::new(
                keys::LOCALITY,
                "Locality",
                FieldKind::DependentChoice(keys::CITY.into()),
            ),
        ],
        schema,
        terminal: false,
    }
}

/// Step 2: per-platform rates and the offer bundles.
pub fn rates_step(config: &WizardConfig) -> StepDefinition {
    let limits = OfferLimits {
        max_items: config.max_items_per_offer,
        max_quantity: config.max_item_quantity,
    };
    let schema = StepSchema::new(2)
        .field(
            keys::INSTAGRAM_POST_PRICE,
            price_rules(keys::INSTAGRAM_URL, "Instagram post price is required"),
        )
        .field(
            keys::INSTAGRAM_REEL_PRICE,
            price_rules(keys::INSTAGRAM_URL, "Instagram reel price is required"),
        )
        .field(
            keys::INSTAGRAM_STORY_PRICE,
            price_rules(keys::INSTAGRAM_URL, "Instagram story price is required"),
        )
        .field(
            keys::INSTAGRAM_CAROUSEL_PRICE,
            price_rules(keys::INSTAGRAM_URL, "Instagram carousel price is required"),
        )
        .field(
            keys::YOUTUBE_VIDEO_PRICE,
            price_rules(keys::YOUTUBE_URL, "YouTube video price is required"),
        )
        .field(
            keys::YOUTUBE_SHORT_PRICE,
            price_rules(keys::YOUTUBE_URL, "YouTube short price is required"),
        )
        .field(
            keys::STARTING_PRICE,
            RuleSet::new()
                .required("Starting price is required")
                .min(0.0, "Starting price must be zero or positive"),
        )
        .field(
            keys::OFFERS,
            RuleSet::new()
                .max_length(
                    config.max_offers,
                    format!("You can add at most {} offers", config.max_offers),
                )
                .offer_structure(limits),
        );

    StepDefinition {
        number: 2,
        title: "Rates & offers",
        fields: vec![
            FieldDescriptor::new(keys::INSTAGRAM_POST_PRICE, "Instagram post price", FieldKind::Number),
            FieldDescriptor::new(keys::INSTAGRAM_REEL_PRICE, "Instagram reel price", FieldKind::Number),
            FieldDescriptor::new(
                keys::INSTAGRAM_STORY_PRICE,
                "Instagram story price",
                FieldKind::Number,
            ),
            FieldDescriptor::new(
                keys::INSTAGRAM_CAROUSEL_PRICE,
                "Instagram carousel price",
                FieldKind::Number,
            ),
            FieldDescriptor::new(keys::YOUTUBE_VIDEO_PRICE, "YouTube video price", FieldKind::Number),
            FieldDescriptor::new(keys::YOUTUBE_SHORT_PRICE, "YouTube short price", FieldKind::Number),
            FieldDescriptor::new(keys::STARTING_PRICE, "Starting price", FieldKind::Number)
                .with_help("The lowest price a brand will pay for any deliverable."),
            FieldDescriptor::new(keys::OFFERS, "Offers", FieldKind::Offers)
                .with_help("Bundle deliverables into single or combo offers."),
        ],
        schema,
        terminal: false,
    }
}

/// Step 3: profile media. Submitting from here finishes the wizard.
pub fn media_step() -> StepDefinition {
    let schema = StepSchema::new(3)
        .field(
            keys::PROFILE_IMAGE,
            RuleSet::new().required("Profile image is required"),
        )
        .field(
            keys::BIO,
            RuleSet::new().max_length(500, "Bio cannot exceed 500 characters"),
        );

    StepDefinition {
        number: 3,
        title: "Media",
        fields: vec![
            FieldDescriptor::new(keys::PROFILE_IMAGE, "Profile image", FieldKind::File),
            FieldDescriptor::new(keys::COVER_IMAGE, "Cover image", FieldKind::File),
            FieldDescriptor::new(keys::BIO, "Bio", FieldKind::LongText),
        ],
        schema,
        terminal: true,
    }
}

/// The three-step influencer listing wizard.
pub fn listing_steps(config: &WizardConfig) -> Vec<StepDefinition> {
    vec![profile_step(), rates_step(config), media_step()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_has_three_steps_with_terminal_last() {
        let steps = listing_steps(&WizardConfig::default());
        let numbers: Vec<usize> = steps.iter().map(|step| step.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert!(steps[2].terminal);
        assert!(steps[..2].iter().all(|step| !step.terminal));
    }

    #[test]
    fn schema_numbers_match_step_numbers() {
        for step in listing_steps(&WizardConfig::default()) {
            assert_eq!(step.schema.step_number, step.number);
        }
    }

    #[test]
    fn rates_step_uses_configured_offer_limit() {
        let config = WizardConfig {
            max_offers: 2,
            ..WizardConfig::default()
        };
        let step = rates_step(&config);
        let rules = step.schema.rules_for(keys::OFFERS).expect("offer rules");
        assert_eq!(rules.rules()[0].describe(), "max_length(2)");
    }

    #[test]
    fn field_keys_include_schema_only_fields() {
        let step = media_step();
        let keys = step.field_keys();
        assert_eq!(keys, vec!["profile_image", "cover_image", "bio"]);
    }
}
