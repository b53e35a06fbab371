//! Field rules understood by the validation engine.
//!
//! Every rule is an explicit variant; [`Rule::check`] is the single
//! interpreter. A rule reports `Ok(Some(message))` when the value fails it,
//! `Ok(None)` when it passes, and `Err` when the rule itself is unusable.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use onboard_domain::{FieldValue, FormValues, OfferKind};

use crate::errors::RuleError;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+(:[0-9]+)?(/\S*)?$")
        .expect("static url pattern")
});

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").expect("static email pattern")
});

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9]{10,13}$").expect("static phone pattern"));

type RuleCallback = dyn Fn(&FormValues, Option<&FieldValue>) -> Result<(), String> + Send + Sync;
type SharedRuleCallback = Arc<RuleCallback>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    Url,
    Email,
    Phone,
    Regex(RegexPattern),
}

impl Pattern {
    pub fn regex(source: impl Into<String>) -> Self {
        Pattern::Regex(RegexPattern::new(source))
    }

    fn matches(&self, input: &str) -> Result<bool, RuleError> {
        match self {
            Pattern::Url => Ok(URL_PATTERN.is_match(input)),
            Pattern::Email => Ok(EMAIL_PATTERN.is_match(input)),
            Pattern::Phone => Ok(PHONE_PATTERN.is_match(input)),
            Pattern::Regex(pattern) => pattern.is_match(input),
        }
    }
}

/// A caller-supplied regular expression, compiled once on construction.
/// A source that fails to compile is kept and reported each time the rule
/// runs.
#[derive(Clone)]
pub struct RegexPattern {
    source: String,
    compiled: Result<Regex, String>,
}

impl RegexPattern {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source).map_err(|err| err.to_string());
        Self { source, compiled }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn is_match(&self, input: &str) -> Result<bool, RuleError> {
        match &self.compiled {
            Ok(regex) => Ok(regex.is_match(input)),
            Err(reason) => Err(RuleError::InvalidPattern {
                pattern: self.source.clone(),
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Debug for RegexPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegexPattern({:?})", self.source)
    }
}

impl PartialEq for RegexPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for RegexPattern {}

impl From<&str> for RegexPattern {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl From<String> for RegexPattern {
    fn from(source: String) -> Self {
        Self::new(source)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Url => f.write_str("url"),
            Pattern::Email => f.write_str("email"),
            Pattern::Phone => f.write_str("phone"),
            Pattern::Regex(pattern) => write!(f, "/{}/", pattern.source()),
        }
    }
}

/// Predicate over a sibling field's value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Sibling holds a non-empty value.
    Present,
    /// Sibling is missing or empty.
    Absent,
    /// Sibling is a set containing the member, or text equal to it.
    Contains(String),
    /// Sibling text equals the value (case-insensitive).
    Equals(String),
}

impl Condition {
    pub fn holds(&self, value: Option<&FieldValue>) -> bool {
        let present = value.is_some_and(|value| !value.is_empty());
        match self {
            Condition::Present => present,
            Condition::Absent => !present,
            Condition::Contains(member) => value.is_some_and(|value| value.contains(member)),
            Condition::Equals(expected) => value
                .and_then(FieldValue::as_text)
                .is_some_and(|text| text.trim().eq_ignore_ascii_case(expected)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Present => f.write_str("present"),
            Condition::Absent => f.write_str("absent"),
            Condition::Contains(member) => write!(f, "contains {}", member),
            Condition::Equals(expected) => write!(f, "= {}", expected),
        }
    }
}

/// Bounds checked by [`Rule::OfferStructure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferLimits {
    pub max_items: usize,
    pub max_quantity: u32,
}

impl Default for OfferLimits {
    fn default() -> Self {
        Self {
            max_items: 10,
            max_quantity: 10,
        }
    }
}

#[derive(Clone)]
pub enum Rule {
    Required {
        message: String,
    },
    MinLength {
        min: usize,
        message: String,
    },
    MaxLength {
        max: usize,
        message: String,
    },
    Min {
        min: f64,
        message: String,
    },
    Max {
        max: f64,
        message: String,
    },
    MatchesPattern {
        pattern: Pattern,
        message: String,
    },
    OneOf {
        options: Vec<String>,
        message: String,
    },
    /// Value must be listed under the parent field's current value.
    DependentOneOf {
        parent: String,
        options: BTreeMap<String, Vec<String>>,
        message: String,
    },
    /// Acts as `Required` for this pass when `when` holds for `sibling`.
    ConditionalRequired {
        sibling: String,
        when: Condition,
        message: String,
    },
    /// Rejects malformed offers: bad item counts, half-filled items,
    /// negative prices, single offers with several items.
    OfferStructure {
        limits: OfferLimits,
    },
    Custom {
        name: &'static str,
        check: SharedRuleCallback,
    },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required {
            message: message.into(),
        }
    }

    pub fn custom<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&FormValues, Option<&FieldValue>) -> Result<(), String> + Send + Sync + 'static,
    {
        Rule::Custom {
            name,
            check: Arc::new(check),
        }
    }

    /// Short human-readable form, used in logs and the `steps` listing.
    pub fn describe(&self) -> String {
        match self {
            Rule::Required { .. } => "required".into(),
            Rule::MinLength { min, .. } => format!("min_length({})", min),
            Rule::MaxLength { max, .. } => format!("max_length({})", max),
            Rule::Min { min, .. } => format!("min({})", min),
            Rule::Max { max, .. } => format!("max({})", max),
            Rule::MatchesPattern { pattern, .. } => format!("matches({})", pattern),
            Rule::OneOf { options, .. } => format!("one_of({})", options.len()),
            Rule::DependentOneOf { parent, .. } => format!("one_of_under({})", parent),
            Rule::ConditionalRequired { sibling, when, .. } => {
                format!("required_if({} {})", sibling, when)
            }
            Rule::OfferStructure { limits } => format!(
                "offer_structure(items<={}, quantity<={})",
                limits.max_items, limits.max_quantity
            ),
            Rule::Custom { name, .. } => format!("custom({})", name),
        }
    }

    /// Evaluates the rule for `field` against the full value set.
    pub fn check(&self, values: &FormValues, field: &str) -> Result<Option<String>, RuleError> {
        let value = values.get(field);
        let blank = value.map_or(true, FieldValue::is_empty);

        match self {
            Rule::Required { message } => Ok(blank.then(|| message.clone())),
            Rule::MinLength { min, message } => {
                let length = match value {
                    None => 0,
                    Some(value) => self.length_of(value)?,
                };
                Ok((length < *min).then(|| message.clone()))
            }
            Rule::MaxLength { max, message } => match value {
                None => Ok(None),
                Some(value) => Ok((self.length_of(value)? > *max).then(|| message.clone())),
            },
            Rule::Min { min, message } => {
                self.check_number(value, blank, |number| number >= *min, message)
            }
            Rule::Max { max, message } => {
                self.check_number(value, blank, |number| number <= *max, message)
            }
            Rule::MatchesPattern { pattern, message } => {
                if blank {
                    return Ok(None);
                }
                let text = self.text_of(value)?;
                Ok((!pattern.matches(text.trim())?).then(|| message.clone()))
            }
            Rule::OneOf { options, message } => {
                if blank {
                    return Ok(None);
                }
                Ok((!self.members_within(value, options)?).then(|| message.clone()))
            }
            Rule::DependentOneOf {
                parent,
                options,
                message,
            } => {
                if blank {
                    return Ok(None);
                }
                let Some(parent_value) = values.text(parent).map(str::trim) else {
                    return Ok(None);
                };
                if parent_value.is_empty() {
                    return Ok(None);
                }
                let allowed = options
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(parent_value))
                    .map(|(_, allowed)| allowed.as_slice())
                    .unwrap_or(&[]);
                Ok((!self.members_within(value, allowed)?).then(|| message.clone()))
            }
            Rule::ConditionalRequired {
                sibling,
                when,
                message,
            } => {
                let applies = when.holds(values.get(sibling));
                Ok((applies && blank).then(|| message.clone()))
            }
            Rule::OfferStructure { limits } => match value {
                None => Ok(None),
                Some(FieldValue::Offers(_)) => Ok(offer_structure_error(values, field, limits)),
                Some(other) => Err(self.mismatch(other)),
            },
            Rule::Custom { check, .. } => Ok(check(values, value).err()),
        }
    }

    fn length_of(&self, value: &FieldValue) -> Result<usize, RuleError> {
        value.length().ok_or_else(|| self.mismatch(value))
    }

    fn text_of<'v>(&self, value: Option<&'v FieldValue>) -> Result<&'v str, RuleError> {
        match value {
            Some(FieldValue::Text(text)) => Ok(text.as_str()),
            Some(other) => Err(self.mismatch(other)),
            None => Ok(""),
        }
    }

    fn check_number(
        &self,
        value: Option<&FieldValue>,
        blank: bool,
        accept: impl Fn(f64) -> bool,
        message: &str,
    ) -> Result<Option<String>, RuleError> {
        if blank {
            return Ok(None);
        }
        // Non-finite numbers fall through to the numeric-value message.
        match value {
            Some(number @ (FieldValue::Number(_) | FieldValue::Text(_))) => {
                match number.as_number() {
                    Some(parsed) if accept(parsed) => Ok(None),
                    Some(_) => Ok(Some(message.to_string())),
                    None => Ok(Some("Enter a numeric value".into())),
                }
            }
            Some(other) => Err(self.mismatch(other)),
            None => Ok(None),
        }
    }

    fn members_within(
        &self,
        value: Option<&FieldValue>,
        options: &[String],
    ) -> Result<bool, RuleError> {
        let allowed = |candidate: &str| {
            options
                .iter()
                .any(|option| option.eq_ignore_ascii_case(candidate.trim()))
        };
        match value {
            Some(FieldValue::Text(text)) => Ok(allowed(text)),
            Some(FieldValue::Set(members)) => Ok(members.iter().all(|member| allowed(member))),
            Some(other) => Err(self.mismatch(other)),
            None => Ok(true),
        }
    }

    fn mismatch(&self, value: &FieldValue) -> RuleError {
        let found = match value {
            FieldValue::Text(_) => "text",
            FieldValue::Number(_) => "number",
            FieldValue::Set(_) => "set",
            FieldValue::Offers(_) => "offer list",
            FieldValue::File(_) => "file",
        };
        RuleError::TypeMismatch {
            rule: self.describe(),
            found,
        }
    }
}

fn offer_structure_error(values: &FormValues, field: &str, limits: &OfferLimits) -> Option<String> {
    let offers = values.get(field).and_then(FieldValue::as_offers)?;
    for (offer_index, offer) in offers.iter().enumerate() {
        let position = offer_index + 1;
        if offer.items.is_empty() {
            return Some(format!("Offer {}: add at least one item", position));
        }
        if offer.items.len() > limits.max_items {
            return Some(format!(
                "Offer {}: at most {} items allowed",
                position, limits.max_items
            ));
        }
        if offer.kind == OfferKind::Single && offer.items.len() != 1 {
            return Some(format!(
                "Offer {}: a single offer holds exactly one item",
                position
            ));
        }
        if !offer.price.is_finite() || offer.price < 0.0 {
            return Some(format!(
                "Offer {}: price must be zero or positive",
                position
            ));
        }
        for (item_index, item) in offer.items.iter().enumerate() {
            let item_position = item_index + 1;
            if item.content_type.is_none() {
                return Some(format!(
                    "Offer {}, item {}: choose a content type",
                    position, item_position
                ));
            }
            match item.quantity {
                None => {
                    return Some(format!(
                        "Offer {}, item {}: quantity must be a number",
                        position, item_position
                    ))
                }
                Some(quantity) if quantity == 0 || quantity > limits.max_quantity => {
                    return Some(format!(
                        "Offer {}, item {}: quantity must be between 1 and {}",
                        position, item_position, limits.max_quantity
                    ))
                }
                Some(_) => {}
            }
        }
    }
    None
}

/// Ordered predicates for one field. The first failure wins.
#[derive(Clone, Debug, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn with(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.with(Rule::required(message))
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.with(Rule::MinLength {
            min,
            message: message.into(),
        })
    }

    pub fn max_length(self, max: usize, message: impl Into<String>) -> Self {
        self.with(Rule::MaxLength {
            max,
            message: message.into(),
        })
    }

    pub fn min(self, min: f64, message: impl Into<String>) -> Self {
        self.with(Rule::Min {
            min,
            message: message.into(),
        })
    }

    pub fn max(self, max: f64, message: impl Into<String>) -> Self {
        self.with(Rule::Max {
            max,
            message: message.into(),
        })
    }

    pub fn matches(self, pattern: Pattern, message: impl Into<String>) -> Self {
        self.with(Rule::MatchesPattern {
            pattern,
            message: message.into(),
        })
    }

    pub fn one_of<I, S>(self, options: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(Rule::OneOf {
            options: options.into_iter().map(Into::into).collect(),
            message: message.into(),
        })
    }

    pub fn one_of_under(
        self,
        parent: impl Into<String>,
        options: BTreeMap<String, Vec<String>>,
        message: impl Into<String>,
    ) -> Self {
        self.with(Rule::DependentOneOf {
            parent: parent.into(),
            options,
            message: message.into(),
        })
    }

    pub fn required_if(
        self,
        sibling: impl Into<String>,
        when: Condition,
        message: impl Into<String>,
    ) -> Self {
        self.with(Rule::ConditionalRequired {
            sibling: sibling.into(),
            when,
            message: message.into(),
        })
    }

    pub fn offer_structure(self, limits: OfferLimits) -> Self {
        self.with(Rule::OfferStructure { limits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onboard_domain::{Offer, OfferId, OfferItem};

    fn values_with(field: &str, value: FieldValue) -> FormValues {
        let mut values = FormValues::new();
        values.insert(field, value);
        values
    }

    #[test]
    fn required_fails_on_blank_text() {
        let rule = Rule::required("Name is required");
        let values = values_with("name", FieldValue::text("  "));
        assert_eq!(
            rule.check(&values, "name").unwrap(),
            Some("Name is required".to_string())
        );
        assert_eq!(rule.check(&FormValues::new(), "name").unwrap().is_some(), true);
    }

    #[test]
    fn numeric_bounds_ignore_blank_values() {
        let rule = Rule::Min {
            min: 0.0,
            message: "too small".into(),
        };
        assert_eq!(rule.check(&FormValues::new(), "price").unwrap(), None);
        let values = values_with("price", FieldValue::text(""));
        assert_eq!(rule.check(&values, "price").unwrap(), None);
        let values = values_with("price", FieldValue::Number(-1.0));
        assert_eq!(rule.check(&values, "price").unwrap(), Some("too small".into()));
        let values = values_with("price", FieldValue::text("ten"));
        assert_eq!(
            rule.check(&values, "price").unwrap(),
            Some("Enter a numeric value".into())
        );
    }

    #[test]
    fn non_finite_numbers_need_a_numeric_value() {
        let rule = Rule::Min {
            min: 0.0,
            message: "too small".into(),
        };
        for value in [
            FieldValue::Number(f64::INFINITY),
            FieldValue::Number(f64::NAN),
            FieldValue::text("inf"),
        ] {
            let values = values_with("price", value);
            assert_eq!(
                rule.check(&values, "price").unwrap(),
                Some("Enter a numeric value".into())
            );
        }
    }

    #[test]
    fn url_pattern_accepts_profile_links() {
        let rule = Rule::MatchesPattern {
            pattern: Pattern::Url,
            message: "bad url".into(),
        };
        let ok = values_with("url", FieldValue::text("https://youtube.com/@ana"));
        assert_eq!(rule.check(&ok, "url").unwrap(), None);
        let bad = values_with("url", FieldValue::text("youtube dot com"));
        assert_eq!(rule.check(&bad, "url").unwrap(), Some("bad url".into()));
    }

    #[test]
    fn broken_regex_is_a_rule_error() {
        let rule = Rule::MatchesPattern {
            pattern: Pattern::Regex("([".into()),
            message: "never".into(),
        };
        let values = values_with("code", FieldValue::text("abc"));
        assert!(matches!(
            rule.check(&values, "code"),
            Err(RuleError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn regex_pattern_compiles_once_and_keeps_its_error() {
        let valid = RegexPattern::new("^[a-z]+$");
        assert!(valid.compiled.is_ok());
        assert_eq!(valid.is_match("anna"), Ok(true));
        assert_eq!(valid.is_match("Anna"), Ok(false));

        let broken = RegexPattern::new("([");
        assert!(broken.compiled.is_err());
        assert!(matches!(
            broken.is_match("abc"),
            Err(RuleError::InvalidPattern { ref pattern, .. }) if pattern == "(["
        ));
        assert_eq!(Pattern::regex("(["), Pattern::Regex(broken));
    }

    #[test]
    fn length_rule_on_number_is_a_type_mismatch() {
        let rule = Rule::MinLength {
            min: 1,
            message: "pick one".into(),
        };
        let values = values_with("count", FieldValue::Number(3.0));
        assert!(matches!(
            rule.check(&values, "count"),
            Err(RuleError::TypeMismatch { found: "number", .. })
        ));
    }

    #[test]
    fn conditional_required_follows_sibling() {
        let rule = Rule::ConditionalRequired {
            sibling: "platforms".into(),
            when: Condition::Contains("instagram".into()),
            message: "Instagram URL is required".into(),
        };
        let mut values = values_with("platforms", FieldValue::set(["youtube"]));
        assert_eq!(rule.check(&values, "instagram_url").unwrap(), None);

        values.insert("platforms", FieldValue::set(["instagram"]));
        assert_eq!(
            rule.check(&values, "instagram_url").unwrap(),
            Some("Instagram URL is required".into())
        );

        values.insert("instagram_url", FieldValue::text("https://instagram.com/ana"));
        assert_eq!(rule.check(&values, "instagram_url").unwrap(), None);
    }

    #[test]
    fn dependent_choice_checks_parent_list() {
        let mut options = BTreeMap::new();
        options.insert("Maharashtra".to_string(), vec!["Mumbai".to_string()]);
        let rule = Rule::DependentOneOf {
            parent: "state".into(),
            options,
            message: "Pick a city in the selected state".into(),
        };
        let mut values = values_with("state", FieldValue::text("Maharashtra"));
        values.insert("city", FieldValue::text("mumbai"));
        assert_eq!(rule.check(&values, "city").unwrap(), None);

        values.insert("city", FieldValue::text("Chennai"));
        assert!(rule.check(&values, "city").unwrap().is_some());
    }

    #[test]
    fn offer_structure_flags_half_built_items() {
        let mut offer = Offer::new(OfferId(1));
        offer.items[0] = OfferItem {
            content_type: None,
            quantity: Some(1),
        };
        let values = values_with("offers", FieldValue::Offers(vec![offer]));
        let rule = Rule::OfferStructure {
            limits: OfferLimits::default(),
        };
        assert_eq!(
            rule.check(&values, "offers").unwrap(),
            Some("Offer 1, item 1: choose a content type".into())
        );
    }

    #[test]
    fn offer_structure_flags_single_with_many_items() {
        let mut offer = Offer::new(OfferId(1));
        offer.items.push(OfferItem::default());
        let values = values_with("offers", FieldValue::Offers(vec![offer]));
        let rule = Rule::OfferStructure {
            limits: OfferLimits::default(),
        };
        assert_eq!(
            rule.check(&values, "offers").unwrap(),
            Some("Offer 1: a single offer holds exactly one item".into())
        );
    }

    #[test]
    fn describe_names_each_rule() {
        let set = RuleSet::new()
            .required("r")
            .min_length(1, "m")
            .required_if("platforms", Condition::Contains("youtube".into()), "y");
        let described: Vec<String> = set.rules().iter().map(Rule::describe).collect();
        assert_eq!(
            described,
            vec![
                "required".to_string(),
                "min_length(1)".to_string(),
                "required_if(platforms contains youtube)".to_string(),
            ]
        );
    }
}
