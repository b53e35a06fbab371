//! The open record of named fields collected by the wizard.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::offer::Offer;

/// Field keys shared between the step definitions and the offer editor.
pub mod keys {
    pub const NAME: &str = "name";
    pub const PLATFORMS: &str = "platforms";
    pub const INSTAGRAM_URL: &str = "instagram_url";
    pub const YOUTUBE_URL: &str = "youtube_url";
    pub const CATEGORIES: &str = "categories";
    pub const LANGUAGES: &str = "languages";
    pub const STATE: &str = "state";
    pub const CITY: &str = "city";
    pub const LOCALITY: &str = "locality";
    pub const INSTAGRAM_POST_PRICE: &str = "instagram_post_price";
    pub const INSTAGRAM_REEL_PRICE: &str = "instagram_reel_price";
    pub const INSTAGRAM_STORY_PRICE: &str = "instagram_story_price";
    pub const INSTAGRAM_CAROUSEL_PRICE: &str = "instagram_carousel_price";
    pub const YOUTUBE_VIDEO_PRICE: &str = "youtube_video_price";
    pub const YOUTUBE_SHORT_PRICE: &str = "youtube_short_price";
    pub const STARTING_PRICE: &str = "starting_price";
    pub const OFFERS: &str = "offers";
    pub const PROFILE_IMAGE: &str = "profile_image";
    pub const COVER_IMAGE: &str = "cover_image";
    pub const BIO: &str = "bio";
}

/// Opaque reference to an uploaded file. The wizard stores and forwards it
/// without looking inside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl FileHandle {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            file_name: None,
            media_type: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Set(BTreeSet<String>),
    Offers(Vec<Offer>),
    File(FileHandle),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn set<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::Set(values.into_iter().map(Into::into).collect())
    }

    /// Blank text, empty collections and empty file references count as
    /// empty. Numbers never do, not even NaN.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::Set(values) => values.is_empty(),
            FieldValue::Offers(offers) => offers.is_empty(),
            FieldValue::File(handle) => handle.reference.trim().is_empty(),
        }
    }

    /// Finite numeric view of the value. Text is parsed after trimming;
    /// `inf` and `NaN` yield `None`.
    pub fn as_number(&self) -> Option<f64> {
        let number = match self {
            FieldValue::Number(value) => *value,
            FieldValue::Text(text) => text.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        number.is_finite().then_some(number)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            FieldValue::Set(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_offers(&self) -> Option<&[Offer]> {
        match self {
            FieldValue::Offers(offers) => Some(offers.as_slice()),
            _ => None,
        }
    }

    /// Length used by min/max length rules: characters for text, members for
    /// collections. Scalars have no length.
    pub fn length(&self) -> Option<usize> {
        match self {
            FieldValue::Text(text) => Some(text.trim().chars().count()),
            FieldValue::Set(values) => Some(values.len()),
            FieldValue::Offers(offers) => Some(offers.len()),
            FieldValue::Number(_) | FieldValue::File(_) => None,
        }
    }

    /// Whether the value is, or contains, `member` (case-insensitive).
    pub fn contains(&self, member: &str) -> bool {
        match self {
            FieldValue::Set(values) => values
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(member)),
            FieldValue::Text(text) => text.trim().eq_ignore_ascii_case(member),
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<Vec<Offer>> for FieldValue {
    fn from(value: Vec<Offer>) -> Self {
        FieldValue::Offers(value)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(value: FileHandle) -> Self {
        FieldValue::File(value)
    }
}

/// Named field values accumulated across wizard steps.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    fields: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// True when the field is absent or holds an empty value.
    pub fn is_blank(&self, key: &str) -> bool {
        self.fields.get(key).map_or(true, FieldValue::is_empty)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(FieldValue::as_text)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(FieldValue::as_number)
    }

    /// Offers stored under [`keys::OFFERS`]; empty when none were added.
    pub fn offers(&self) -> &[Offer] {
        self.fields
            .get(keys::OFFERS)
            .and_then(FieldValue::as_offers)
            .unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
