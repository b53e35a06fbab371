#![allow(dead_code)]

use onboard_core::config::WizardConfig;
use onboard_core::domain::{keys, FieldValue, FileHandle};
use onboard_core::forms::{MemorySink, WizardContext, WizardController};

pub fn listing_wizard() -> WizardController<MemorySink> {
    listing_wizard_with(WizardConfig::default())
}

pub fn listing_wizard_with(config: WizardConfig) -> WizardController<MemorySink> {
    WizardController::listing(config, WizardContext::default(), MemorySink::new())
        .expect("listing wizard builds")
}

/// Step 1 answers for a YouTube-only creator based in Mumbai.
pub fn youtube_profile() -> Vec<(String, FieldValue)> {
    vec![
        (keys::NAME.into(), FieldValue::text("Ana")),
        (keys::PLATFORMS.into(), FieldValue::set(["youtube"])),
        (
            keys::YOUTUBE_URL.into(),
            FieldValue::text("https://youtube.com/@ana"),
        ),
        (keys::CATEGORIES.into(), FieldValue::set(["Travel", "Food"])),
        (keys::LANGUAGES.into(), FieldValue::set(["English", "Hindi"])),
        (keys::STATE.into(), FieldValue::text("Maharashtra")),
        (keys::CITY.into(), FieldValue::text("Mumbai")),
        (keys::LOCALITY.into(), FieldValue::text("Bandra")),
    ]
}

/// Step 2 prices required once a YouTube URL is present.
pub fn youtube_rates() -> Vec<(String, FieldValue)> {
    vec![
        (keys::YOUTUBE_VIDEO_PRICE.into(), FieldValue::Number(5000.0)),
        (keys::YOUTUBE_SHORT_PRICE.into(), FieldValue::Number(1500.0)),
    ]
}

pub fn placeholder_image() -> FieldValue {
    FieldValue::File(FileHandle::new("upload://placeholder.png"))
}
