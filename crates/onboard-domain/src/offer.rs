//! Offers: priced bundles of content deliverables attached to a listing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle for an offer. Allocated once and never handed out again,
/// even after the offer is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfferId(pub u64);

impl fmt::Display for OfferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offer-{}", self.0)
    }
}

/// Hands out monotonically increasing [`OfferId`] values. Once `u64::MAX`
/// has been seen the allocator is exhausted and hands out nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferIdAllocator {
    next: u64,
    #[serde(default)]
    exhausted: bool,
}

impl OfferIdAllocator {
    pub fn new() -> Self {
        Self {
            next: 1,
            exhausted: false,
        }
    }

    /// Builds an allocator whose first id is above every id in `offers`.
    pub fn seeded_above(offers: &[Offer]) -> Self {
        let highest = offers.iter().map(|offer| offer.id.0).max().unwrap_or(0);
        match highest.checked_add(1) {
            Some(next) => Self {
                next,
                exhausted: false,
            },
            None => Self {
                next: u64::MAX,
                exhausted: true,
            },
        }
    }

    /// Raises the next id so it stays above every id in `offers`.
    pub fn observe(&mut self, offers: &[Offer]) {
        let seeded = Self::seeded_above(offers);
        self.next = self.next.max(seeded.next);
        self.exhausted |= seeded.exhausted;
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Returns `None` once every id has been handed out.
    pub fn allocate(&mut self) -> Option<OfferId> {
        if self.exhausted {
            return None;
        }
        let id = self.next.max(1);
        match id.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
        Some(OfferId(id))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferKind {
    #[default]
    Single,
    Combo,
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OfferKind::Single => "Single",
            OfferKind::Combo => "Combo",
        };
        f.write_str(label)
    }
}

impl OfferKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Some(OfferKind::Single),
            "combo" => Some(OfferKind::Combo),
            _ => None,
        }
    }
}

/// Deliverable formats an influencer can sell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Post,
    Reel,
    Story,
    ShortVideo,
    LongVideo,
}

impl ContentType {
    pub const ALL: [ContentType; 5] = [
        ContentType::Post,
        ContentType::Reel,
        ContentType::Story,
        ContentType::ShortVideo,
        ContentType::LongVideo,
    ];

    /// Accepts display labels as well as snake_case keys.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.key().replace('_', "") == normalized)
    }

    pub fn key(self) -> &'static str {
        match self {
            ContentType::Post => "post",
            ContentType::Reel => "reel",
            ContentType::Story => "story",
            ContentType::ShortVideo => "short_video",
            ContentType::LongVideo => "long_video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentType::Post => "Post",
            ContentType::Reel => "Reel",
            ContentType::Story => "Story",
            ContentType::ShortVideo => "Short video",
            ContentType::LongVideo => "Long video",
        };
        f.write_str(label)
    }
}

/// One content-type/quantity pair within an offer.
///
/// Both halves are optional so a half-edited row can be held in form state;
/// validation rejects such rows before a step can advance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferItem {
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

impl OfferItem {
    pub fn new(content_type: ContentType, quantity: u32) -> Self {
        Self {
            content_type: Some(content_type),
            quantity: Some(quantity),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.content_type.is_some() && self.quantity.is_some()
    }
}

impl Default for OfferItem {
    fn default() -> Self {
        Self::new(ContentType::Post, 1)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub kind: OfferKind,
    #[serde(default)]
    pub name: String,
    pub price: f64,
    pub items: Vec<OfferItem>,
}

impl Offer {
    /// A fresh single-item offer priced at zero.
    pub fn new(id: OfferId) -> Self {
        Self {
            id,
            kind: OfferKind::Single,
            name: String::new(),
            price: 0.0,
            items: vec![OfferItem::default()],
        }
    }

    pub fn total_quantity(&self) -> u32 {
        self.items.iter().filter_map(|item| item.quantity).sum()
    }
}
