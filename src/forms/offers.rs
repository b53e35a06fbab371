//! Editing operations for the `offers` field.
//!
//! The editor never keeps its own copy of the offer list: each operation
//! reads the list from the store, builds the replacement, and writes it back
//! in one `set`. Failed operations write nothing.

use onboard_config::{SingleKindPolicy, WizardConfig};
use onboard_domain::{
    keys, ContentType, FieldValue, Offer, OfferId, OfferIdAllocator, OfferItem, OfferKind,
};
use tracing::{debug, warn};

use super::store::FormStateStore;
use crate::errors::CollectionError;

const MIN_ITEMS_PER_OFFER: usize = 1;

pub struct OfferCollectionEditor<'a> {
    store: &'a mut FormStateStore,
    ids: &'a mut OfferIdAllocator,
    config: &'a WizardConfig,
}

impl<'a> OfferCollectionEditor<'a> {
    pub fn new(
        store: &'a mut FormStateStore,
        ids: &'a mut OfferIdAllocator,
        config: &'a WizardConfig,
    ) -> Self {
        Self { store, ids, config }
    }

    pub fn offers(&self) -> &[Offer] {
        self.store.values().offers()
    }

    pub fn offer(&self, id: OfferId) -> Option<&Offer> {
        self.offers().iter().find(|offer| offer.id == id)
    }

    /// Appends a single-item offer priced at zero and returns its new id.
    pub fn add_offer(&mut self) -> Result<OfferId, CollectionError> {
        let mut offers = self.offers().to_vec();
        if offers.len() >= self.config.max_offers {
            return Err(self.signal(CollectionError::LimitReached {
                what: "offers",
                limit: self.config.max_offers,
            }));
        }
        let Some(id) = self.ids.allocate() else {
            return Err(self.signal(CollectionError::IdsExhausted));
        };
        offers.push(Offer::new(id));
        self.commit(offers);
        debug!(offer = %id, "added offer");
        Ok(id)
    }

    /// Removes the offer with `id`. Unknown ids are ignored.
    pub fn remove_offer(&mut self, id: OfferId) -> Option<Offer> {
        let mut offers = self.offers().to_vec();
        let position = offers.iter().position(|offer| offer.id == id)?;
        let removed = offers.remove(position);
        self.commit(offers);
        debug!(offer = %id, "removed offer");
        Some(removed)
    }

    /// Switching to single keeps only the first item under
    /// [`SingleKindPolicy::KeepFirst`], or refuses under
    /// [`SingleKindPolicy::Reject`] when items would be lost.
    pub fn set_offer_kind(&mut self, id: OfferId, kind: OfferKind) -> Result<(), CollectionError> {
        let policy = self.config.single_kind_policy;
        self.modify(id, |offer| {
            if offer.kind == kind {
                return Ok(());
            }
            if kind == OfferKind::Single && offer.items.len() > 1 {
                match policy {
                    SingleKindPolicy::KeepFirst => offer.items.truncate(1),
                    SingleKindPolicy::Reject => {
                        return Err(CollectionError::WouldDiscardItems {
                            offer: id,
                            discarded: offer.items.len() - 1,
                        })
                    }
                }
            }
            offer.kind = kind;
            Ok(())
        })
    }

    pub fn rename_offer(&mut self, id: OfferId, name: &str) -> Result<(), CollectionError> {
        self.modify(id, |offer| {
            offer.name = name.trim().to_string();
            Ok(())
        })
    }

    /// Stores the price as given; negative prices are caught by validation.
    /// `inf` and `NaN` are refused outright.
    pub fn set_offer_price(&mut self, id: OfferId, price: f64) -> Result<(), CollectionError> {
        self.modify(id, |offer| {
            if !price.is_finite() {
                return Err(CollectionError::InvalidPrice(id));
            }
            offer.price = price;
            Ok(())
        })
    }

    /// Appends a `Post × 1` item and returns its position. Single offers and
    /// full combos refuse with `LimitReached`.
    pub fn add_item(&mut self, id: OfferId) -> Result<usize, CollectionError> {
        let max_items = self.config.max_items_per_offer;
        self.modify(id, |offer| {
            let limit = match offer.kind {
                OfferKind::Single => 1,
                OfferKind::Combo => max_items,
            };
            if offer.items.len() >= limit {
                return Err(CollectionError::LimitReached {
                    what: "items per offer",
                    limit,
                });
            }
            offer.items.push(OfferItem::default());
            Ok(offer.items.len() - 1)
        })
    }

    /// Removes the item at `index`; the last remaining item cannot go.
    pub fn remove_item(&mut self, id: OfferId, index: usize) -> Result<OfferItem, CollectionError> {
        self.modify(id, |offer| {
            if index >= offer.items.len() {
                return Err(CollectionError::ItemNotFound { offer: id, index });
            }
            if offer.items.len() <= MIN_ITEMS_PER_OFFER {
                return Err(CollectionError::MinimumReached {
                    minimum: MIN_ITEMS_PER_OFFER,
                });
            }
            Ok(offer.items.remove(index))
        })
    }

    /// Overwrites one item. `None` halves model a row the user is still
    /// filling in.
    pub fn update_item(
        &mut self,
        id: OfferId,
        index: usize,
        content_type: Option<ContentType>,
        quantity: Option<u32>,
    ) -> Result<(), CollectionError> {
        self.modify(id, |offer| {
            let item = offer
                .items
                .get_mut(index)
                .ok_or(CollectionError::ItemNotFound { offer: id, index })?;
            item.content_type = content_type;
            item.quantity = quantity;
            Ok(())
        })
    }

    /// Moves an offer to `position` (clamped to the end). Ids are preserved.
    pub fn move_offer(&mut self, id: OfferId, position: usize) -> Result<(), CollectionError> {
        let mut offers = self.offers().to_vec();
        let Some(current) = offers.iter().position(|offer| offer.id == id) else {
            return Err(self.signal(CollectionError::OfferNotFound(id)));
        };
        let offer = offers.remove(current);
        let target = position.min(offers.len());
        offers.insert(target, offer);
        self.commit(offers);
        Ok(())
    }

    fn modify<T, F>(&mut self, id: OfferId, apply: F) -> Result<T, CollectionError>
    where
        F: FnOnce(&mut Offer) -> Result<T, CollectionError>,
    {
        let mut offers = self.offers().to_vec();
        let Some(offer) = offers.iter_mut().find(|offer| offer.id == id) else {
            return Err(self.signal(CollectionError::OfferNotFound(id)));
        };
        match apply(offer) {
            Ok(result) => {
                self.commit(offers);
                Ok(result)
            }
            Err(err) => Err(self.signal(err)),
        }
    }

    fn commit(&mut self, offers: Vec<Offer>) {
        self.store.set(keys::OFFERS, FieldValue::Offers(offers));
    }

    fn signal(&self, err: CollectionError) -> CollectionError {
        warn!(error = %err, "offer edit ignored");
        err
    }
}
