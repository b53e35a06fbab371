mod common;

use std::collections::BTreeSet;

use common::{listing_wizard, listing_wizard_with};
use onboard_core::config::{SingleKindPolicy, WizardConfig};
use onboard_core::domain::{ContentType, OfferId, OfferKind};
use onboard_core::errors::CollectionError;
use onboard_core::forms::{MemorySink, WizardController};

fn assert_offer_invariants(wizard: &WizardController<MemorySink>) {
    let offers = wizard.values().offers();
    assert!(offers.len() <= 6, "too many offers: {}", offers.len());
    let ids: BTreeSet<OfferId> = offers.iter().map(|offer| offer.id).collect();
    assert_eq!(ids.len(), offers.len(), "duplicate offer ids");
    for offer in offers {
        assert!(
            (1..=10).contains(&offer.items.len()),
            "{} has {} items",
            offer.id,
            offer.items.len()
        );
        if offer.kind == OfferKind::Single {
            assert_eq!(offer.items.len(), 1, "{} is single", offer.id);
        }
    }
}

#[test]
fn seven_adds_leave_six_offers_and_signal_limit() {
    let mut wizard = listing_wizard();
    let mut results = Vec::new();
    for _ in 0..7 {
        results.push(wizard.offers().add_offer());
    }

    assert!(results[..6].iter().all(Result::is_ok));
    assert_eq!(
        results[6],
        Err(CollectionError::LimitReached {
            what: "offers",
            limit: 6
        })
    );
    assert_eq!(wizard.values().offers().len(), 6);
    assert_offer_invariants(&wizard);
}

#[test]
fn invariants_hold_through_mixed_edit_sequence() {
    let mut wizard = listing_wizard();
    let first = wizard.offers().add_offer().unwrap();
    let second = wizard.offers().add_offer().unwrap();
    assert_offer_invariants(&wizard);

    let items_before = wizard.offers().offer(first).unwrap().items.clone();
    wizard.offers().set_offer_kind(first, OfferKind::Combo).unwrap();
    assert_eq!(wizard.offers().offer(first).unwrap().items, items_before);
    for _ in 0..12 {
        let _ = wizard.offers().add_item(first);
        assert_offer_invariants(&wizard);
    }
    assert_eq!(wizard.offers().offer(first).unwrap().items.len(), 10);

    for _ in 0..12 {
        let _ = wizard.offers().remove_item(first, 0);
        assert_offer_invariants(&wizard);
    }
    assert_eq!(wizard.offers().offer(first).unwrap().items.len(), 1);

    assert!(wizard.offers().add_item(second).unwrap_err().is_bound());
    wizard.offers().remove_offer(first);
    let third = wizard.offers().add_offer().unwrap();
    assert!(third != first && third != second);
    assert_offer_invariants(&wizard);
}

#[test]
fn removing_an_offer_keeps_other_offers_addressable() {
    let mut wizard = listing_wizard();
    let a = wizard.offers().add_offer().unwrap();
    let b = wizard.offers().add_offer().unwrap();
    let c = wizard.offers().add_offer().unwrap();
    wizard.offers().set_offer_price(c, 700.0).unwrap();

    wizard.offers().remove_offer(a);
    wizard.offers().rename_offer(c, "Reel pack").unwrap();

    let offer = wizard.offers().offer(c).cloned().unwrap();
    assert_eq!(offer.name, "Reel pack");
    assert_eq!(offer.price, 700.0);
    assert!(wizard.offers().offer(b).is_some());
    assert_eq!(
        wizard.offers().set_offer_price(a, 10.0),
        Err(CollectionError::OfferNotFound(a))
    );
}

#[test]
fn switching_to_single_follows_configured_policy() {
    for (policy, expected_items) in [
        (SingleKindPolicy::KeepFirst, 1),
        (SingleKindPolicy::Reject, 3),
    ] {
        let mut wizard = listing_wizard_with(WizardConfig {
            single_kind_policy: policy,
            ..WizardConfig::default()
        });
        let id = wizard.offers().add_offer().unwrap();
        wizard.offers().set_offer_kind(id, OfferKind::Combo).unwrap();
        wizard.offers().add_item(id).unwrap();
        wizard.offers().add_item(id).unwrap();
        wizard
            .offers()
            .update_item(id, 0, Some(ContentType::Reel), Some(2))
            .unwrap();

        let result = wizard.offers().set_offer_kind(id, OfferKind::Single);

        let offer = wizard.offers().offer(id).cloned().unwrap();
        assert_eq!(offer.items.len(), expected_items, "{:?}", policy);
        assert_eq!(offer.items[0].content_type, Some(ContentType::Reel));
        match policy {
            SingleKindPolicy::KeepFirst => {
                assert!(result.is_ok());
                assert_eq!(offer.kind, OfferKind::Single);
            }
            SingleKindPolicy::Reject => {
                assert!(matches!(
                    result,
                    Err(CollectionError::WouldDiscardItems { discarded: 2, .. })
                ));
                assert_eq!(offer.kind, OfferKind::Combo);
            }
        }
        assert_offer_invariants(&wizard);
    }
}

#[test]
fn configured_offer_limit_is_respected() {
    let mut wizard = listing_wizard_with(WizardConfig {
        max_offers: 2,
        ..WizardConfig::default()
    });
    wizard.offers().add_offer().unwrap();
    wizard.offers().add_offer().unwrap();
    assert_eq!(
        wizard.offers().add_offer(),
        Err(CollectionError::LimitReached {
            what: "offers",
            limit: 2
        })
    );
}
