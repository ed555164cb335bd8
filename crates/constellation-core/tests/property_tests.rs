//! # Property-Based Tests
//!
//! Verification tests using proptest.
//!
//! These tests check persistence round-trips, frequency validation and
//! membership counting against arbitrary inputs.

use constellation_core::{
    Color, ConfigNode, Constellation, ConstellationRegistry, Frequency, Settings, VesselCache,
    VesselId, VesselKind, VesselRef, document_from_text, document_to_text, is_frequency_valid,
};
use proptest::collection::{btree_set, vec};
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

fn frequency() -> impl Strategy<Value = Frequency> {
    (0i64..=32767).prop_map(|f| Frequency::new(f).expect("in range"))
}

fn color() -> impl Strategy<Value = Color> {
    (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
        .prop_map(|(r, g, b, a)| Color::new(r, g, b, a).expect("in range"))
}

/// Names the text format carries unchanged: no line breaks, no outer spaces.
fn name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9]([A-Za-z0-9 _.-]{0,14}[A-Za-z0-9])?"
}

fn constellation() -> impl Strategy<Value = Constellation> {
    (frequency(), name(), color()).prop_map(|(f, n, c)| Constellation::new(f, n, c))
}

/// Non-empty lists with unique frequencies.
fn constellation_list() -> impl Strategy<Value = Vec<Constellation>> {
    vec(constellation(), 1..20).prop_map(|mut list| {
        list.sort_by_key(|c| c.frequency);
        list.dedup_by_key(|c| c.frequency);
        list
    })
}

fn kind() -> impl Strategy<Value = VesselKind> {
    prop_oneof![
        Just(VesselKind::Base),
        Just(VesselKind::Probe),
        Just(VesselKind::Relay),
        Just(VesselKind::Ship),
        Just(VesselKind::Debris),
        Just(VesselKind::Flag),
        Just(VesselKind::Eva),
    ]
}

fn vessel_population() -> impl Strategy<Value = Vec<VesselRef>> {
    vec(
        (kind(), any::<bool>(), btree_set(0i64..8, 0..4)),
        0..40,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (kind, connected, freqs))| {
                let vessel = VesselRef::new(VesselId(i as u64), format!("V{}", i), kind);
                if connected {
                    vessel.with_connection(
                        freqs
                            .into_iter()
                            .map(|f| Frequency::new(f).expect("in range")),
                    )
                } else {
                    vessel
                }
            })
            .collect()
    })
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// `is_frequency_valid` is exactly the [0, 32767] range check.
    #[test]
    fn frequency_validity_matches_range(value in any::<i64>()) {
        prop_assert_eq!(is_frequency_valid(value), (0..=32767).contains(&value));
        prop_assert_eq!(Frequency::new(value).is_ok(), is_frequency_valid(value));
    }

    /// save -> load reproduces the registry through the document tree.
    #[test]
    fn document_roundtrip(list in constellation_list()) {
        let settings = Settings::default();
        let mut registry = ConstellationRegistry::from_defaults(&settings);
        prop_assert!(registry.replace_all(list));

        let mut doc = ConfigNode::new("SCENARIO");
        registry.save(&mut doc);
        let restored = ConstellationRegistry::load(&doc, &settings);

        prop_assert_eq!(restored, registry);
    }

    /// save -> text -> parse -> load reproduces the registry.
    #[test]
    fn text_roundtrip(list in constellation_list()) {
        let settings = Settings::default();
        let mut registry = ConstellationRegistry::from_defaults(&settings);
        prop_assert!(registry.replace_all(list));

        let mut doc = ConfigNode::new("");
        registry.save(&mut doc);
        let text = document_to_text(&doc).expect("write");
        let parsed = document_from_text(&text).expect("parse");
        prop_assert_eq!(&parsed, &doc);

        let restored = ConstellationRegistry::load(&parsed, &settings);
        prop_assert_eq!(restored, registry);
    }

    /// Saving twice produces identical documents.
    #[test]
    fn save_is_idempotent(list in constellation_list()) {
        let settings = Settings::default();
        let mut registry = ConstellationRegistry::from_defaults(&settings);
        prop_assert!(registry.replace_all(list));

        let mut once = ConfigNode::new("SCENARIO");
        registry.save(&mut once);
        let mut twice = once.clone();
        registry.save(&mut twice);

        prop_assert_eq!(once, twice);
    }

    /// Loaded registries are always ascending by frequency.
    #[test]
    fn load_orders_by_frequency(list in vec(constellation(), 1..20)) {
        let mut doc = ConfigNode::new("SCENARIO");
        let root = doc.add_node(ConfigNode::new("Constellations"));
        for c in &list {
            root.add_node(constellation_core::constellation_to_node(c));
        }

        let registry = ConstellationRegistry::load(&doc, &Settings::default());
        prop_assert_eq!(registry.len(), list.len());
        prop_assert!(registry
            .constellations()
            .windows(2)
            .all(|w| w[0].frequency <= w[1].frequency));
    }

    /// Query results contain exactly the eligible vessels, and member counts
    /// agree with a direct scan.
    #[test]
    fn cache_matches_direct_scan(population in vec_population_and_frequency()) {
        let (population, f) = population;
        let mut cache = VesselCache::new();

        let all = cache.query(&population, None);
        let expected: Vec<VesselId> = population
            .iter()
            .filter(|v| v.is_eligible())
            .map(|v| v.id)
            .collect();
        prop_assert_eq!(all.iter().map(|v| v.id).collect::<Vec<_>>(), expected);

        let direct = population
            .iter()
            .filter(|v| v.is_eligible() && v.participates_in(f))
            .count();
        prop_assert_eq!(cache.count_members(&population, f), direct);
        prop_assert_eq!(cache.query(&population, Some(f)).len(), direct);
        prop_assert_eq!(cache.rebuild_count(), 1);
    }
}

fn vec_population_and_frequency() -> impl Strategy<Value = (Vec<VesselRef>, Frequency)> {
    (
        vessel_population(),
        (0i64..8).prop_map(|f| Frequency::new(f).expect("in range")),
    )
}
