//! Combinatorial expansion: streamed product, caps, and bounds.

use glimpse::bind::Context;
use glimpse::cards::CandidateGenerator;
use glimpse::prelude::*;
use glimpse::rules::parse_rule;

/// A wide table: ten temporal, ten numeric, and ten category fields.
fn wide_provider() -> StaticMetadataProvider {
    let mut provider = StaticMetadataProvider::new().with_table(
        TableMetadata::new(TableId(1), "events", DatabaseId(1))
            .with_entity_type(TypeTag::from(tags::EVENT_TABLE)),
    );
    for i in 0..10 {
        provider = provider
            .with_field(FieldMetadata::new(
                FieldId(100 + i),
                TableId(1),
                format!("ts_{i}"),
                TypeTag::from(tags::DATE_TIME),
            ))
            .with_field(FieldMetadata::new(
                FieldId(200 + i),
                TableId(1),
                format!("amount_{i}"),
                TypeTag::from(tags::FLOAT),
            ))
            .with_field(
                FieldMetadata::new(
                    FieldId(300 + i),
                    TableId(1),
                    format!("kind_{i}"),
                    TypeTag::from(tags::TEXT),
                )
                .with_special_type(TypeTag::from(tags::CATEGORY)),
            );
    }
    provider
}

fn three_dimension_rule() -> Rule {
    parse_rule(
        r#"{
            "table_type": "entity/EventTable",
            "title": "Event breakdown",
            "dimensions": [
                {"name": "Timestamp", "field_type": "type/Temporal", "score": 100},
                {"name": "Amount", "field_type": "type/Number", "score": 80},
                {"name": "Kind", "field_type": "type/Category", "score": 60}
            ],
            "metrics": [
                {"name": "Count", "overloads": [{"definition": ["count"], "score": 100}]}
            ],
            "cards": [
                {"name": "full-breakdown", "metrics": ["Count"],
                 "dimensions": ["Timestamp", "Amount", "Kind"], "score": 100}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_three_dimensions_with_ten_matches_each_yield_exactly_1000() {
    let provider = wide_provider();
    let root = provider.table(TableId(1)).unwrap();
    let rule = three_dimension_rule();
    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    let resolver = ReferenceResolver::new();
    let gate = ScopedPermissions;
    let principal = PermissionSet::unrestricted();
    let generator = CandidateGenerator::new(&context, &resolver, &gate, &principal);

    let template = &rule.cards[0].1;
    assert_eq!(generator.candidates(template).count(), 1000);
}

#[test]
fn test_expansion_is_lazy_enough_to_stop_early() {
    let provider = wide_provider();
    let root = provider.table(TableId(1)).unwrap();
    let rule = three_dimension_rule();
    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    let resolver = ReferenceResolver::new();
    let gate = ScopedPermissions;
    let principal = PermissionSet::unrestricted();
    let generator = CandidateGenerator::new(&context, &resolver, &gate, &principal);

    // Taking a handful off the front never walks the remaining product.
    let template = &rule.cards[0].1;
    let first_five: Vec<_> = generator.candidates(template).take(5).collect();
    assert_eq!(first_five.len(), 5);
    // Every candidate is a distinct combination.
    let mut queries: Vec<String> = first_five
        .iter()
        .map(|card| serde_json::to_string(&card.query).unwrap())
        .collect();
    queries.sort();
    queries.dedup();
    assert_eq!(queries.len(), 5);
}

#[test]
fn test_engine_cap_bounds_candidates_per_card() {
    let provider = wide_provider();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let config = EngineConfig {
        max_candidates_per_card: 7,
    };
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy())
        .with_config(config);

    let id = engine
        .build_dashboard(
            TableId(1),
            &[three_dimension_rule()],
            &PermissionSet::unrestricted(),
        )
        .unwrap();
    assert_eq!(id, Some(DashboardId(1)));
    assert_eq!(sink.created()[0].cards.len(), 7);
}

#[test]
fn test_candidate_scores_stay_within_the_template_weight() {
    let provider = wide_provider();
    let root = provider.table(TableId(1)).unwrap();
    let rule = three_dimension_rule();
    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    let resolver = ReferenceResolver::new();
    let gate = ScopedPermissions;
    let principal = PermissionSet::unrestricted();
    let generator = CandidateGenerator::new(&context, &resolver, &gate, &principal);

    // Components: Count 100, Timestamp 100, Amount 80, Kind 60.
    // 100 * 340 / (100 * 4) = 85.
    let template = &rule.cards[0].1;
    for card in generator.candidates(template).take(50) {
        assert!((card.score - 85.0).abs() < f64::EPSILON);
        assert!(card.score >= 0.0);
        assert!(card.score <= f64::from(template.score));
    }
}
