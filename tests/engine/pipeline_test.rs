//! End-to-end pipeline tests: rule selection through dashboard creation.

use glimpse::prelude::*;
use glimpse::rules::parse_rule;

/// An "orders" table with a primary key, two timestamps, and a total.
fn orders_provider() -> StaticMetadataProvider {
    StaticMetadataProvider::new()
        .with_table(
            TableMetadata::new(TableId(1), "orders", DatabaseId(1))
                .with_entity_type(TypeTag::from(tags::TRANSACTION_TABLE)),
        )
        .with_field(
            FieldMetadata::new(FieldId(10), TableId(1), "id", TypeTag::from(tags::BIG_INTEGER))
                .with_special_type(TypeTag::from(tags::PRIMARY_KEY)),
        )
        .with_field(FieldMetadata::new(
            FieldId(11),
            TableId(1),
            "created_at",
            TypeTag::from(tags::DATE_TIME),
        ))
        .with_field(FieldMetadata::new(
            FieldId(12),
            TableId(1),
            "updated_at",
            TypeTag::from(tags::DATE_TIME),
        ))
        .with_field(FieldMetadata::new(
            FieldId(13),
            TableId(1),
            "total",
            TypeTag::from(tags::FLOAT),
        ))
}

/// A transactions rule with a redundantly declared temporal dimension, one
/// metric, and one card breaking out the metric by the dimension.
fn transactions_rule() -> Rule {
    parse_rule(
        r#"{
            "table_type": "entity/TransactionTable",
            "title": "Transaction overview",
            "description": "Automatic look at recent activity",
            "dimensions": [
                {"name": "CreatedAt", "field_type": "type/Temporal", "score": 80},
                {"name": "CreatedAt", "field_type": "type/DateTime", "score": 60}
            ],
            "metrics": [
                {"name": "Count", "overloads": [{"definition": ["count"], "score": 100}]}
            ],
            "cards": [
                {"name": "count-over-time", "title": "Orders over time",
                 "metrics": ["Count"], "dimensions": ["CreatedAt"], "score": 100}
            ]
        }"#,
    )
    .unwrap()
}

#[test]
fn test_end_to_end_builds_one_candidate_per_matching_field() {
    let provider = orders_provider();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let id = engine
        .build_dashboard(TableId(1), &[transactions_rule()], &PermissionSet::unrestricted())
        .unwrap();
    assert_eq!(id, Some(DashboardId(1)));

    let created = sink.created();
    assert_eq!(created.len(), 1);
    let dashboard = &created[0];
    assert_eq!(dashboard.title, "Transaction overview");
    assert_eq!(
        dashboard.description.as_deref(),
        Some("Automatic look at recent activity")
    );

    // Two temporal fields matched, so the one card template yields two
    // candidates, one per field.
    assert_eq!(dashboard.cards.len(), 2);
    let mut breakout_fields: Vec<_> = dashboard
        .cards
        .iter()
        .map(|card| card.query.breakout.clone())
        .collect();
    breakout_fields.sort_by_key(|forms| format!("{forms:?}"));
    assert_eq!(
        breakout_fields,
        vec![
            vec![Form::FieldRef(FieldReference::Field(FieldId(11)))],
            vec![Form::FieldRef(FieldReference::Field(FieldId(12)))],
        ]
    );

    // The duplicate dimension declaration kept the higher score (80), so
    // each candidate realizes 100 * (100 + 80) / (100 * 2) = 90.
    for card in &dashboard.cards {
        assert!((card.score - 90.0).abs() < f64::EPSILON);
        assert!(card.score <= 100.0);
        assert_eq!(card.query.aggregation, vec![Form::op("count", vec![])]);
        assert_eq!(card.query.database, DatabaseId(1));
        assert_eq!(card.query.source_table, TableId(1));
        assert_eq!(card.title.as_deref(), Some("Orders over time"));
    }

    // Cards arrive ranked by score, descending.
    let scores: Vec<f64> = dashboard.cards.iter().map(|card| card.score).collect();
    let mut ranked = scores.clone();
    ranked.sort_by(|a, b| b.total_cmp(a));
    assert_eq!(scores, ranked);
}

#[test]
fn test_no_applicable_rule_creates_nothing() {
    let provider = StaticMetadataProvider::new().with_table(
        TableMetadata::new(TableId(1), "people", DatabaseId(1))
            .with_entity_type(TypeTag::from(tags::USER_TABLE)),
    );
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let id = engine
        .build_dashboard(TableId(1), &[transactions_rule()], &PermissionSet::unrestricted())
        .unwrap();
    assert_eq!(id, None);
    // The sink was never called.
    assert!(sink.created().is_empty());
}

#[test]
fn test_fully_denied_principal_creates_nothing() {
    let provider = orders_provider();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let id = engine
        .build_dashboard(TableId(1), &[transactions_rule()], &PermissionSet::none())
        .unwrap();
    assert_eq!(id, None);
    assert!(sink.created().is_empty());
}

#[test]
fn test_most_specific_rule_shapes_the_dashboard() {
    let provider = orders_provider();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let generic = parse_rule(
        r#"{
            "table_type": "entity/GenericTable",
            "title": "Generic overview",
            "metrics": [
                {"name": "Count", "overloads": [{"definition": ["count"], "score": 100}]}
            ],
            "cards": [{"name": "total", "metrics": ["Count"], "score": 50}]
        }"#,
    )
    .unwrap();

    let id = engine
        .build_dashboard(
            TableId(1),
            &[generic, transactions_rule()],
            &PermissionSet::unrestricted(),
        )
        .unwrap();
    assert_eq!(id, Some(DashboardId(1)));
    // The transaction rule is more specific than the generic one,
    // regardless of rule order.
    assert_eq!(sink.created()[0].title, "Transaction overview");
}

#[test]
fn test_unknown_table_propagates_metadata_error() {
    let provider = StaticMetadataProvider::new();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let err = engine
        .build_dashboard(TableId(404), &[transactions_rule()], &PermissionSet::unrestricted())
        .unwrap_err();
    assert!(matches!(err, EngineError::MetadataUnavailable(_)));
}

#[test]
fn test_broken_rule_library_propagates_rule_error() {
    struct BrokenLibrary;
    impl RuleLibrary for BrokenLibrary {
        fn load_rules(&self) -> Result<Vec<Rule>, glimpse::rules::RuleError> {
            Err(glimpse::rules::RuleError::InvalidRuleDefinition(
                "truncated document".to_string(),
            ))
        }
    }

    let provider = orders_provider();
    let gate = ScopedPermissions;
    let sink = RecordingSink::new();
    let engine = DashboardEngine::new(&provider, &gate, &sink, default_taxonomy());

    let err = engine
        .build_from_library(TableId(1), &BrokenLibrary, &PermissionSet::unrestricted())
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRuleDefinition(_)));
}
