//! Context construction and dimension binding over linked tables.

use glimpse::bind::Context;
use glimpse::prelude::*;

/// Orders with a foreign key to users; users carry a name column.
fn linked_provider() -> StaticMetadataProvider {
    StaticMetadataProvider::new()
        .with_table(
            TableMetadata::new(TableId(1), "orders", DatabaseId(1))
                .with_entity_type(TypeTag::from(tags::TRANSACTION_TABLE)),
        )
        .with_table(
            TableMetadata::new(TableId(2), "users", DatabaseId(1))
                .with_entity_type(TypeTag::from(tags::USER_TABLE)),
        )
        .with_field(FieldMetadata::new(
            FieldId(10),
            TableId(1),
            "created_at",
            TypeTag::from(tags::DATE_TIME),
        ))
        .with_field(
            FieldMetadata::new(FieldId(11), TableId(1), "user_id", TypeTag::from(tags::INTEGER))
                .with_special_type(TypeTag::from(tags::FOREIGN_KEY))
                .with_fk_target(FieldId(20)),
        )
        .with_field(
            FieldMetadata::new(FieldId(20), TableId(2), "id", TypeTag::from(tags::BIG_INTEGER))
                .with_special_type(TypeTag::from(tags::PRIMARY_KEY)),
        )
        .with_field(
            FieldMetadata::new(FieldId(21), TableId(2), "name", TypeTag::from(tags::TEXT))
                .with_special_type(TypeTag::from(tags::NAME)),
        )
}

fn rule_with_dimensions(dimensions: Vec<(&str, DimensionSpec)>) -> Rule {
    Rule {
        table_type: TypeTag::from(tags::TRANSACTION_TABLE),
        title: "Transactions".to_string(),
        description: None,
        dimensions: dimensions
            .into_iter()
            .map(|(name, spec)| (name.to_string(), spec))
            .collect(),
        metrics: vec![],
        filters: vec![],
        cards: vec![],
    }
}

#[test]
fn test_base_context_records_one_hop_links() {
    let provider = linked_provider();
    let root = provider.table(TableId(1)).unwrap();
    let context = Context::base(&provider, root).unwrap();

    assert_eq!(context.database_id, DatabaseId(1));
    assert_eq!(context.fields.len(), 2);
    assert_eq!(context.linked_tables.len(), 1);
    let linked = &context.linked_tables[0];
    assert_eq!(linked.table.id, TableId(2));
    assert_eq!(linked.via_fk_field_id, FieldId(11));
    assert_eq!(context.linked_table_fields(TableId(2)).len(), 2);
}

#[test]
fn test_cross_table_dimension_binds_with_link_tag() {
    let provider = linked_provider();
    let root = provider.table(TableId(1)).unwrap();
    let spec = DimensionSpec::new(FieldTypeSpec::Type(TypeTag::from(tags::NAME)), 90)
        .via_linked_table(TypeTag::from(tags::USER_TABLE));
    let rule = rule_with_dimensions(vec![("UserName", spec)]);

    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    let binding = &context.dimension_bindings["UserName"];
    assert_eq!(binding.score, 90);
    assert_eq!(binding.matches.len(), 1);
    let matched = &binding.matches[0];
    assert_eq!(matched.id, FieldId(21));
    // Matched through the linked table, so the match carries the
    // foreign-key hop that found it.
    assert_eq!(matched.link, Some(FieldId(11)));
}

#[test]
fn test_unmatched_dimensions_are_discarded_not_kept_empty() {
    let provider = linked_provider();
    let root = provider.table(TableId(1)).unwrap();
    let rule = rule_with_dimensions(vec![
        (
            "CreatedAt",
            DimensionSpec::new(FieldTypeSpec::Type(TypeTag::from(tags::TEMPORAL)), 80),
        ),
        (
            "Income",
            DimensionSpec::new(FieldTypeSpec::Type(TypeTag::from(tags::INCOME)), 100),
        ),
    ]);

    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    assert!(context.dimension_bindings.contains_key("CreatedAt"));
    assert!(!context.dimension_bindings.contains_key("Income"));
    for binding in context.dimension_bindings.values() {
        assert!(!binding.matches.is_empty());
    }
}

#[test]
fn test_cross_table_spec_without_qualifying_link_binds_nothing() {
    let provider = linked_provider();
    let root = provider.table(TableId(1)).unwrap();
    // Users are linked, but nothing of entity/EventTable is.
    let spec = DimensionSpec::new(FieldTypeSpec::Type(TypeTag::from(tags::NAME)), 90)
        .via_linked_table(TypeTag::from(tags::EVENT_TABLE));
    let rule = rule_with_dimensions(vec![("EventName", spec)]);

    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();
    assert!(context.dimension_bindings.is_empty());
}

#[test]
fn test_metric_eligibility_follows_dimension_availability() {
    let provider = linked_provider();
    let root = provider.table(TableId(1)).unwrap();
    let mut rule = rule_with_dimensions(vec![(
        "CreatedAt",
        DimensionSpec::new(FieldTypeSpec::Type(TypeTag::from(tags::TEMPORAL)), 80),
    )]);
    rule.metrics = vec![
        DefinitionGroup {
            name: "Count".to_string(),
            overloads: vec![Overload {
                body: Form::op("count", vec![]),
                score: 100,
            }],
        },
        DefinitionGroup {
            name: "Revenue".to_string(),
            overloads: vec![Overload {
                body: Form::op("sum", vec![Form::dimension("Income")]),
                score: 100,
            }],
        },
    ];

    let context = Context::for_rule(&provider, default_taxonomy(), root, &rule).unwrap();

    assert!(context.resolved_metrics.contains_key("Count"));
    // "Revenue" references a dimension that never bound.
    assert!(!context.resolved_metrics.contains_key("Revenue"));
}
