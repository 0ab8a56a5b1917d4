//! Rule document parsing against a realistic, full-shape rule.

use glimpse::prelude::*;
use glimpse::query::SortDirection;
use glimpse::rules::{parse_rules, RuleError};

const TRANSACTIONS_DOC: &str = r#"[
    {
        "table_type": "entity/TransactionTable",
        "title": "Transaction overview",
        "description": "Automatic look at recent activity",
        "dimensions": [
            {"name": "Timestamp", "field_type": "type/CreationTimestamp", "score": 100},
            {"name": "Timestamp", "field_type": "type/Temporal", "score": 60},
            {"name": "Buyer", "field_type": "type/Name", "score": 80,
             "linked_to": "entity/UserTable"},
            {"name": "Discount", "field_type": "discount", "score": 50}
        ],
        "metrics": [
            {"name": "Count", "overloads": [{"definition": ["count"], "score": 100}]},
            {"name": "Revenue", "overloads": [
                {"definition": ["sum", ["dimension", "Income"]], "score": 100},
                {"definition": ["count"], "score": 30}
            ]}
        ],
        "filters": [
            {"name": "Recent", "overloads": [
                {"definition": ["time-interval", ["dimension", "Timestamp"], -30, "day"],
                 "score": 100}
            ]}
        ],
        "cards": [
            {"name": "volume-over-time", "title": "Volume over time", "display": "line",
             "metrics": ["Count"], "filters": ["Recent"], "dimensions": ["Timestamp"],
             "score": 100, "limit": 365,
             "order_by": [{"target": "Timestamp"}, {"target": "Count", "direction": "descending"}]}
        ]
    }
]"#;

#[test]
fn test_full_document_parses_into_ordered_structures() {
    let rules = parse_rules(TRANSACTIONS_DOC).unwrap();
    assert_eq!(rules.len(), 1);
    let rule = &rules[0];

    assert_eq!(rule.table_type, TypeTag::from(tags::TRANSACTION_TABLE));
    // Declaration order survives parsing, duplicates included - dedup is
    // the binder's job, not the loader's.
    let names: Vec<&str> = rule.dimensions.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["Timestamp", "Timestamp", "Buyer", "Discount"]);

    let buyer = &rule.dimensions[2].1;
    assert_eq!(
        buyer.linked_table_type,
        Some(TypeTag::from(tags::USER_TABLE))
    );
    // A non-namespaced field_type is a literal special name.
    let discount = &rule.dimensions[3].1;
    assert_eq!(discount.field_type, FieldTypeSpec::Named("discount".to_string()));

    let revenue = &rule.metrics[1];
    assert_eq!(revenue.overloads.len(), 2);
    assert_eq!(
        revenue.overloads[0].body,
        Form::op("sum", vec![Form::dimension("Income")])
    );

    let (card_name, card) = &rule.cards[0];
    assert_eq!(card_name, "volume-over-time");
    assert_eq!(card.display.as_deref(), Some("line"));
    assert_eq!(card.limit, Some(365));
    assert_eq!(card.order_by.len(), 2);
    assert_eq!(card.order_by[0].direction, SortDirection::Ascending);
    assert_eq!(card.order_by[1].direction, SortDirection::Descending);
}

#[test]
fn test_static_library_round_trips_the_document() {
    let library = StaticRuleLibrary::from_json(TRANSACTIONS_DOC).unwrap();
    let rules = library.load_rules().unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].title, "Transaction overview");
}

#[test]
fn test_syntactically_broken_document_is_an_invalid_rule() {
    let err = parse_rules("[{\"table_type\": ").unwrap_err();
    assert!(matches!(err, RuleError::InvalidRuleDefinition(_)));
}

#[test]
fn test_order_by_must_reference_the_cards_own_names() {
    let doc = r#"[{
        "table_type": "entity/TransactionTable",
        "title": "Broken",
        "metrics": [{"name": "Count", "overloads": [{"definition": ["count"]}]}],
        "cards": [{"name": "c", "metrics": ["Count"],
                   "order_by": [{"target": "Elsewhere"}]}]
    }]"#;
    let err = parse_rules(doc).unwrap_err();
    let RuleError::InvalidRuleDefinition(message) = err;
    assert!(message.contains("Elsewhere"), "unexpected message: {message}");
}
