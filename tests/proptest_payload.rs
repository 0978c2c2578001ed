//! Property-Based Tests — Payload Codec and Projection Invariants
//!
//! Uses `proptest` to check the compressed-payload round trip and the
//! label-set invariant of the projector across random documents.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{Map, Value};

use screeps_exporter::adapters::metrics::ScreepsMetrics;
use screeps_exporter::domain::{StatsDocument, decode_payload, encode_compressed};
use screeps_exporter::usecases::MetricProjector;

/// Arbitrary JSON trees. Numbers are integers so equality is exact.
fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 _:-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::btree_map("[a-zA-Z0-9_]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn arb_names() -> impl Strategy<Value = BTreeMap<String, u32>> {
    prop::collection::btree_map("[WE][0-9]N[0-9]", 0u32..1_000_000, 0..5)
}

fn label_values(metrics: &ScreepsMetrics, name: &str) -> Vec<String> {
    let mut out: Vec<String> = metrics
        .gather()
        .iter()
        .filter(|mf| mf.get_name() == name)
        .flat_map(|mf| mf.get_metric().iter())
        .flat_map(|m| m.get_label().iter().map(|l| l.get_value().to_string()))
        .collect();
    out.sort();
    out
}

proptest! {
    /// Compress → decode returns the original document.
    #[test]
    fn compressed_payload_round_trips(doc in arb_json()) {
        let encoded = encode_compressed(&doc).unwrap();
        prop_assert!(encoded.starts_with("gz:"));
        let decoded = decode_payload(Value::String(encoded)).unwrap();
        prop_assert_eq!(decoded, doc);
    }

    /// Structured data is never altered by decoding.
    #[test]
    fn structured_payload_passes_through(doc in arb_json()) {
        prop_assume!(!doc.is_string());
        prop_assert_eq!(decode_payload(doc.clone()).unwrap(), doc);
    }

    /// After each projection the resource label set equals the
    /// resources present in that document, whatever came before.
    #[test]
    fn resource_labels_track_latest_document(first in arb_names(), second in arb_names()) {
        let projector = MetricProjector::new(Arc::new(ScreepsMetrics::new().unwrap()));

        for resources in [&first, &second] {
            let doc = StatsDocument::from_value(serde_json::json!({ "resources": resources })).unwrap();
            projector.project(&doc);

            let expected: Vec<String> = resources.keys().cloned().collect();
            prop_assert_eq!(label_values(projector.metrics(), "screeps_resource_amount"), expected);
        }
    }
}
