mod common;

use kdiff_core::merge_patch;
use kdiff_core::model::{Document, ResourceKey};
use kdiff_core::yaml;
use serde_json::json;

#[test]
fn yaml_round_trip_preserves_every_value_variant() {
    let value = json!({
        "null": null,
        "bool": true,
        "int": -7,
        "float": 1.5,
        "string": "text: with colon",
        "seq": [1, "two", [3], {"four": 4}],
        "map": {"nested": {"empty": {}}}
    });

    let text = yaml::encode(&value).unwrap();
    assert_eq!(yaml::decode(&text).unwrap(), value);
}

#[test]
fn decode_stream_reads_every_document_and_skips_empty_ones() {
    let text = "kind: Service\nmetadata:\n  name: a\n---\nkind: Deployment\nmetadata:\n  name: b\n---\n";

    let docs = yaml::decode_stream(text).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["kind"], json!("Deployment"));
}

#[test]
fn decode_stringifies_scalar_keys_and_unwraps_tags() {
    let value = yaml::decode("ports:\n  80: http\n  true: yes\nsecret: !vault abc\n").unwrap();

    assert_eq!(value["ports"]["80"], json!("http"));
    assert_eq!(value["ports"]["true"], json!("yes"));
    assert_eq!(value["secret"], json!("abc"));
}

#[test]
fn decode_rejects_composite_keys() {
    let err = yaml::decode("? [a, b]\n: value\n").unwrap_err();
    assert!(err.to_string().contains("unsupported mapping key"));
}

#[test]
fn encode_stream_separates_documents() {
    let a = json!({"kind": "A"});
    let b = json!({"kind": "B"});

    let text = yaml::encode_stream([&a, &b]).unwrap();
    assert_eq!(text, "kind: A\n---\nkind: B\n");
    assert_eq!(yaml::decode_stream(&text).unwrap(), vec![a, b]);
}

#[test]
fn resource_key_derives_from_current_content() {
    let mut doc = Document::new("in/querier.yaml", common::deployment("querier", json!({})));
    assert_eq!(
        doc.resource_key().to_string(),
        "in/querier.yaml: Deployment/default/querier"
    );

    doc.object["metadata"]["name"] = json!("reader");
    assert_eq!(doc.resource_key().name.as_deref(), Some("reader"));

    let bare = Document::new("in/list.yaml", json!([1, 2]));
    assert_eq!(bare.resource_key().to_string(), "in/list.yaml");
}

#[test]
fn resource_keys_order_by_source_first() {
    let a = ResourceKey::for_object("a.yaml", &json!({"kind": "Z"}));
    let b = ResourceKey::for_object("b.yaml", &json!({"kind": "A"}));
    assert!(a < b);
}

#[test]
fn diff_is_empty_only_for_unchanged_documents() {
    let old = Document::new("x.yaml", common::deployment("querier", json!({"a": "1"})));
    let mut new = old.clone();
    assert!(merge_patch::is_empty(&old.diff(&new)));

    new.object["metadata"]["labels"]["a"] = json!("2");
    new.object["spec"].as_object_mut().unwrap().remove("replicas");
    assert_eq!(
        old.diff(&new),
        json!({"metadata": {"labels": {"a": "2"}}, "spec": {"replicas": null}})
    );
}

#[test]
fn remove_nulls_is_recursive() {
    let mut doc = Document::new(
        "x.yaml",
        json!({"a": null, "b": {"c": null, "d": [{"e": null, "f": 1}]}}),
    );
    doc.remove_nulls();
    assert_eq!(doc.object, json!({"b": {"d": [{"f": 1}]}}));
}
