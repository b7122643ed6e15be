use std::path::Path;

use kdiff_core::model::Document;
use kdiff_rules::RuleSet;
use serde_json::{json, Value};

#[allow(dead_code)]
pub const NAME_LABEL: &str = "/metadata/labels/app.kubernetes.io~1name";

#[allow(dead_code)]
pub fn read_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);

    std::fs::read_to_string(&path).unwrap_or_else(|e| {
        panic!("failed to read fixture {} at {}: {e}", name, path.display())
    })
}

#[allow(dead_code)]
pub fn rule_set_fixture(name: &str) -> RuleSet {
    serde_yaml::from_str(&read_fixture(name)).expect("rule fixture must parse")
}

#[allow(dead_code)]
pub fn rule_set_yaml(text: &str) -> RuleSet {
    serde_yaml::from_str(text).expect("inline rules must parse")
}

#[allow(dead_code)]
pub fn deployment(name: &str, app: &str) -> Document {
    Document::new(
        format!("in/{name}.yaml"),
        json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": name,
                "namespace": "default",
                "labels": {"app.kubernetes.io/name": app}
            },
            "spec": {
                "replicas": 3,
                "template": {"spec": {"containers": [
                    {"name": name, "args": ["-target=querier", "-log.level=info"]}
                ]}}
            }
        }),
    )
}

#[allow(dead_code)]
pub fn label(doc: &Document) -> &Value {
    &doc.object["metadata"]["labels"]["app.kubernetes.io/name"]
}
