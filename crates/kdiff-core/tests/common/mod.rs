use serde_json::{json, Value};

#[allow(dead_code)]
pub fn deployment(name: &str, labels: Value) -> Value {
    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": "default",
            "labels": labels,
        },
        "spec": {
            "replicas": 3,
            "template": {
                "spec": {
                    "containers": [
                        { "name": "app", "args": ["-target=querier", "-log.level=info"] }
                    ]
                }
            }
        }
    })
}
