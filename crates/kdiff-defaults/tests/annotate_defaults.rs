use kdiff_core::model::Document;
use kdiff_defaults::{
    annotate, annotate_documents, CommandDefaults, DefaultsError, DefaultsSource, FileDefaults,
};
use serde_json::json;

#[test]
fn equal_leaves_are_annotated_and_differing_ones_kept() {
    let defaults = json!({"a": 1, "b": {"c": 2}});
    let actual = json!({"a": 1, "b": {"c": 3}});

    assert_eq!(annotate(&defaults, actual), json!({"a": "1 (default)", "b": {"c": 3}}));
}

#[test]
fn strings_are_annotated_with_quotes() {
    let defaults = json!({"log_level": "info", "enabled": true});
    let actual = json!({"log_level": "info", "enabled": true});

    assert_eq!(
        annotate(&defaults, actual),
        json!({"log_level": "\"info\" (default)", "enabled": "true (default)"})
    );
}

#[test]
fn sequences_are_walked_up_to_the_defaults_length() {
    let defaults = json!({"ports": [80, 443]});
    let actual = json!({"ports": [80, 8443, 9090]});

    assert_eq!(annotate(&defaults, actual), json!({"ports": ["80 (default)", 8443, 9090]}));
}

#[test]
fn missing_defaults_and_shape_mismatches_are_left_alone() {
    let defaults = json!({"server": 1, "limits": {"max": 5}});
    let actual = json!({"server": {"port": 1}, "limits": {"max": 5, "min": 0}, "extra": 5});

    assert_eq!(
        annotate(&defaults, actual),
        json!({"server": {"port": 1}, "limits": {"max": "5 (default)", "min": 0}, "extra": 5})
    );
}

#[test]
fn defaults_are_not_modified() {
    let defaults = json!({"a": {"b": [1]}});
    let before = defaults.clone();
    let _ = annotate(&defaults, json!({"a": {"b": [1]}}));
    assert_eq!(defaults, before);
}

#[test]
fn annotate_documents_drops_nulls_and_keeps_sources() {
    let defaults = Document::new("defaults", json!({"a": 1, "b": null}));
    let docs = vec![Document::new("in/config.yaml", json!({"a": 1, "b": null, "c": null}))];

    let out = annotate_documents(&defaults, docs);
    assert_eq!(out, vec![Document::new("in/config.yaml", json!({"a": "1 (default)"}))]);
}

#[test]
fn file_defaults_decode_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defaults.yaml");
    std::fs::write(&path, "server:\n  http_listen_port: 8080\n").unwrap();

    let doc = FileDefaults::new(&path).load().unwrap();
    assert_eq!(doc.object, json!({"server": {"http_listen_port": 8080}}));
}

#[test]
fn missing_defaults_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileDefaults::new(dir.path().join("nope.yaml")).load().unwrap_err();
    assert!(matches!(err, DefaultsError::Read { .. }));
}

#[cfg(unix)]
#[test]
fn command_defaults_feed_stdin_and_decode_stdout() {
    let source = CommandDefaults::new("sh", vec!["-c".into(), "cat".into()])
        .with_stdin("limits:\n  max_series: 150000\n");

    let doc = source.load().unwrap();
    assert_eq!(doc.object, json!({"limits": {"max_series": 150000}}));
    assert_eq!(doc.source, "sh -c cat");
}

#[cfg(unix)]
#[test]
fn command_defaults_stream_input_larger_than_a_pipe_buffer() {
    let text: String = (0..20_000).map(|i| format!("key_{i:05}: value_{i:05}\n")).collect();
    assert!(text.len() > 128 * 1024);

    let doc = CommandDefaults::new("sh", vec!["-c".into(), "cat".into()])
        .with_stdin(text)
        .load()
        .unwrap();

    let object = doc.object.as_object().unwrap();
    assert_eq!(object.len(), 20_000);
    assert_eq!(object["key_19999"], json!("value_19999"));
}

#[cfg(unix)]
#[test]
fn failing_command_reports_stderr() {
    let source = CommandDefaults::new("sh", vec!["-c".into(), "echo no such image >&2; exit 3".into()]);

    match source.load().unwrap_err() {
        DefaultsError::Failed { stderr, .. } => assert_eq!(stderr, "no such image"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn unknown_program_fails_to_spawn() {
    let err = CommandDefaults::new("kdiff-no-such-runtime", vec![]).load().unwrap_err();
    assert!(matches!(err, DefaultsError::Spawn { .. }));
}
