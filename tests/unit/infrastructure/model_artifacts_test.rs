// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sentinelrs::config::settings::ModelSettings;
use sentinelrs::domain::models::FEATURE_COUNT;
use sentinelrs::domain::scoring::ModelError;
use sentinelrs::infrastructure::model::ModelBundle;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

fn vectorizer_json() -> Value {
    json!({
        "vocabulary": { "ht": 0, "tp": 1, "co": 2, "lo": 3, "in": 4, "ww": 5 },
        "idf": [1.0, 1.2, 1.5, 2.0, 2.2, 1.1],
        "analyzer": "char_wb",
        "ngram_range": [2, 2],
        "lowercase": true,
        "sublinear_tf": true
    })
}

fn logistic_json(n_features: usize) -> Value {
    let mut weights = vec![0.0; n_features];
    weights[0] = 0.02;
    weights[3] = 1.5;
    json!({
        "kind": "logistic",
        "n_features": n_features,
        "weights": weights,
        "intercept": -1.0
    })
}

fn write(dir: &TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).unwrap();
    path.to_string_lossy().into_owned()
}

fn settings(vectorizer_path: String, classifier_path: String) -> ModelSettings {
    ModelSettings {
        vectorizer_path,
        classifier_path,
    }
}

#[test]
fn test_bundle_loads_and_scores_deterministically() {
    let dir = TempDir::new().unwrap();
    let vectorizer = write(&dir, "vectorizer.json", &vectorizer_json());
    let classifier = write(&dir, "classifier.json", &logistic_json(FEATURE_COUNT + 6));

    let bundle = ModelBundle::load(&settings(vectorizer, classifier)).unwrap();
    let scorer = bundle.into_scorer(0.9).unwrap();

    assert_eq!(scorer.width(), FEATURE_COUNT + 6);
    let first = scorer.score("http://user@login.example.co/account").unwrap();
    let second = scorer.score("http://user@login.example.co/account").unwrap();
    assert_eq!(first, second);
    assert!((0.0..=1.0).contains(&first.probability));
    assert_eq!(first.is_malicious, first.probability >= 0.9);
}

#[test]
fn test_width_mismatch_is_fatal() {
    let dir = TempDir::new().unwrap();
    let vectorizer = write(&dir, "vectorizer.json", &vectorizer_json());
    let classifier = write(&dir, "classifier.json", &logistic_json(FEATURE_COUNT + 5));

    let bundle = ModelBundle::load(&settings(vectorizer, classifier)).unwrap();

    assert!(matches!(
        bundle.into_scorer(0.9),
        Err(ModelError::WidthMismatch {
            expected: 15,
            actual: 16
        })
    ));
}

#[test]
fn test_missing_artifact_is_io_error() {
    let dir = TempDir::new().unwrap();
    let classifier = write(&dir, "classifier.json", &logistic_json(FEATURE_COUNT + 6));
    let missing = dir.path().join("absent.json");

    let error = ModelBundle::load(&settings(
        missing.to_string_lossy().into_owned(),
        classifier,
    ))
    .unwrap_err();

    match error {
        ModelError::Io { path, .. } => assert_eq!(path, Path::new(&missing)),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_malformed_artifact_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let vectorizer = write(&dir, "vectorizer.json", &vectorizer_json());
    let classifier = write(&dir, "classifier.json", &json!({ "kind": "svm", "n_features": 16 }));

    assert!(matches!(
        ModelBundle::load(&settings(vectorizer, classifier)),
        Err(ModelError::Parse { .. })
    ));
}

#[test]
fn test_inconsistent_vectorizer_is_invalid() {
    let dir = TempDir::new().unwrap();
    let mut broken = vectorizer_json();
    broken["idf"] = json!([1.0, 1.0]);
    let vectorizer = write(&dir, "vectorizer.json", &broken);
    let classifier = write(&dir, "classifier.json", &logistic_json(FEATURE_COUNT + 6));

    assert!(matches!(
        ModelBundle::load(&settings(vectorizer, classifier)),
        Err(ModelError::InvalidArtifact(_))
    ));
}
