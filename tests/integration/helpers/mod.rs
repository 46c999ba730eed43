// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum_test::TestServer;
use sentinelrs::domain::models::{DecisionPolicy, ReputationResult, FEATURE_COUNT};
use sentinelrs::domain::narrative::{NarrativeError, NarrativePrompt, NarrativeProvider};
use sentinelrs::domain::reputation::{ReputationError, ReputationSource};
use sentinelrs::domain::scoring::{ModelError, ProbabilityClassifier};
use sentinelrs::domain::services::{
    LexicalScorer, NarrativeAnalyzer, ReputationGateway, ThreatService, VerdictAggregator,
};
use sentinelrs::infrastructure::model::vectorizer::{Analyzer, VectorizerArtifact};
use sentinelrs::infrastructure::model::TfidfVectorizer;
use sentinelrs::presentation::routes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// 足够长且给出明确结论的叙述
pub const SPECIFIC_NARRATIVE: &str = "The host is a well-established public encyclopedia domain \
    with a valid structure, no credential lures, no raw IP address and no obfuscated path. \
    There are no indicators of phishing or malware.";

const VOCABULARY: &[&str] = &["a", "e", "i", "o", "/"];

pub fn vectorizer() -> Arc<TfidfVectorizer> {
    let artifact = VectorizerArtifact {
        vocabulary: VOCABULARY
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect(),
        idf: vec![1.0; VOCABULARY.len()],
        analyzer: Analyzer::Char,
        ngram_range: (1, 1),
        lowercase: true,
        token_pattern: r"(?u)\b\w\w+\b".to_string(),
        norm: None,
        sublinear_tf: false,
    };
    Arc::new(TfidfVectorizer::from_artifact(artifact).unwrap())
}

pub fn combined_width() -> usize {
    FEATURE_COUNT + VOCABULARY.len()
}

/// 返回固定概率的分类器
pub struct FixedClassifier(pub f64);

impl ProbabilityClassifier for FixedClassifier {
    fn n_features(&self) -> usize {
        combined_width()
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Ok(self.0)
    }
}

pub struct FailingClassifier;

impl ProbabilityClassifier for FailingClassifier {
    fn n_features(&self) -> usize {
        combined_width()
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
        Err(ModelError::Prediction("classifier exploded".into()))
    }
}

pub struct PanickingClassifier;

impl ProbabilityClassifier for PanickingClassifier {
    fn n_features(&self) -> usize {
        combined_width()
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
        panic!("corrupted model state")
    }
}

pub fn scorer(classifier: Arc<dyn ProbabilityClassifier>) -> LexicalScorer {
    LexicalScorer::new(vectorizer(), classifier, 0.9).unwrap()
}

pub struct StubSource {
    pub name: &'static str,
    pub outcome: Result<ReputationResult, ReputationError>,
}

#[async_trait]
impl ReputationSource for StubSource {
    async fn check(&self, _url: &str) -> Result<ReputationResult, ReputationError> {
        self.outcome.clone()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

pub struct StubProvider {
    name: String,
    outcome: Result<String, NarrativeError>,
    calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(name: &str, outcome: Result<String, NarrativeError>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NarrativeProvider for StubProvider {
    async fn generate(&self, _prompt: &NarrativePrompt) -> Result<String, NarrativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }
}

pub struct PanickingProvider;

#[async_trait]
impl NarrativeProvider for PanickingProvider {
    async fn generate(&self, _prompt: &NarrativePrompt) -> Result<String, NarrativeError> {
        panic!("provider bug")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// 测试用服务的各个信号
pub struct Signals {
    pub classifier: Arc<dyn ProbabilityClassifier>,
    pub safe_browsing: Result<ReputationResult, ReputationError>,
    pub virustotal: Result<ReputationResult, ReputationError>,
    pub primary: Arc<dyn NarrativeProvider>,
    pub fallback: Arc<dyn NarrativeProvider>,
}

impl Signals {
    pub fn new(probability: f64) -> Self {
        Self {
            classifier: Arc::new(FixedClassifier(probability)),
            safe_browsing: Ok(ReputationResult::Clean),
            virustotal: Ok(ReputationResult::Clean),
            primary: StubProvider::new("primary-stub", Ok(SPECIFIC_NARRATIVE.to_string())),
            fallback: StubProvider::new("fallback-stub", Ok(SPECIFIC_NARRATIVE.to_string())),
        }
    }

    pub fn reputation(
        mut self,
        safe_browsing: Result<ReputationResult, ReputationError>,
        virustotal: Result<ReputationResult, ReputationError>,
    ) -> Self {
        self.safe_browsing = safe_browsing;
        self.virustotal = virustotal;
        self
    }

    pub fn narrative(mut self, primary: Arc<dyn NarrativeProvider>) -> Self {
        self.primary = primary;
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn ProbabilityClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn build(self) -> ThreatService {
        let gateway = ReputationGateway::new(
            Arc::new(StubSource {
                name: "google_safe_browsing",
                outcome: self.safe_browsing,
            }),
            Duration::from_secs(1),
            Arc::new(StubSource {
                name: "virustotal",
                outcome: self.virustotal,
            }),
            Duration::from_secs(1),
        );
        let narrative = NarrativeAnalyzer::new(self.primary, Duration::from_secs(1))
            .with_fallback(self.fallback, Duration::from_secs(1));

        ThreatService::new(
            Arc::new(scorer(self.classifier)),
            gateway,
            narrative,
            VerdictAggregator::new(DecisionPolicy::default()),
        )
    }

    pub fn server(self) -> TestServer {
        TestServer::new(routes::routes(Arc::new(self.build()))).unwrap()
    }
}
