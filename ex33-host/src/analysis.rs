//! Simulated PageSpeed analysis and code review through the Gemini REST API.
//!
//! The model is asked for JSON matching a response schema; the reply is
//! validated before it reaches the UI. Every failure (transport, timeout,
//! malformed JSON, out-of-range score) is an error for the caller to log.

use async_trait::async_trait;
use ex33_core::{Ex33Error, Ex33Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::config::AnalysisConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    #[serde(default)]
    pub fcp: String,
    #[serde(default)]
    pub lcp: String,
    #[serde(default)]
    pub cls: String,
    #[serde(default)]
    pub tbt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub score: f64,
    pub metrics: Metrics,
    pub suggestions: Vec<String>,
}

impl PerformanceReport {
    /// Parses the model's JSON text and checks the score range.
    pub fn from_model_text(text: &str) -> Ex33Result<Self> {
        let report: PerformanceReport = serde_json::from_str(text.trim())
            .map_err(|e| Ex33Error::MalformedAnalysis(e.to_string()))?;
        if !(0.0..=100.0).contains(&report.score) {
            return Err(Ex33Error::ScoreOutOfRange {
                score: report.score,
            });
        }
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeIssue {
    /// "info", "warning" or "error" as reported by the model.
    pub severity: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CodeIssue {
    pub fn list_from_model_text(text: &str) -> Ex33Result<Vec<CodeIssue>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(trimmed).map_err(|e| Ex33Error::MalformedAnalysis(e.to_string()))
    }
}

/// The external model behind the "Performance" tab.
#[async_trait]
pub trait PerformanceAnalyzer: Send + Sync {
    async fn analyze_performance(&self, code: &str) -> Ex33Result<PerformanceReport>;

    async fn analyze_issues(&self, code: &str) -> Ex33Result<Vec<CodeIssue>>;
}

pub struct GeminiAnalyzer {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Ex33Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Ex33Error::Config("GEMINI_API_KEY is not set".to_string()))?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Ex33Error::AnalysisTransport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    async fn generate_json(&self, prompt: String, schema: Value) -> Ex33Result<String> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Ex33Error::AnalysisTransport(e.to_string()))?
            .error_for_status()
            .map_err(|e| Ex33Error::AnalysisTransport(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| Ex33Error::MalformedAnalysis(e.to_string()))?;
        candidate_text(&payload)
    }
}

/// Pulls `candidates[0].content.parts[0].text` out of a generateContent reply.
pub fn candidate_text(payload: &Value) -> Ex33Result<String> {
    payload
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Ex33Error::MalformedAnalysis("response has no candidate text".to_string()))
}

fn performance_prompt(code: &str) -> String {
    format!(
        "Simulate a Google PageSpeed Insights analysis of this HTML/CSS code.\n\
         Estimate a performance score (0-100) and the metrics FCP, LCP, CLS and TBT.\n\
         Give 3-4 key suggestions for improvement.\n\n\
         Code to analyze:\n{}",
        code
    )
}

fn issues_prompt(code: &str) -> String {
    format!(
        "Analyze this HTML/CSS/JS code for potential issues, bugs, or performance improvements.\n\
         Return the response in a structured JSON format.\n\n\
         Code:\n{}",
        code
    )
}

fn performance_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": { "type": "NUMBER" },
            "metrics": {
                "type": "OBJECT",
                "properties": {
                    "fcp": { "type": "STRING" },
                    "lcp": { "type": "STRING" },
                    "cls": { "type": "STRING" },
                    "tbt": { "type": "STRING" }
                }
            },
            "suggestions": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["score", "metrics", "suggestions"]
    })
}

fn issues_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "severity": { "type": "STRING", "description": "info, warning, or error" },
                "message": { "type": "STRING" },
                "suggestion": { "type": "STRING" }
            },
            "required": ["severity", "message"]
        }
    })
}

#[async_trait]
impl PerformanceAnalyzer for GeminiAnalyzer {
    async fn analyze_performance(&self, code: &str) -> Ex33Result<PerformanceReport> {
        let text = self
            .generate_json(performance_prompt(code), performance_schema())
            .await?;
        PerformanceReport::from_model_text(&text)
    }

    async fn analyze_issues(&self, code: &str) -> Ex33Result<Vec<CodeIssue>> {
        let text = self.generate_json(issues_prompt(code), issues_schema()).await?;
        CodeIssue::list_from_model_text(&text)
    }
}
