/// Ollama-backed plan generator
///
/// Sends one non-streaming `POST {base_url}/api/generate` per request with
/// JSON output requested, and reads the plans from the reply's `response`
/// field. A single attempt is made under the configured timeout; any
/// failure is logged at `warn` and answered with the fallback plans.
///
/// The liveness check is `GET {base_url}/api/version` under its own,
/// shorter timeout.

use async_trait::async_trait;
use azplan_shared::models::plan::PlanDraft;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use super::{
    fallback::fallback_plans, parse_generated_plans, prompt::build_prompt, GenerationError,
    GenerationResult, PlanGenerator,
};
use crate::config::GeneratorConfig;

/// Longest slice of an error body kept for logs
const ERROR_BODY_LIMIT: usize = 512;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    top_p: f64,
    num_predict: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            num_predict: 4000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

fn transport_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(err.to_string())
    }
}

pub struct OllamaGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl OllamaGenerator {
    pub fn new(config: GeneratorConfig) -> GenerationResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| GenerationError::Client(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One generation attempt, surfacing the reason it failed
    pub async fn try_generate(
        &self,
        goal: &str,
        existing: &[PlanDraft],
    ) -> GenerationResult<Vec<PlanDraft>> {
        let prompt = build_prompt(goal, existing);
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: &prompt,
            stream: false,
            format: "json",
            options: GenerateOptions::default(),
        };

        let response = self
            .client
            .post(self.config.generate_url())
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::MalformedBody(e.to_string())
            }
        })?;

        parse_generated_plans(&body.response)
    }
}

#[async_trait]
impl PlanGenerator for OllamaGenerator {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn generate(&self, goal: &str, existing: &[PlanDraft]) -> Vec<PlanDraft> {
        let started = Instant::now();

        match self.try_generate(goal, existing).await {
            Ok(plans) => {
                info!(
                    model = %self.config.model,
                    existing = existing.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Generated plans from model"
                );
                plans
            }
            Err(e) => {
                warn!(
                    model = %self.config.model,
                    error = %e,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Plan generation failed, using fallback plans"
                );
                fallback_plans()
            }
        }
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .get(self.config.version_url())
            .timeout(self.config.health_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "Model server health check failed");
                false
            }
        }
    }
}
