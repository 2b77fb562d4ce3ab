pub mod claude;
pub mod prompts;
pub mod template;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use claude::ClaudeProfileGenerator;
pub use template::TemplateProfileGenerator;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },
    #[error("json parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rate limited after {retries} retries")]
    RateLimited { retries: u32 },
    #[error("generator returned empty content")]
    EmptyContent,
}

/// Role context for a job-profile generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRequest {
    pub role_name: String,
    pub job_level: String,
    pub role_purpose: String,
}

/// Generated job-profile text for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_requirements: String,
    pub job_description: String,
    pub key_competencies: Vec<String>,
}

/// Opaque text-generation collaborator for job profiles.
///
/// Implementations:
/// - ClaudeProfileGenerator: Anthropic Messages API call
/// - TemplateProfileGenerator: deterministic offline fallback
///
/// The engine never depends on this; it is presentation-side glue the
/// API layer calls alongside a scoring session.
#[async_trait]
pub trait ProfileGenerator: Send + Sync {
    /// Implementation name ("claude", "template"), for logging.
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &ProfileRequest) -> Result<JobProfile, ProfileError>;
}

/// Picks a generator from the environment: `TM_PROFILE_GENERATOR` selects the
/// implementation, and the Claude generator requires `ANTHROPIC_API_KEY`.
/// Falls back to the template generator when no key is configured.
pub fn create_generator_from_env() -> Box<dyn ProfileGenerator> {
    let name = std::env::var("TM_PROFILE_GENERATOR").unwrap_or_else(|_| "claude".into());
    create_generator(&name, std::env::var("ANTHROPIC_API_KEY").ok())
}

pub fn create_generator(name: &str, api_key: Option<String>) -> Box<dyn ProfileGenerator> {
    match (name, api_key) {
        ("claude", Some(api_key)) => Box::new(ClaudeProfileGenerator::new(api_key)),
        ("claude", None) => {
            tracing::warn!("ANTHROPIC_API_KEY not set; using template profile generator");
            Box::new(TemplateProfileGenerator)
        }
        _ => Box::new(TemplateProfileGenerator),
    }
}
