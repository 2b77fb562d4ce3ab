use async_trait::async_trait;

use super::{JobProfile, ProfileError, ProfileGenerator, ProfileRequest};

/// Deterministic offline generator. Used when no API key is configured and
/// as the last-resort fallback so the dashboard always gets a profile.
pub struct TemplateProfileGenerator;

impl TemplateProfileGenerator {
    pub fn build(request: &ProfileRequest) -> JobProfile {
        JobProfile {
            job_requirements: format!(
                "{role} requires strong technical skills, domain expertise, and proven \
                 ability to deliver results at {level} level. Excellent communication, \
                 analytical thinking, and stakeholder management capabilities are essential.",
                role = request.role_name,
                level = request.job_level,
            ),
            job_description: format!(
                "As a {role}, you will {purpose}. This {level} position requires balancing \
                 technical depth with business acumen, driving data-informed decisions, and \
                 collaborating effectively across teams.",
                role = request.role_name,
                purpose = request.role_purpose.trim_end_matches('.'),
                level = request.job_level,
            ),
            key_competencies: vec![
                "Technical Expertise".into(),
                "Analytical Thinking".into(),
                "Communication Skills".into(),
                "Problem Solving".into(),
                "Stakeholder Management".into(),
            ],
        }
    }
}

#[async_trait]
impl ProfileGenerator for TemplateProfileGenerator {
    fn name(&self) -> &'static str {
        "template"
    }

    async fn generate(&self, request: &ProfileRequest) -> Result<JobProfile, ProfileError> {
        Ok(Self::build(request))
    }
}
