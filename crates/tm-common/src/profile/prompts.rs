use super::ProfileRequest;

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Builds the job-profile generation prompt. The model must return a JSON
/// object matching `JobProfile`.
pub fn build_profile_prompt(request: &ProfileRequest) -> String {
    format!(
        "Generate a detailed job profile for a {level} level {role} position.\n\
        \n\
        Role Purpose: {purpose}\n\
        \n\
        Return ONLY valid JSON with no preamble, markdown, or explanatory text:\n\
        {{\n\
          \"job_requirements\": \"Detailed technical and soft skill requirements (3-5 sentences)\",\n\
          \"job_description\": \"Comprehensive role overview and responsibilities (3-5 sentences)\",\n\
          \"key_competencies\": [\"competency1\", \"competency2\", \"competency3\", \"competency4\", \"competency5\"]\n\
        }}\n\
        \n\
        Make the content professional, specific, and aligned with the role purpose.",
        level = request.job_level,
        role = request.role_name,
        purpose = request.role_purpose,
    )
}
