// All LLM prompt constants for the matching module.

/// System prompt for CV-vs-job analysis — enforces JSON-only output.
pub const ANALYZE_SYSTEM: &str =
    "You are an HR expert analyzing CVs against job descriptions. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Analysis prompt template. Replace `{job_text}`, `{cv_text}` and `{score}`
/// before sending.
pub const ANALYZE_PROMPT_TEMPLATE: &str = r#"Analyze this CV against the job description and provide a structured assessment.

Job Description:
{job_text}

CV Content:
{cv_text}

Similarity Score: {score}

Please provide:
1. A brief match summary (1-2 sentences)
2. List of strengths (3-5 key points)
3. List of gaps/weaknesses (2-4 points)
4. Detailed reasoning for the assessment (2-3 sentences)
5. Recommendation: "Proceed to interview", "Consider", or "Reject"

Return a JSON object with this EXACT schema (no extra fields):
{
    "match_summary": "...",
    "strengths": ["...", "..."],
    "gaps": ["...", "..."],
    "reasoning": "...",
    "recommendation": "..."
}"#;

/// System prompt for requirement extraction — enforces JSON-only output.
pub const REQUIREMENTS_SYSTEM: &str =
    "You are an HR expert extracting job requirements. \
    You MUST respond with a valid JSON array of strings only. \
    Do NOT include any text outside the JSON array. \
    Do NOT use markdown code fences.";

/// Requirement extraction prompt template. Replace `{job_text}` before sending.
pub const REQUIREMENTS_PROMPT_TEMPLATE: &str = r#"Extract key technical requirements and skills from this job description.
Return only the essential requirements as a list.

Job Description:
{job_text}

Return as JSON array:
["requirement1", "requirement2", "requirement3"]"#;

/// System prompt for whole-document job parsing (file upload path).
pub const JOB_PARSE_SYSTEM: &str =
    "You are an HR expert structuring job postings. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job parsing prompt template. Replace `{job_text}` before sending.
pub const JOB_PARSE_PROMPT_TEMPLATE: &str = r#"Structure the following job posting.

Return a JSON object with this EXACT schema (no extra fields):
{
    "title": "the job title",
    "summary": "a 1-2 sentence summary of the role",
    "key_requirements": ["requirement1", "requirement2"]
}

Job Posting:
{job_text}"#;
