//! Qualitative match analysis — wraps the completion side of the LLM client
//! and guarantees a complete structured result regardless of provider health.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::llm_client::LlmClient;
use crate::matching::prompts::{
    ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM, JOB_PARSE_PROMPT_TEMPLATE, JOB_PARSE_SYSTEM,
    REQUIREMENTS_PROMPT_TEMPLATE, REQUIREMENTS_SYSTEM,
};

pub const RECOMMEND_PROCEED: &str = "Proceed to interview";
pub const RECOMMEND_CONSIDER: &str = "Consider";
pub const RECOMMEND_REJECT: &str = "Reject";

/// Sentinel returned when requirement extraction degrades.
pub const REQUIREMENTS_FALLBACK: &str = "Requirements extraction failed";

/// Structured narrative assessment of one CV against one job description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAssessment {
    pub match_summary: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub reasoning: String,
    pub recommendation: String,
}

/// Structured form of a job posting parsed from an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedJob {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub key_requirements: Vec<String>,
}

/// Low temperature biases toward consistent assessments across runs.
const ANALYZE_TEMPERATURE: f32 = 0.3;
const ANALYZE_MAX_TOKENS: u32 = 500;
const REQUIREMENTS_TEMPERATURE: f32 = 0.2;
const REQUIREMENTS_MAX_TOKENS: u32 = 200;

/// The analyzer's hard guarantee: every public operation returns a complete
/// value. Provider failures are absorbed here, substituting a deterministic
/// templated result — a provider outage degrades quality, never availability.
#[derive(Clone)]
pub struct MatchAnalyzer {
    llm: LlmClient,
}

impl MatchAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Produces a structured assessment of `cv_text` against `job_text`.
    /// Never fails: any call or parse error yields the templated fallback.
    pub async fn analyze(&self, cv_text: &str, job_text: &str, score: f64) -> MatchAssessment {
        let prompt = ANALYZE_PROMPT_TEMPLATE
            .replace("{job_text}", job_text)
            .replace("{cv_text}", cv_text)
            .replace("{score}", &format!("{score:.2}"));

        match self
            .llm
            .complete_json::<MatchAssessment>(
                ANALYZE_SYSTEM,
                &prompt,
                ANALYZE_TEMPERATURE,
                ANALYZE_MAX_TOKENS,
            )
            .await
        {
            Ok(assessment) => assessment,
            Err(e) => {
                warn!("match analysis degraded to templated fallback: {e}");
                fallback_assessment(score, &e.to_string())
            }
        }
    }

    /// Extracts key requirement strings from a job description.
    /// Never fails: degrades to a single sentinel entry.
    pub async fn extract_requirements(&self, job_text: &str) -> Vec<String> {
        let prompt = REQUIREMENTS_PROMPT_TEMPLATE.replace("{job_text}", job_text);

        match self
            .llm
            .complete_json::<Vec<String>>(
                REQUIREMENTS_SYSTEM,
                &prompt,
                REQUIREMENTS_TEMPERATURE,
                REQUIREMENTS_MAX_TOKENS,
            )
            .await
        {
            Ok(requirements) => requirements,
            Err(e) => {
                warn!("requirement extraction degraded to sentinel: {e}");
                vec![REQUIREMENTS_FALLBACK.to_string()]
            }
        }
    }

    /// Structures an uploaded job posting into title/summary/requirements.
    /// Never fails: degrades to an untitled placeholder.
    pub async fn parse_job(&self, job_text: &str) -> ParsedJob {
        let prompt = JOB_PARSE_PROMPT_TEMPLATE.replace("{job_text}", job_text);

        match self
            .llm
            .complete_json::<ParsedJob>(
                JOB_PARSE_SYSTEM,
                &prompt,
                REQUIREMENTS_TEMPERATURE,
                ANALYZE_MAX_TOKENS,
            )
            .await
        {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("job parsing degraded to placeholder: {e}");
                ParsedJob {
                    title: "Untitled Position".to_string(),
                    summary: String::new(),
                    key_requirements: vec![REQUIREMENTS_FALLBACK.to_string()],
                }
            }
        }
    }
}

/// Deterministic assessment used when the completion provider is unavailable
/// or returns unparseable output. Recommendation is rule-derived from the
/// similarity score alone.
pub fn fallback_assessment(score: f64, cause: &str) -> MatchAssessment {
    let recommendation = if score > 0.5 {
        RECOMMEND_CONSIDER
    } else {
        RECOMMEND_REJECT
    };

    MatchAssessment {
        match_summary: format!("Analysis based on similarity score of {score:.2}"),
        strengths: vec!["Content analysis unavailable".to_string()],
        gaps: vec!["Content analysis unavailable".to_string()],
        reasoning: format!(
            "Assessment based on similarity score. AI analysis failed: {cause}"
        ),
        recommendation: recommendation.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_is_complete() {
        let a = fallback_assessment(0.73, "timeout");
        assert!(!a.match_summary.is_empty());
        assert!(!a.strengths.is_empty());
        assert!(!a.gaps.is_empty());
        assert!(!a.reasoning.is_empty());
        assert!(!a.recommendation.is_empty());
    }

    #[test]
    fn test_fallback_recommendation_above_half_is_consider() {
        assert_eq!(
            fallback_assessment(0.51, "err").recommendation,
            RECOMMEND_CONSIDER
        );
        assert_eq!(
            fallback_assessment(0.97, "err").recommendation,
            RECOMMEND_CONSIDER
        );
    }

    #[test]
    fn test_fallback_recommendation_half_or_below_is_reject() {
        // the rule is strictly-greater-than 0.5
        assert_eq!(
            fallback_assessment(0.5, "err").recommendation,
            RECOMMEND_REJECT
        );
        assert_eq!(
            fallback_assessment(0.12, "err").recommendation,
            RECOMMEND_REJECT
        );
    }

    #[test]
    fn test_fallback_mentions_score_and_cause() {
        let a = fallback_assessment(0.42, "connection refused");
        assert!(a.match_summary.contains("0.42"));
        assert!(a.reasoning.contains("connection refused"));
    }

    #[test]
    fn test_analyze_prompt_renders_all_placeholders() {
        let prompt = ANALYZE_PROMPT_TEMPLATE
            .replace("{job_text}", "JOB")
            .replace("{cv_text}", "CV")
            .replace("{score}", "0.80");
        assert!(prompt.contains("JOB"));
        assert!(prompt.contains("CV"));
        assert!(prompt.contains("0.80"));
        assert!(!prompt.contains("{job_text}"));
        assert!(!prompt.contains("{cv_text}"));
        assert!(!prompt.contains("{score}"));
    }

    #[test]
    fn test_match_assessment_deserializes() {
        let json = r#"{
            "match_summary": "Strong backend profile",
            "strengths": ["Rust", "Postgres"],
            "gaps": ["No Kubernetes"],
            "reasoning": "Covers most core requirements.",
            "recommendation": "Proceed to interview"
        }"#;
        let a: MatchAssessment = serde_json::from_str(json).unwrap();
        assert_eq!(a.recommendation, RECOMMEND_PROCEED);
        assert_eq!(a.strengths.len(), 2);
    }

    #[test]
    fn test_parsed_job_summary_defaults_empty() {
        let json = r#"{"title": "Engineer", "key_requirements": ["Rust"]}"#;
        let p: ParsedJob = serde_json::from_str(json).unwrap();
        assert_eq!(p.title, "Engineer");
        assert!(p.summary.is_empty());
    }
}
