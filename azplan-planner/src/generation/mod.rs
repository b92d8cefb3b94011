/// Plan generation
///
/// A [`PlanGenerator`] turns the goal written in Plan Z into exactly 24
/// proposals, one for each letter B through Y. Generation never fails from
/// the caller's point of view: whenever the model server is unreachable,
/// slow, or answers with something other than 24 well-formed plans, the
/// generator logs why and returns [`fallback::fallback_plans`] instead.
///
/// # Implementations
///
/// - [`ollama::OllamaGenerator`]: talks to an Ollama-compatible server
/// - [`mock::MockGenerator`]: canned output for tests
///
/// # Example
///
/// ```no_run
/// use azplan_planner::{GeneratorConfig, OllamaGenerator, PlanGenerator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let generator = OllamaGenerator::new(GeneratorConfig::default())?;
/// let plans = generator.generate("Open a bakery in Lisbon", &[]).await;
/// assert_eq!(plans.len(), 24);
/// # Ok(())
/// # }
/// ```

pub mod fallback;
pub mod mock;
pub mod ollama;
pub mod prompt;

use async_trait::async_trait;
use azplan_shared::models::plan::{is_valid_title, PlanDraft, PlanLetter, MAX_TITLE_LENGTH};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::HashSet;

/// Number of intermediate plans, B through Y
pub const PLAN_COUNT: usize = 24;

/// Why a generation attempt did not produce usable plans
///
/// These never reach API clients; they are logged before falling back.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("Request to model server failed: {0}")]
    Transport(String),

    #[error("Model server did not answer in time")]
    Timeout,

    #[error("Model server returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("Malformed plan entry: {0}")]
    MalformedPlan(String),

    #[error("Expected 24 plans, got {0}")]
    WrongCount(usize),

    #[error("Plan letters must be B through Y once each: {0}")]
    InvalidLetters(String),
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    /// Short name used in logs and the health report
    fn name(&self) -> &str;

    /// Produces exactly 24 proposals for letters B-Y, in order
    ///
    /// `existing` is prompt context only; it is not modified or returned.
    async fn generate(&self, goal: &str, existing: &[PlanDraft]) -> Vec<PlanDraft>;

    /// Whether the backing service answers; never errors
    async fn health_check(&self) -> bool;
}

/// One entry of the model's JSON array
#[derive(Debug, Deserialize)]
struct RawProposal {
    plan_letter: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

impl RawProposal {
    fn into_draft(self) -> GenerationResult<PlanDraft> {
        let plan_letter = self
            .plan_letter
            .parse::<PlanLetter>()
            .map_err(|e| GenerationError::InvalidLetters(e.to_string()))?;

        Ok(PlanDraft {
            plan_letter,
            title: self.title,
            description: self.description,
            start_date: self.start_date.as_deref().map(parse_timestamp).transpose()?,
            end_date: self.end_date.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

/// Accepts RFC 3339, naive date-times (taken as UTC) and plain dates
fn parse_timestamp(value: &str) -> GenerationResult<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| GenerationError::MalformedPlan(format!("unreadable date {:?}", value)))
}

/// Parses the model's text output into validated, ordered proposals
///
/// The text must be a JSON array. Entries that are not objects are skipped;
/// objects must carry at least a letter and a title.
pub fn parse_generated_plans(text: &str) -> GenerationResult<Vec<PlanDraft>> {
    let value: JsonValue = serde_json::from_str(text)
        .map_err(|e| GenerationError::MalformedBody(format!("response text is not JSON: {}", e)))?;

    let JsonValue::Array(entries) = value else {
        return Err(GenerationError::MalformedBody(
            "response text is not a JSON array".to_string(),
        ));
    };

    let drafts = entries
        .into_iter()
        .filter(JsonValue::is_object)
        .map(|entry| {
            serde_json::from_value::<RawProposal>(entry)
                .map_err(|e| GenerationError::MalformedPlan(e.to_string()))
                .and_then(RawProposal::into_draft)
        })
        .collect::<GenerationResult<Vec<_>>>()?;

    validate_proposals(drafts)
}

/// Checks there are 24 storable proposals covering B-Y once each, then
/// sorts them
pub fn validate_proposals(mut drafts: Vec<PlanDraft>) -> GenerationResult<Vec<PlanDraft>> {
    if drafts.len() != PLAN_COUNT {
        return Err(GenerationError::WrongCount(drafts.len()));
    }

    let mut seen = HashSet::with_capacity(PLAN_COUNT);
    for draft in &drafts {
        if !is_valid_title(&draft.title) {
            return Err(GenerationError::MalformedPlan(format!(
                "plan {} needs a title of 1-{} characters",
                draft.plan_letter, MAX_TITLE_LENGTH
            )));
        }
        if !draft.plan_letter.is_intermediate() {
            return Err(GenerationError::InvalidLetters(format!(
                "letter {} is outside B-Y",
                draft.plan_letter
            )));
        }
        if !seen.insert(draft.plan_letter) {
            return Err(GenerationError::InvalidLetters(format!(
                "letter {} appears twice",
                draft.plan_letter
            )));
        }
    }

    drafts.sort_by_key(|draft| draft.plan_letter);
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(letter: char) -> JsonValue {
        json!({
            "plan_letter": letter.to_string(),
            "title": format!("Step {}", letter),
            "description": "Do the thing",
            "start_date": "2024-01-01T00:00:00",
            "end_date": "2024-01-31T23:59:59"
        })
    }

    fn full_array() -> Vec<JsonValue> {
        ('B'..='Y').map(entry).collect()
    }

    #[test]
    fn test_parse_full_sequence() {
        let text = JsonValue::Array(full_array()).to_string();
        let plans = parse_generated_plans(&text).unwrap();

        assert_eq!(plans.len(), PLAN_COUNT);
        assert_eq!(plans[0].plan_letter.as_char(), 'B');
        assert_eq!(plans[23].plan_letter.as_char(), 'Y');
        assert_eq!(plans[0].title, "Step B");
        assert_eq!(
            plans[0].start_date.unwrap().to_rfc3339(),
            "2024-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_sorts_by_letter() {
        let mut entries = full_array();
        entries.reverse();
        let plans = parse_generated_plans(&JsonValue::Array(entries).to_string()).unwrap();

        let letters: String = plans.iter().map(|p| p.plan_letter.as_char()).collect();
        assert_eq!(letters, "BCDEFGHIJKLMNOPQRSTUVWXY");
    }

    #[test]
    fn test_non_object_entries_are_skipped() {
        let mut entries = full_array();
        entries.insert(3, json!("stray string"));
        entries.push(json!(42));

        assert_eq!(
            parse_generated_plans(&JsonValue::Array(entries).to_string())
                .unwrap()
                .len(),
            PLAN_COUNT
        );
    }

    #[test]
    fn test_wrong_count() {
        let mut entries = full_array();
        entries.pop();

        assert!(matches!(
            parse_generated_plans(&JsonValue::Array(entries).to_string()),
            Err(GenerationError::WrongCount(23))
        ));
    }

    #[test]
    fn test_duplicate_letter() {
        let mut entries = full_array();
        entries[1] = entry('B');

        assert!(matches!(
            parse_generated_plans(&JsonValue::Array(entries).to_string()),
            Err(GenerationError::InvalidLetters(_))
        ));
    }

    #[test]
    fn test_letter_outside_range() {
        let mut entries = full_array();
        entries[0] = entry('A');
        assert!(parse_generated_plans(&JsonValue::Array(entries).to_string()).is_err());

        let mut entries = full_array();
        entries[0]["plan_letter"] = json!("b");
        assert!(parse_generated_plans(&JsonValue::Array(entries).to_string()).is_err());
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            parse_generated_plans(r#"{"plans": []}"#),
            Err(GenerationError::MalformedBody(_))
        ));
        assert!(matches!(
            parse_generated_plans("Sure! Here are your plans:"),
            Err(GenerationError::MalformedBody(_))
        ));
    }

    #[test]
    fn test_entry_missing_title() {
        let mut entries = full_array();
        entries[5] = json!({ "plan_letter": "G" });

        assert!(matches!(
            parse_generated_plans(&JsonValue::Array(entries).to_string()),
            Err(GenerationError::MalformedPlan(_))
        ));
    }

    #[test]
    fn test_unstorable_titles() {
        let mut entries = full_array();
        entries[1]["title"] = json!("x".repeat(500));
        assert!(matches!(
            parse_generated_plans(&JsonValue::Array(entries).to_string()),
            Err(GenerationError::MalformedPlan(_))
        ));

        let mut entries = full_array();
        entries[2]["title"] = json!("  ");
        assert!(matches!(
            parse_generated_plans(&JsonValue::Array(entries).to_string()),
            Err(GenerationError::MalformedPlan(_))
        ));

        let mut entries = full_array();
        entries[2]["title"] = json!("x".repeat(MAX_TITLE_LENGTH));
        assert!(parse_generated_plans(&JsonValue::Array(entries).to_string()).is_ok());
    }

    #[test]
    fn test_timestamp_formats() {
        assert!(parse_timestamp("2024-03-01T10:00:00Z").is_ok());
        assert!(parse_timestamp("2024-03-01T10:00:00+02:00").is_ok());
        assert!(parse_timestamp("2024-03-01T10:00:00.250").is_ok());
        assert_eq!(
            parse_timestamp("2024-03-01").unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
        assert!(parse_timestamp("next spring").is_err());
    }

    #[test]
    fn test_missing_dates_are_allowed() {
        let entries: Vec<JsonValue> = ('B'..='Y')
            .map(|l| json!({ "plan_letter": l.to_string(), "title": "t" }))
            .collect();
        let plans = parse_generated_plans(&JsonValue::Array(entries).to_string()).unwrap();

        assert!(plans.iter().all(|p| p.start_date.is_none() && p.description.is_none()));
    }
}
