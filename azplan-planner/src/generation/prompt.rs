//! Prompt construction for the model server

use azplan_shared::models::plan::PlanDraft;
use chrono::{DateTime, Utc};

fn render_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.to_rfc3339())
        .unwrap_or_else(|| "not set".to_string())
}

/// Renders existing plans as prompt context, or an empty string if none
pub fn render_existing_plans(existing: &[PlanDraft]) -> String {
    if existing.is_empty() {
        return String::new();
    }

    let mut context = String::from("Existing Plans:\n");
    for plan in existing {
        context.push_str(&format!("Plan {}: {}\n", plan.plan_letter, plan.title));
        if let Some(description) = &plan.description {
            context.push_str(&format!("Description: {}\n", description));
        }
        context.push_str(&format!(
            "Start: {}, End: {}\n\n",
            render_date(plan.start_date),
            render_date(plan.end_date)
        ));
    }
    context
}

/// Builds the instruction asking for plans B through Y as a JSON array
pub fn build_prompt(goal: &str, existing: &[PlanDraft]) -> String {
    format!(
        r#"You are an AI assistant helping to generate a comprehensive A-Z planning sequence.

Plan Z (the final goal) content:
{goal}

{context}
Based on Plan Z, generate intermediate plans B through Y that lead logically to achieving Plan Z.

Requirements:
1. Generate plans B through Y (24 plans total)
2. Each plan should be a logical step toward Plan Z
3. Plans should build upon each other sequentially
4. Include realistic timeframes and descriptions
5. Consider costs, resources, and dependencies

Return ONLY a JSON array of plans with this exact structure:
[
  {{
    "plan_letter": "B",
    "title": "Plan Title",
    "description": "Detailed description",
    "start_date": "2024-01-01T00:00:00",
    "end_date": "2024-01-31T23:59:59"
  }},
  ...
]

Generate all 24 plans (B through Y) in a single response.
"#,
        goal = goal,
        context = render_existing_plans(existing),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use azplan_shared::models::plan::PlanLetter;
    use chrono::TimeZone;

    fn plan(letter: char, title: &str, description: Option<&str>) -> PlanDraft {
        PlanDraft {
            plan_letter: PlanLetter::new(letter).unwrap(),
            title: title.to_string(),
            description: description.map(str::to_string),
            start_date: None,
            end_date: None,
        }
    }

    #[test]
    fn test_prompt_contains_goal() {
        let prompt = build_prompt("Run a marathon under 4 hours", &[]);
        assert!(prompt.contains("Plan Z (the final goal) content:\nRun a marathon under 4 hours"));
        assert!(prompt.contains("B through Y"));
        assert!(!prompt.contains("Existing Plans:"));
    }

    #[test]
    fn test_prompt_embeds_existing_plans_verbatim() {
        let existing = vec![
            plan('C', "Find a landlord", Some("Shortlist three shops near the market")),
            plan('F', "Hire a baker", Some("Night shift, sourdough experience")),
        ];
        let prompt = build_prompt("Open a bakery", &existing);

        assert!(prompt.contains("Plan C: Find a landlord\n"));
        assert!(prompt.contains("Description: Shortlist three shops near the market\n"));
        assert!(prompt.contains("Plan F: Hire a baker\n"));
        assert!(prompt.contains("Description: Night shift, sourdough experience\n"));
    }

    #[test]
    fn test_existing_plan_dates() {
        let mut dated = plan('D', "Buy ovens", None);
        dated.start_date = Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());

        let context = render_existing_plans(&[dated]);
        assert!(context.contains("Start: 2024-05-01T00:00:00+00:00, End: not set"));
        assert!(!context.contains("Description:"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let existing = vec![plan('B', "Save money", None)];
        assert_eq!(build_prompt("goal", &existing), build_prompt("goal", &existing));
    }
}
