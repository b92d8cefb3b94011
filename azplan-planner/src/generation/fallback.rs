//! Placeholder plans used whenever the model cannot deliver
//!
//! The sequence is fixed: no randomness, no clock, no network.

use azplan_shared::models::plan::{PlanDraft, PlanLetter};

/// The 24 placeholder proposals for letters B-Y, in order
pub fn fallback_plans() -> Vec<PlanDraft> {
    PlanLetter::intermediate()
        .enumerate()
        .map(|(i, plan_letter)| {
            let step = i + 1;
            PlanDraft {
                plan_letter,
                title: format!("Step {}: Foundation Planning", step),
                description: Some(format!(
                    "This is step {} in the sequence leading to your final goal. \
                     This is a placeholder plan generated when the LLM service is unavailable.",
                    step
                )),
                start_date: None,
                end_date: None,
            }
        })
        .collect()
}
