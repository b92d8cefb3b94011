/// Mock plan generator for tests
///
/// Returns canned proposals without any network access and records each
/// goal it was asked about. Canned proposals go through the same validation
/// as model output, so an invalid set yields the fallback plans just like a
/// misbehaving model would.
///
/// # Example
///
/// ```
/// use azplan_planner::generation::{fallback::fallback_plans, mock::MockGenerator, PlanGenerator};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let generator = MockGenerator::new();
/// assert_eq!(generator.generate("goal", &[]).await, fallback_plans());
/// assert_eq!(generator.goals(), vec!["goal".to_string()]);
/// # }
/// ```

use async_trait::async_trait;
use azplan_shared::models::plan::PlanDraft;
use std::sync::Mutex;

use super::{fallback::fallback_plans, validate_proposals, PlanGenerator};

#[derive(Debug, Default)]
pub struct MockGenerator {
    plans: Option<Vec<PlanDraft>>,
    unhealthy: bool,
    goals: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// A healthy generator that always answers with the fallback plans
    pub fn new() -> Self {
        Self::default()
    }

    /// A healthy generator answering with `plans`
    pub fn with_plans(plans: Vec<PlanDraft>) -> Self {
        Self {
            plans: Some(plans),
            ..Self::default()
        }
    }

    /// Reports the backing service as down
    pub fn unhealthy(mut self) -> Self {
        self.unhealthy = true;
        self
    }

    /// Goals passed to `generate`, oldest first
    pub fn goals(&self) -> Vec<String> {
        self.goals
            .lock()
            .map(|goals| goals.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PlanGenerator for MockGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, goal: &str, _existing: &[PlanDraft]) -> Vec<PlanDraft> {
        if let Ok(mut goals) = self.goals.lock() {
            goals.push(goal.to_string());
        }

        match &self.plans {
            Some(plans) => validate_proposals(plans.clone()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Mock plans rejected, using fallback plans");
                fallback_plans()
            }),
            None => fallback_plans(),
        }
    }

    async fn health_check(&self) -> bool {
        !self.unhealthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azplan_shared::models::plan::PlanLetter;

    fn custom_plans() -> Vec<PlanDraft> {
        let mut plans: Vec<PlanDraft> = PlanLetter::intermediate()
            .map(|plan_letter| PlanDraft {
                plan_letter,
                title: format!("Custom {}", plan_letter),
                description: None,
                start_date: None,
                end_date: None,
            })
            .collect();
        plans.reverse();
        plans
    }

    #[tokio::test]
    async fn test_mock_returns_sorted_custom_plans() {
        let generator = MockGenerator::with_plans(custom_plans());
        let plans = generator.generate("goal", &[]).await;

        assert_eq!(plans.len(), 24);
        assert_eq!(plans[0].title, "Custom B");
        assert!(generator.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_falls_back_on_invalid_plans() {
        let mut plans = custom_plans();
        plans.pop();

        let generator = MockGenerator::with_plans(plans);
        assert_eq!(generator.generate("goal", &[]).await, fallback_plans());
    }

    #[tokio::test]
    async fn test_mock_records_goals_and_health() {
        let generator = MockGenerator::new().unhealthy();
        generator.generate("first", &[]).await;
        generator.generate("second", &[]).await;

        assert_eq!(generator.goals(), vec!["first", "second"]);
        assert!(!generator.health_check().await);
        assert_eq!(generator.name(), "mock");
    }
}
