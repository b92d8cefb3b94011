/// Cross-plan statistics
///
/// Computed from plans that are already loaded with their tasks, either
/// for one project or for everything a user owns.
///
/// - Cost extremes consider only plans whose summed task cost is strictly
///   positive.
/// - Duration extremes consider only plans with both dates set, measured
///   in whole days, floored.
/// - When several plans share an extreme, the first one in input order
///   wins.
///
/// # Example
///
/// ```
/// use azplan_planner::PlanStatistics;
///
/// let stats = PlanStatistics::compute(&[]);
/// assert_eq!(stats.total_plans, 0);
/// assert!(stats.highest_cost_plan.is_none());
/// ```

use azplan_shared::models::plan::{PlanLetter, PlanWithTasks};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanStatistics {
    pub total_plans: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub highest_cost_plan: Option<PlanLetter>,
    pub lowest_cost_plan: Option<PlanLetter>,
    pub longest_duration_plan: Option<PlanLetter>,
    pub shortest_duration_plan: Option<PlanLetter>,
}

/// Tracks the first maximum and first minimum of a sequence
struct Extremes<T> {
    max: Option<(PlanLetter, T)>,
    min: Option<(PlanLetter, T)>,
}

impl<T: PartialOrd + Copy> Extremes<T> {
    fn new() -> Self {
        Self { max: None, min: None }
    }

    fn observe(&mut self, letter: PlanLetter, value: T) {
        let replaces = |current: &Option<(PlanLetter, T)>, wanted: Ordering| match current {
            None => true,
            Some((_, best)) => value.partial_cmp(best) == Some(wanted),
        };

        if replaces(&self.max, Ordering::Greater) {
            self.max = Some((letter, value));
        }
        if replaces(&self.min, Ordering::Less) {
            self.min = Some((letter, value));
        }
    }

    fn max_letter(&self) -> Option<PlanLetter> {
        self.max.map(|(letter, _)| letter)
    }

    fn min_letter(&self) -> Option<PlanLetter> {
        self.min.map(|(letter, _)| letter)
    }
}

impl PlanStatistics {
    pub fn compute(plans: &[PlanWithTasks]) -> Self {
        let mut costs = Extremes::<f64>::new();
        let mut durations = Extremes::<i64>::new();
        let mut stats = PlanStatistics {
            total_plans: plans.len(),
            ..Default::default()
        };

        for entry in plans {
            let letter = entry.plan.plan_letter;

            let cost = entry.total_cost();
            if cost > 0.0 {
                costs.observe(letter, cost);
            }

            if let Some(days) = entry.plan.duration_days() {
                durations.observe(letter, days);
            }

            stats.total_tasks += entry.task_count();
            stats.completed_tasks += entry.completed_task_count();
        }

        stats.highest_cost_plan = costs.max_letter();
        stats.lowest_cost_plan = costs.min_letter();
        stats.longest_duration_plan = durations.max_letter();
        stats.shortest_duration_plan = durations.min_letter();
        stats
    }
}
