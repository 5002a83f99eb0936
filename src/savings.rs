//! Savings goal progress.

use crate::money::round2;
use crate::month::{month_range, MonthKey};
use crate::schema::{GoalStatus, SavingsGoal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalProgress {
    pub goal_id: String,
    pub month: MonthKey,
    /// Current amount plus contributions from `start_month` through this
    /// month while the goal is active.
    pub projected_amount: f64,
    pub remaining_amount: f64,
    /// Whole months still needed at the current contribution rate. `None`
    /// when the contribution is zero and the target is not yet reached.
    pub months_remaining: Option<u32>,
    pub projected_completion_month: Option<MonthKey>,
    /// Whether the projected completion beats `target_month`, when one is
    /// set.
    pub on_track: Option<bool>,
}

/// Projects a goal's position as of the given month. Paused goals hold
/// their current amount; completed goals are already done.
pub fn goal_progress(goal: &SavingsGoal, month: MonthKey) -> GoalProgress {
    let contribution = round2(goal.monthly_contribution);
    let target = round2(goal.target_amount);

    let contributions_made = match goal.status {
        GoalStatus::Active if month >= goal.start_month => {
            month_range(goal.start_month, month).len() as f64
        }
        _ => 0.0,
    };

    let projected_amount = match goal.status {
        GoalStatus::Completed => target.max(round2(goal.current_amount)),
        _ => round2(round2(goal.current_amount) + round2(contribution * contributions_made))
            .min(target.max(round2(goal.current_amount))),
    };

    let remaining_amount = round2(target - projected_amount).max(0.0);

    let months_remaining = if remaining_amount <= 0.0 {
        Some(0)
    } else if goal.status == GoalStatus::Active && contribution > 0.0 {
        Some((remaining_amount / contribution).ceil() as u32)
    } else {
        None
    };

    let projected_completion_month = months_remaining.map(|n| {
        let mut completion = month;
        for _ in 0..n {
            completion = completion.next();
        }
        completion
    });

    let on_track = goal
        .target_month
        .and_then(|target| projected_completion_month.map(|done| done <= target));

    GoalProgress {
        goal_id: goal.id.clone(),
        month,
        projected_amount,
        remaining_amount,
        months_remaining,
        projected_completion_month,
        on_track,
    }
}
