use serde::Serialize;

use super::domain::{RequestId, RequestStatus};
use super::run::AllocationDecision;
use super::scoring::ScoreBreakdown;

/// Structured account of why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionExplanation {
    pub score_breakdown: ScoreBreakdown,
    pub narrative: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compared_to: Option<RankComparison>,
}

/// Pointer at the decision ranked immediately below, with the score gap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankComparison {
    pub request_id: RequestId,
    pub request_title: String,
    pub score: f64,
    pub score_difference: f64,
}

/// Attach an explanation to every decision. `breakdowns` is rank-aligned
/// with `decisions`; each decision is compared against the one ranked
/// immediately below it, so the lowest-ranked decision carries no comparison.
pub(super) fn attach_explanations(
    decisions: &mut [AllocationDecision],
    breakdowns: &[ScoreBreakdown],
) {
    let total = decisions.len();

    let comparisons: Vec<Option<RankComparison>> = (0..total)
        .map(|index| {
            decisions.get(index + 1).map(|runner_up| RankComparison {
                request_id: runner_up.request_id.clone(),
                request_title: runner_up.request_title.clone(),
                score: runner_up.score,
                score_difference: decisions[index].score - runner_up.score,
            })
        })
        .collect();

    for (decision, (breakdown, compared_to)) in decisions
        .iter_mut()
        .zip(breakdowns.iter().zip(comparisons))
    {
        decision.explanation = Some(DecisionExplanation {
            score_breakdown: *breakdown,
            narrative: narrative_for(decision, total),
            compared_to,
        });
    }
}

fn narrative_for(decision: &AllocationDecision, total: usize) -> String {
    match decision.status {
        RequestStatus::Approved => {
            format!("Fully funded. Ranked #{} out of {}", decision.rank, total)
        }
        RequestStatus::Partial => "Partially funded due to budget/resource constraints".to_string(),
        RequestStatus::Denied => format!("Not funded. {}", decision.reason),
        RequestStatus::Deferred => format!("Deferred. {}", decision.reason),
        RequestStatus::Pending => String::new(),
    }
}
