//! Livelock guard.
//!
//! A model that keeps proposing an action it has already seen the result of
//! would loop forever, since the engine never executes tools itself. Once a
//! `(tool, arguments)` pair has been observed `max_identical_actions` times,
//! proposing it again either ends the task with the last observed result or
//! fails the step.

use stepwise_config::{AgentSettings, RepeatedActionPolicy};
use stepwise_core::error::Error;
use stepwise_core::tool::Observation;
use tracing::warn;

use crate::decision::Decision;

#[derive(Debug, Clone)]
pub struct RepetitionGuard {
    max_identical_actions: usize,
    policy: RepeatedActionPolicy,
}

impl RepetitionGuard {
    pub fn new(max_identical_actions: usize, policy: RepeatedActionPolicy) -> Self {
        Self {
            max_identical_actions: max_identical_actions.max(1),
            policy,
        }
    }

    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self::new(settings.max_identical_actions, settings.on_repeated_action)
    }

    pub fn review(&self, decision: Decision, observations: &[Observation]) -> Result<Decision, Error> {
        let Decision::Act { tool, arguments, .. } = &decision else {
            return Ok(decision);
        };

        let seen: Vec<&Observation> = observations
            .iter()
            .filter(|o| o.matches(tool, arguments))
            .collect();
        let count = seen.len();
        let Some(latest) = seen.last() else {
            return Ok(decision);
        };
        if count < self.max_identical_actions {
            return Ok(decision);
        }

        warn!(tool = %tool, count, policy = ?self.policy, "Model repeated an observed action");
        match self.policy {
            RepeatedActionPolicy::Answer => Ok(Decision::FinalAnswer(latest.result_text())),
            RepeatedActionPolicy::Fail => Err(Error::RepeatedAction { tool: tool.clone() }),
        }
    }
}

impl Default for RepetitionGuard {
    fn default() -> Self {
        Self::from_settings(&AgentSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn act(expr: &str) -> Decision {
        Decision::Act {
            tool: "calculator".into(),
            arguments: json!({"expression": expr}),
            thought: None,
        }
    }

    fn observed(expr: &str, result: &str) -> Observation {
        Observation::new("calculator", json!({"expression": expr}), result)
    }

    #[test]
    fn new_action_passes() {
        let guard = RepetitionGuard::default();
        let out = guard.review(act("3+3"), &[observed("2+2", "4")]).unwrap();
        assert_eq!(out, act("3+3"));
    }

    #[test]
    fn answers_are_untouched() {
        let guard = RepetitionGuard::default();
        let answer = Decision::FinalAnswer("4".into());
        assert_eq!(guard.review(answer.clone(), &[observed("2+2", "4")]).unwrap(), answer);
    }

    #[test]
    fn repeat_becomes_answer_with_latest_result() {
        let guard = RepetitionGuard::new(1, RepeatedActionPolicy::Answer);
        let obs = vec![observed("2+2", "four"), observed("2+2", "4")];
        let out = guard.review(act("2+2"), &obs).unwrap();
        assert_eq!(out, Decision::FinalAnswer("4".into()));
    }

    #[test]
    fn repeat_fails_under_fail_policy() {
        let guard = RepetitionGuard::new(1, RepeatedActionPolicy::Fail);
        let err = guard.review(act("2+2"), &[observed("2+2", "4")]).unwrap_err();
        assert!(matches!(err, Error::RepeatedAction { tool } if tool == "calculator"));
    }

    #[test]
    fn threshold_allows_retries_below_limit() {
        let guard = RepetitionGuard::new(2, RepeatedActionPolicy::Fail);
        assert!(guard.review(act("2+2"), &[observed("2+2", "4")]).is_ok());
        assert!(
            guard
                .review(act("2+2"), &[observed("2+2", "4"), observed("2+2", "4")])
                .is_err()
        );
    }

    #[test]
    fn zero_threshold_is_treated_as_one() {
        let guard = RepetitionGuard::new(0, RepeatedActionPolicy::Fail);
        assert!(guard.review(act("2+2"), &[]).is_ok());
        assert!(guard.review(act("2+2"), &[observed("2+2", "4")]).is_err());
    }
}
