//! Turning a model reply into a decision.
//!
//! Native tool calls win over text. In text mode the reply is read in the
//! ReAct layout: a `Final Answer:` ends the task, an `Action:` with an
//! `Action Input:` proposes a tool call, and anything else is taken as the
//! answer itself.

use serde_json::Value;
use stepwise_core::error::{Error, ProviderError};
use stepwise_core::message::Message;
use stepwise_core::planning::PlanningResult;

use crate::prompt::{ACTION_INPUT_MARKER, ACTION_MARKER, FINAL_ANSWER_MARKER};

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    FinalAnswer(String),
    Act {
        tool: String,
        arguments: Value,
        thought: Option<String>,
    },
}

impl Decision {
    pub fn into_result(self) -> PlanningResult {
        match self {
            Decision::FinalAnswer(answer) => PlanningResult::Answer { answer },
            Decision::Act {
                tool,
                arguments,
                thought,
            } => PlanningResult::Action {
                tool,
                arguments,
                thought,
            },
        }
    }
}

/// Classify one assistant message. An empty reply is a provider fault.
pub fn classify(message: &Message) -> Result<Decision, Error> {
    if let Some(call) = message.tool_calls.first() {
        return Ok(Decision::Act {
            tool: call.name.clone(),
            arguments: parse_arguments(&call.arguments),
            thought: non_empty(&message.content),
        });
    }

    let text = message.content.trim();
    if text.is_empty() {
        return Err(Error::Provider(ProviderError::InvalidResponse(
            "model returned neither text nor a tool call".into(),
        )));
    }

    if let Some(at) = text.rfind(FINAL_ANSWER_MARKER) {
        let answer = text[at + FINAL_ANSWER_MARKER.len()..].trim();
        return Ok(Decision::FinalAnswer(answer.to_string()));
    }

    if let Some(decision) = parse_action(text) {
        return Ok(decision);
    }

    Ok(Decision::FinalAnswer(strip_thought(text).to_string()))
}

fn parse_action(text: &str) -> Option<Decision> {
    let action_at = text.find(ACTION_MARKER)?;
    let after_action = &text[action_at + ACTION_MARKER.len()..];
    let input_at = after_action.find(ACTION_INPUT_MARKER)?;

    let tool = after_action[..input_at].trim();
    if tool.is_empty() {
        return None;
    }

    let input = &after_action[input_at + ACTION_INPUT_MARKER.len()..];
    let input = input.split("\nObservation:").next().unwrap_or(input).trim();

    Some(Decision::Act {
        tool: tool.to_string(),
        arguments: parse_arguments(input),
        thought: non_empty(strip_thought(&text[..action_at])),
    })
}

/// JSON when it parses, the raw string otherwise. An empty input is `{}`.
fn parse_arguments(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Object(serde_json::Map::new());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn strip_thought(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix("Thought:").unwrap_or(text).trim()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::make_tool_call;
    use serde_json::json;

    #[test]
    fn native_tool_call_wins() {
        let mut msg = Message::assistant("I should compute this");
        msg.tool_calls = vec![
            make_tool_call("calculator", json!({"expression": "2+2"})),
            make_tool_call("web_search", json!({"query": "2+2"})),
        ];
        let decision = classify(&msg).unwrap();
        assert_eq!(
            decision,
            Decision::Act {
                tool: "calculator".into(),
                arguments: json!({"expression": "2+2"}),
                thought: Some("I should compute this".into()),
            }
        );
    }

    #[test]
    fn final_answer_marker() {
        let msg = Message::assistant("Thought: I now know the final answer\nFinal Answer: 4");
        assert_eq!(classify(&msg).unwrap(), Decision::FinalAnswer("4".into()));
    }

    #[test]
    fn react_action_text() {
        let msg = Message::assistant(
            "Thought: I need to add.\nAction: calculator\nAction Input: {\"expression\": \"2+2\"}",
        );
        assert_eq!(
            classify(&msg).unwrap(),
            Decision::Act {
                tool: "calculator".into(),
                arguments: json!({"expression": "2+2"}),
                thought: Some("I need to add.".into()),
            }
        );
    }

    #[test]
    fn text_after_observation_marker_is_ignored() {
        let msg = Message::assistant(
            "Action: web_search\nAction Input: {\"query\": \"rust\"}\nObservation: made up",
        );
        let Decision::Act { arguments, .. } = classify(&msg).unwrap() else {
            panic!("expected an action");
        };
        assert_eq!(arguments, json!({"query": "rust"}));
    }

    #[test]
    fn non_json_input_is_kept_as_string() {
        let msg = Message::assistant("Action: wikipedia\nAction Input: Ada Lovelace");
        let Decision::Act { arguments, thought, .. } = classify(&msg).unwrap() else {
            panic!("expected an action");
        };
        assert_eq!(arguments, json!("Ada Lovelace"));
        assert!(thought.is_none());
    }

    #[test]
    fn plain_text_is_the_answer() {
        let msg = Message::assistant("2 + 2 is 4.");
        assert_eq!(classify(&msg).unwrap(), Decision::FinalAnswer("2 + 2 is 4.".into()));
    }

    #[test]
    fn empty_reply_is_an_error() {
        let err = classify(&Message::assistant("  ")).unwrap_err();
        assert!(matches!(err, Error::Provider(ProviderError::InvalidResponse(_))));
    }

    #[test]
    fn into_result_maps_variants() {
        assert!(Decision::FinalAnswer("x".into()).into_result().is_answer());
        let act = Decision::Act {
            tool: "calculator".into(),
            arguments: json!({}),
            thought: None,
        };
        assert!(act.into_result().is_action());
    }
}
