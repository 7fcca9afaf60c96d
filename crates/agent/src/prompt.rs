//! Prompt assembly for one planning step.
//!
//! The prompt is a pure function of the question, the enabled tool
//! descriptors, and the observations so far: the same inputs always give
//! byte-identical text. Tool descriptors keep the caller's order;
//! observations keep submission order.

use stepwise_core::message::Message;
use stepwise_core::provider::ToolDefinition;
use stepwise_core::tool::Observation;

/// Marker the model uses to introduce a tool call in text mode.
pub const ACTION_MARKER: &str = "Action:";
/// Marker for the JSON arguments of a text-mode tool call.
pub const ACTION_INPUT_MARKER: &str = "Action Input:";
/// Marker that ends the task.
pub const FINAL_ANSWER_MARKER: &str = "Final Answer:";
/// Where the model must stop so the caller can run the tool.
pub const OBSERVATION_STOP: &str = "\nObservation:";

/// The prompt sent to the provider for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,
    pub tools: Vec<ToolDefinition>,
}

impl AssembledPrompt {
    /// Both parts as one string, which is what gets token-checked.
    pub fn text(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }

    pub fn messages(&self) -> Vec<Message> {
        vec![Message::system(&self.system), Message::user(&self.user)]
    }
}

pub fn assemble(
    question: &str,
    tools: &[ToolDefinition],
    observations: &[Observation],
) -> AssembledPrompt {
    AssembledPrompt {
        system: render_system(tools),
        user: render_user(question, observations),
        tools: tools.to_vec(),
    }
}

fn render_system(tools: &[ToolDefinition]) -> String {
    if tools.is_empty() {
        return format!(
            "Answer the following question as best you can. No tools are available, \
             so answer from what you know.\n\n\
             Reply in this format:\n\n\
             {FINAL_ANSWER_MARKER} the answer to the original question"
        );
    }

    let mut out = String::from(
        "Answer the following question as best you can. You have access to the following tools:\n\n",
    );
    for tool in tools {
        out.push_str(&format!(
            "{}: {}\n  arguments: {}\n",
            tool.name, tool.description, tool.parameters
        ));
    }

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    out.push_str(&format!(
        "\nUse the following format:\n\n\
         Question: the input question you must answer\n\
         Thought: you should always think about what to do\n\
         {ACTION_MARKER} the action to take, one of [{}]\n\
         {ACTION_INPUT_MARKER} the arguments to the action, as a JSON object\n\
         Observation: the result of the action\n\
         ... (Thought/{ACTION_MARKER}/{ACTION_INPUT_MARKER}/Observation can repeat)\n\
         Thought: I now know the final answer\n\
         {FINAL_ANSWER_MARKER} the answer to the original question\n\n\
         Propose at most one action, then stop and wait for its observation. \
         Never repeat an action you have already taken with the same input.",
        names.join(", ")
    ));
    out
}

fn render_user(question: &str, observations: &[Observation]) -> String {
    let mut out = format!("Question: {}\n", question.trim());

    for obs in observations {
        out.push_str(&format!(
            "{ACTION_MARKER} {}\n{ACTION_INPUT_MARKER} {}\nObservation: tool {} returned {}\n",
            obs.tool,
            obs.arguments,
            obs.tool,
            obs.result_text()
        ));
    }

    if !observations.is_empty() {
        out.push_str("\nActions already taken (do not repeat them):\n");
        for obs in observations {
            out.push_str(&format!("- {}({})\n", obs.tool, obs.arguments));
        }
    }

    out.push_str("Thought:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calculator() -> ToolDefinition {
        ToolDefinition {
            name: "calculator".into(),
            description: "Evaluate arithmetic".into(),
            parameters: json!({"type": "object"}),
        }
    }

    fn search() -> ToolDefinition {
        ToolDefinition {
            name: "web_search".into(),
            description: "Search the web".into(),
            parameters: json!({"type": "object"}),
        }
    }

    #[test]
    fn same_inputs_give_identical_prompts() {
        let obs = vec![Observation::new("calculator", json!({"expression": "2+2"}), "4")];
        let a = assemble("What is 2+2?", &[calculator()], &obs);
        let b = assemble("What is 2+2?", &[calculator()], &obs);
        assert_eq!(a, b);
        assert_eq!(a.text(), b.text());
    }

    #[test]
    fn tools_keep_caller_order() {
        let prompt = assemble("q", &[search(), calculator()], &[]);
        let search_at = prompt.system.find("web_search:").unwrap();
        let calc_at = prompt.system.find("calculator:").unwrap();
        assert!(search_at < calc_at);
        assert!(prompt.system.contains("one of [web_search, calculator]"));
    }

    #[test]
    fn no_tools_asks_for_direct_answer() {
        let prompt = assemble("What is 2+2?", &[], &[]);
        assert!(!prompt.system.contains(ACTION_MARKER));
        assert!(prompt.system.contains(FINAL_ANSWER_MARKER));
        assert!(prompt.tools.is_empty());
    }

    #[test]
    fn observations_are_rendered_in_order() {
        let obs = vec![
            Observation::new("web_search", json!({"query": "rust"}), "a language"),
            Observation::new("calculator", json!({"expression": "1+1"}), "2"),
        ];
        let prompt = assemble("q", &[search(), calculator()], &obs);
        let first = prompt.user.find("tool web_search returned a language").unwrap();
        let second = prompt.user.find("tool calculator returned 2").unwrap();
        assert!(first < second);
        assert!(prompt.user.contains("Actions already taken"));
        assert!(prompt.user.ends_with("Thought:"));
    }

    #[test]
    fn first_step_has_no_history_section() {
        let prompt = assemble("q", &[calculator()], &[]);
        assert!(!prompt.user.contains("Actions already taken"));
        assert_eq!(prompt.messages().len(), 2);
    }
}
