//! Built-in tool descriptors for stepwise.
//!
//! These describe capabilities to the model: name, purpose, and argument
//! schema. Running them is the caller's job; the engine only hands back a
//! request to run one and waits for the observation on the next step.

use stepwise_core::provider::ToolDefinition;
use stepwise_core::tool::{Tool, ToolRegistry};

/// Arithmetic on a single expression.
pub struct CalculatorTool;

impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a mathematical expression. Supports +, -, *, /, parentheses, and decimal numbers."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate, e.g. '(2 + 3) * 4'"
                }
            },
            "required": ["expression"]
        })
    }
}

/// Web search returning titles, links and snippets.
pub struct WebSearchTool;

impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information. Returns the top results with title, URL and snippet."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "The search query" },
                "max_results": {
                    "type": "integer",
                    "description": "How many results to return (default 5)",
                    "minimum": 1,
                    "maximum": 10
                }
            },
            "required": ["query"]
        })
    }
}

/// Current weather for a place.
pub struct WeatherLookupTool;

impl Tool for WeatherLookupTool {
    fn name(&self) -> &str {
        "weather_lookup"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city: temperature, conditions, humidity and wind."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": { "type": "string", "description": "City name, e.g. 'Berlin'" },
                "units": {
                    "type": "string",
                    "enum": ["metric", "imperial"],
                    "description": "Unit system (default metric)"
                }
            },
            "required": ["city"]
        })
    }
}

/// Plain HTTP GET/POST.
pub struct HttpRequestTool;

impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP request to a URL and return the status code and response body."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "description": "Absolute http(s) URL" },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST"],
                    "description": "HTTP method (default GET)"
                },
                "body": { "type": "string", "description": "Request body for POST" }
            },
            "required": ["url"]
        })
    }
}

/// Encyclopedia summary lookup.
pub struct WikipediaTool;

impl Tool for WikipediaTool {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "Look up a topic on Wikipedia and return the summary of the best matching article."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": { "type": "string", "description": "Article title or search phrase" }
            },
            "required": ["topic"]
        })
    }
}

/// Create a registry with all built-in tool descriptors.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CalculatorTool));
    registry.register(Box::new(WebSearchTool));
    registry.register(Box::new(WeatherLookupTool));
    registry.register(Box::new(HttpRequestTool));
    registry.register(Box::new(WikipediaTool));
    registry
}

/// Built-in descriptors plus `extra` ones. An extra tool with a built-in's
/// name replaces it.
pub fn registry_with(extra: Vec<ToolDefinition>) -> ToolRegistry {
    let mut registry = default_registry();
    for definition in extra {
        registry.register(Box::new(definition));
    }
    registry
}
