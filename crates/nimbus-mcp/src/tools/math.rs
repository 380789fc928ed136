//! Arithmetic tool used to check protocol wiring end to end.

use std::collections::HashMap;

use serde_json::{Value, json};

use crate::protocol::{CallToolResult, ToolDefinition};

use super::{ToolState, required_f64};

pub fn definitions() -> Vec<ToolDefinition> {
    vec![ToolDefinition {
        name: "add_numbers".to_string(),
        description: "Add two numbers together.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": {
                    "type": "number",
                    "description": "First number to add"
                },
                "b": {
                    "type": "number",
                    "description": "Second number to add"
                }
            },
            "required": ["a", "b"]
        }),
    }]
}

pub fn sum_text(a: f64, b: f64) -> String {
    format!("The sum of {} and {} is {}", a, b, a + b)
}

/// Add two numbers.
pub async fn add_numbers(_state: &ToolState, arguments: &HashMap<String, Value>) -> CallToolResult {
    let a = match required_f64(arguments, "a") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let b = match required_f64(arguments, "b") {
        Ok(v) => v,
        Err(e) => return e,
    };

    CallToolResult::success(sum_text(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::nws::NwsClient;

    fn test_state() -> ToolState {
        ToolState {
            nws: NwsClient::new(&ServerConfig::default()).unwrap(),
            search: None,
        }
    }

    #[test]
    fn test_sum_text_integral() {
        assert_eq!(sum_text(2.0, 3.0), "The sum of 2 and 3 is 5");
    }

    #[test]
    fn test_sum_text_fractional() {
        assert_eq!(sum_text(1.5, -0.25), "The sum of 1.5 and -0.25 is 1.25");
    }

    #[tokio::test]
    async fn test_add_numbers() {
        let arguments: HashMap<String, Value> =
            serde_json::from_value(json!({"a": 2, "b": 3})).unwrap();
        let result = add_numbers(&test_state(), &arguments).await;

        assert_eq!(result.is_error, Some(false));
        assert_eq!(result.text(), "The sum of 2 and 3 is 5");
    }

    #[tokio::test]
    async fn test_add_numbers_missing_operand() {
        let arguments: HashMap<String, Value> = serde_json::from_value(json!({"a": 2})).unwrap();
        let result = add_numbers(&test_state(), &arguments).await;

        assert_eq!(result.is_error, Some(true));
        assert_eq!(result.text(), "Missing required parameter: b");
    }
}
