// (C) Copyright IBM Corp. 2025.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named rule deciding under which conditions a toggle is active.
///
/// Strategies are stored and handed out as received; nothing in this crate
/// evaluates them. Decoding never fails: a missing name becomes empty, and
/// parameter values that are not plain strings are kept in their JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct StrategyDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HashMap<String, String>>,
}

/// A feature toggle: an on/off switch plus its ordered evaluation strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleDefinition {
    pub name: String,
    pub enabled: bool,
    pub strategies: Vec<StrategyDefinition>,
}

impl ToggleDefinition {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl From<Value> for StrategyDefinition {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut fields) => Self {
                name: fields.remove("name").map(into_text).unwrap_or_default(),
                parameters: match fields.remove("parameters") {
                    Some(Value::Object(parameters)) => Some(
                        parameters
                            .into_iter()
                            .map(|(key, value)| (key, into_text(value)))
                            .collect(),
                    ),
                    _ => None,
                },
            },
            // Shorthand such as `"strategies": ["default"]`
            other => Self {
                name: into_text(other),
                parameters: None,
            },
        }
    }
}

/// Strings as they are, everything else as JSON text.
fn into_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
