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
use thiserror::Error;

use super::ToggleDefinition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The body cannot be read as a payload at all: it is not JSON, or it is JSON
    /// without a `features` array. Problems inside a single toggle are reported as
    /// [`PayloadError::InvalidToggle`] instead.
    #[error("Cannot parse toggle payload: {0}")]
    Parse(String),

    /// A toggle has the wrong shape. One such toggle invalidates the whole payload.
    #[error("Invalid toggle '{toggle}': {reason}")]
    InvalidToggle { toggle: String, reason: String },
}

/// The decoded body of a `200` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturePayload {
    pub features: Vec<ToggleDefinition>,
}

impl FeaturePayload {
    /// Parses and validates a response body.
    ///
    /// Every toggle must carry a boolean `enabled` and an array `strategies`, plus
    /// the string `name` it is stored under. The first toggle violating that rejects
    /// the payload as a whole, so callers never see a partially accepted batch.
    /// The content of the strategies is not checked.
    pub fn parse(body: &str) -> std::result::Result<Self, PayloadError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| PayloadError::Parse(e.to_string()))?;

        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                PayloadError::Parse("body has no 'features' array".to_string())
            })?;

        for (index, toggle) in features.iter().enumerate() {
            Self::validate_toggle(index, toggle)?;
        }

        serde_json::from_value(value).map_err(|e| PayloadError::Parse(e.to_string()))
    }

    fn validate_toggle(index: usize, toggle: &Value) -> std::result::Result<(), PayloadError> {
        let Some(name) = toggle.get("name").and_then(Value::as_str) else {
            return Err(PayloadError::InvalidToggle {
                toggle: format!("#{index}"),
                reason: "'name' must be a string".to_string(),
            });
        };
        let name = name.to_string();

        if !toggle.get("enabled").is_some_and(Value::is_boolean) {
            return Err(PayloadError::InvalidToggle {
                toggle: name,
                reason: "'enabled' must be a boolean".to_string(),
            });
        }
        if !toggle.get("strategies").is_some_and(Value::is_array) {
            return Err(PayloadError::InvalidToggle {
                toggle: name,
                reason: "'strategies' must be an array".to_string(),
            });
        }
        Ok(())
    }

    /// Indexes the toggles by name. On duplicated names the last one wins.
    pub fn into_toggle_map(self) -> HashMap<String, ToggleDefinition> {
        self.features
            .into_iter()
            .map(|toggle| (toggle.name.clone(), toggle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::feature_default_strategy;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_parse_single_feature() {
        let body = json!({
            "features": [
                {"name": "feature", "enabled": true, "strategies": [{"name": "default"}]}
            ]
        })
        .to_string();

        let payload = FeaturePayload::parse(&body).unwrap();
        assert_eq!(payload.features, vec![feature_default_strategy()]);
    }

    #[test]
    fn test_parse_empty_features() {
        let payload = FeaturePayload::parse(r#"{"features": []}"#).unwrap();
        assert!(payload.features.is_empty());
        assert!(payload.into_toggle_map().is_empty());
    }

    #[rstest]
    #[case::truncated(r#"{"Invalid payload"#)]
    #[case::not_json("<html>oops</html>")]
    #[case::empty("")]
    #[case::no_features(r#"{"toggles": []}"#)]
    #[case::features_not_array(r#"{"features": {}}"#)]
    fn test_parse_errors(#[case] body: &str) {
        let r = FeaturePayload::parse(body);
        assert!(matches!(r, Err(PayloadError::Parse(_))), "{:?}", r);
    }

    #[test]
    fn test_missing_features_array_message() {
        let r = FeaturePayload::parse(r#"{"toggles": []}"#);
        assert_eq!(
            r,
            Err(PayloadError::Parse("body has no 'features' array".to_string()))
        );
        assert_eq!(
            r.unwrap_err().to_string(),
            "Cannot parse toggle payload: body has no 'features' array"
        );
    }

    #[rstest]
    #[case::list_parameter(json!([{"name": "userWithId", "parameters": {"userIds": ["a", "b"]}}]))]
    #[case::bare_string(json!(["default"]))]
    #[case::missing_name(json!([{"parameters": {}}]))]
    #[case::mixed(json!([null, 1, {"name": "default"}]))]
    fn test_strategy_content_never_rejects(#[case] strategies: Value) {
        let count = strategies.as_array().map_or(0, Vec::len);
        let body = json!({
            "features": [{"name": "f", "enabled": true, "strategies": strategies}]
        })
        .to_string();

        let toggles = FeaturePayload::parse(&body).unwrap().into_toggle_map();
        assert!(toggles["f"].enabled);
        assert_eq!(toggles["f"].strategies.len(), count);
    }

    #[test]
    fn test_toggle_without_name() {
        let body = json!({"features": [{"enabled": true, "strategies": []}]}).to_string();
        assert_eq!(
            FeaturePayload::parse(&body),
            Err(PayloadError::InvalidToggle {
                toggle: "#0".to_string(),
                reason: "'name' must be a string".to_string(),
            })
        );
    }

    #[rstest]
    #[case::enabled_null(
        json!({"name": "feature", "enabled": null, "strategies": false}),
        "'enabled' must be a boolean"
    )]
    #[case::enabled_string(
        json!({"name": "feature", "enabled": "true", "strategies": []}),
        "'enabled' must be a boolean"
    )]
    #[case::enabled_missing(
        json!({"name": "feature", "strategies": []}),
        "'enabled' must be a boolean"
    )]
    #[case::strategies_bool(
        json!({"name": "feature", "enabled": true, "strategies": false}),
        "'strategies' must be an array"
    )]
    #[case::strategies_object(
        json!({"name": "feature", "enabled": true, "strategies": {}}),
        "'strategies' must be an array"
    )]
    fn test_invalid_toggle(#[case] toggle: Value, #[case] expected_reason: &str) {
        let body = json!({ "features": [toggle] }).to_string();
        let r = FeaturePayload::parse(&body);
        assert_eq!(
            r,
            Err(PayloadError::InvalidToggle {
                toggle: "feature".to_string(),
                reason: expected_reason.to_string(),
            })
        );
    }

    #[test]
    fn test_one_invalid_toggle_rejects_batch() {
        let body = json!({
            "features": [
                {"name": "good", "enabled": true, "strategies": []},
                {"name": "bad", "enabled": 1, "strategies": []},
                {"name": "also-good", "enabled": false, "strategies": []}
            ]
        })
        .to_string();
        let r = FeaturePayload::parse(&body);
        assert!(
            matches!(&r, Err(PayloadError::InvalidToggle { toggle, .. }) if toggle == "bad"),
            "{:?}",
            r
        );
    }

    #[test]
    fn test_toggle_map_last_write_wins() {
        let body = json!({
            "features": [
                {"name": "dup", "enabled": true, "strategies": []},
                {"name": "other", "enabled": true, "strategies": []},
                {"name": "dup", "enabled": false, "strategies": [{"name": "default"}]}
            ]
        })
        .to_string();
        let toggles = FeaturePayload::parse(&body).unwrap().into_toggle_map();
        assert_eq!(toggles.len(), 2);
        assert!(!toggles["dup"].enabled);
        assert_eq!(toggles["dup"].strategies[0].name, "default");
    }
}
