use crate::domain::settings::Language;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Input for one homework analysis
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Image as a `data:` URL
    pub image_data: String,
    pub user_language: Language,
    pub user_id: Option<Uuid>,
    pub custom_api_key: Option<String>,
}

/// Structured reply of the vision model.
///
/// The model output is only required to be a JSON object. Every field is read
/// defensively: missing, `null` or mistyped values fall back to defaults, and
/// counts may arrive as integral floats or numeric strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(from = "Value")]
pub struct AnalysisResult {
    pub total_char_count: i64,
    pub full_transcription: String,
    pub confidence_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_language: Option<String>,
    pub errors: Vec<CharacterError>,
    pub quality_issues: Vec<String>,
}

impl From<Value> for AnalysisResult {
    fn from(value: Value) -> Self {
        Self::from_value(&value)
    }
}

impl AnalysisResult {
    pub fn from_value(value: &Value) -> Self {
        let transcription = value
            .get("full_transcription")
            .filter(|v| !v.is_null())
            .or_else(|| value.get("transcription"));

        Self {
            total_char_count: lenient_i64(value.get("total_char_count")),
            full_transcription: lenient_string(transcription),
            confidence_score: lenient_f64(value.get("confidence_score")),
            response_language: Some(lenient_string(value.get("response_language")))
                .filter(|lang| !lang.is_empty()),
            errors: lenient_array(value.get("errors"))
                .iter()
                .filter(|entry| entry.is_object())
                .map(CharacterError::from_value)
                .collect(),
            quality_issues: lenient_array(value.get("quality_issues"))
                .iter()
                .map(|issue| lenient_string(Some(issue)))
                .filter(|issue| !issue.is_empty())
                .collect(),
        }
    }
}

/// One suspected wrong character and its correction
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CharacterError {
    #[serde(default)]
    pub wrong_char: String,
    #[serde(default)]
    pub suggested_char: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub error_type: ErrorType,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl CharacterError {
    pub fn from_value(value: &Value) -> Self {
        Self {
            wrong_char: lenient_string(value.get("wrong_char")),
            suggested_char: lenient_string(value.get("suggested_char")),
            confidence: lenient_enum(value.get("confidence")),
            error_type: lenient_enum(value.get("error_type")),
            context: lenient_string(value.get("context")),
            position: value
                .get("position")
                .filter(|p| p.is_object())
                .map(|p| Position {
                    line: lenient_i64(p.get("line")),
                    char: lenient_i64(p.get("char")),
                }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorType {
    Stroke,
    Radical,
    Phonetic,
    Semantic,
    Correct,
    #[default]
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Position {
    #[serde(default)]
    pub line: i64,
    #[serde(default)]
    pub char: i64,
}

/// Integers, integral floats and numeric strings; anything else is 0
fn lenient_i64(value: Option<&Value>) -> i64 {
    let integral = |f: f64| (f.is_finite() && f.fract() == 0.0).then_some(f as i64);
    match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
    .unwrap_or_default()
}

fn lenient_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite())
    .unwrap_or_default()
}

fn lenient_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn lenient_array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

/// Case-insensitive enum tag; unknown or non-string values give the default
fn lenient_enum<T: DeserializeOwned + Default>(value: Option<&Value>) -> T {
    match value {
        Some(Value::String(s)) => {
            serde_json::from_value(Value::String(s.trim().to_uppercase())).unwrap_or_default()
        }
        _ => T::default(),
    }
}
