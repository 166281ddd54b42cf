use super::error::AnalysisError;
use super::model::AnalysisResult;
use serde_json::Value;

/// Parse the text content of a model reply into an [`AnalysisResult`].
///
/// The whole content is tried first. Models often wrap the object in prose or
/// code fences, so the first balanced `{...}` block is tried next. Any JSON
/// object is accepted; field values are read leniently by
/// [`AnalysisResult::from_value`].
pub fn parse_analysis_content(content: &str) -> Result<AnalysisResult, AnalysisError> {
    if let Some(object) = parse_object(content.trim()) {
        return Ok(AnalysisResult::from_value(&object));
    }

    let candidate = extract_first_json_object(content).ok_or_else(|| {
        AnalysisError::MalformedResponse("no JSON object found in model reply".to_string())
    })?;

    let object = serde_json::from_str::<Value>(candidate)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
    Ok(AnalysisResult::from_value(&object))
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(Value::is_object)
}

/// Find the first `{...}` block whose braces balance, ignoring braces inside strings
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    text.char_indices()
        .filter(|(_, c)| *c == '{')
        .find_map(|(start, _)| balanced_block_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the balanced block at the start of `text`, if it closes
fn balanced_block_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
