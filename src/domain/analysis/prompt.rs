use crate::domain::settings::Language;

/// Instruction sent next to the image. It spells out the exact reply shape so
/// the model answers with a single JSON object.
pub fn build_analysis_prompt(language: Language) -> String {
    format!(
        r#"Analyze the Chinese handwriting in the image and find every wrongly written character.
Reply with JSON only, in exactly this shape:
{{
  "total_char_count": <number>,
  "full_transcription": "<text>",
  "confidence_score": <0-1>,
  "response_language": "{language}",
  "errors": [
    {{
      "wrong_char": "<written character>",
      "suggested_char": "<correct character>",
      "confidence": "<HIGH|MEDIUM|LOW>",
      "error_type": "<STROKE|RADICAL|PHONETIC|SEMANTIC|CORRECT>",
      "context": "<surrounding text>",
      "position": {{"line": <line>, "char": <index>}}
    }}
  ],
  "quality_issues": ["<issue>"]
}}
Write context and quality_issues in {language}."#,
        language = language.code()
    )
}
