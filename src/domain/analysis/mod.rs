pub mod error;
pub mod compression;
pub mod key_resolution;
pub mod model;
pub mod parser;
pub mod prompt;
pub mod retry;
pub mod service;

pub use error::AnalysisError;
pub use compression::ImageCompressor;
pub use key_resolution::{resolve_api_key, KeyCandidates, KeySource, ResolvedKey};
pub use model::{AnalysisRequest, AnalysisResult, CharacterError, Confidence, ErrorType, Position};
pub use parser::parse_analysis_content;
pub use retry::RetryPolicy;
pub use service::{AnalysisOutcome, AnalysisService, AnalysisServiceApi};
