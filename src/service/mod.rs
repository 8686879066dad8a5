pub mod assessment;
pub mod convert;
pub mod llm;
pub mod report;
pub mod scoring;

pub use assessment::RiskAssessmentService;
pub use llm::{ChatModel, LlmClient};
pub use scoring::LlmRiskScorer;
