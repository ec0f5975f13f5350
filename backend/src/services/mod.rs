// 服务层模块
pub mod analysis;
pub mod assistant;
pub mod chat_stream;
pub mod fingerprint_client;
pub mod llm;
pub mod prompts;
pub mod report_generator;

pub use analysis::{AnalysisStrategy, FingerprintStrategy, SyntheticStrategy, build_strategy};
pub use assistant::Assistant;
pub use fingerprint_client::{AudioIdentifier, FingerprintClient};
pub use llm::{GeminiClient, TextGenerator, build_generator};
pub use report_generator::ReportGenerator;
