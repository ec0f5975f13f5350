pub mod analysis;
pub mod assistant;
pub mod audio;
pub mod catalog;
pub mod health;
pub mod share;
pub mod state;
pub mod upload;

pub use analysis::{analyze, compare};
pub use assistant::{brainstorm, chat, enhance_prompt, generate_report, submit_feedback};
pub use audio::{get_audio, upload_audio};
pub use catalog::{list_catalog, submit_to_catalog};
pub use health::health_check;
pub use share::{create_share, get_analysis};
pub use state::AppState;
