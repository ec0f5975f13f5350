pub mod analysis;
pub mod assistant;
pub mod audio;
pub mod catalog;
pub mod shared;

pub use analysis::*;
pub use assistant::*;
pub use audio::*;
pub use catalog::*;
pub use shared::*;
