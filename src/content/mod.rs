//! Generative video-prompt creation.

pub mod generator;
pub mod prompt;
pub mod script;

pub use generator::ContentGenerator;
pub use prompt::{sample_themes, Style};
pub use script::VideoScript;
