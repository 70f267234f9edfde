//! # shortform
//!
//! Short-form video automation: generate a video prompt with a language
//! model, reshape footage to a 1080x1920 vertical canvas, and publish it as a
//! YouTube Short or Instagram Reel.
//!
//! ## Modules
//!
//! - [`reshape`]: frame-by-frame scale and letterbox to the vertical canvas
//! - [`publish`]: credential handling, scheduling and platform uploads
//! - [`content`]: video prompt generation
//! - [`config`]: configuration loaded once at startup

pub mod config;
pub mod content;
pub mod error;
pub mod logging;
pub mod publish;
pub mod reshape;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use publish::{PublishRequest, UploadResult};
pub use reshape::reshape;
