//! # City Core
//!
//! The narrative progression engine. It consumes `city_rules`, routes
//! operator commands through the four acts, selects which moments surface,
//! decides what efficiency destroys, lets the city grow through emergence
//! rules, and finally classifies how the story ends.
//!
//! ## Core Components
//!
//! - **command**: closed-vocabulary parser for terminal input
//! - **selector**: weighted moment selection and fragility-driven destruction
//! - **acts**: per-act command routing and completion
//! - **endings**: priority-ordered ending classifier
//! - **emergence**: declarative rule matching over the city graph
//! - **beats**: authored dialogue gated on progression
//! - **engine**: the façade that processes one command at a time
//!
//! The core owns no rendering. Content and saves cross its boundary through
//! the `content` and `persistence` traits, and all randomness comes from an
//! injected [`RandomSource`].

pub mod acts;
pub mod beats;
pub mod command;
pub mod config;
pub mod content;
pub mod emergence;
pub mod endings;
pub mod engine;
pub mod persistence;
pub mod random;
pub mod response;
pub mod selector;

pub use acts::*;
pub use beats::*;
pub use command::*;
pub use config::*;
pub use content::*;
pub use emergence::*;
pub use endings::*;
pub use engine::*;
pub use persistence::*;
pub use random::*;
pub use response::*;
pub use selector::*;
