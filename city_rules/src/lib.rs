//! # City Rules
//!
//! The rulebook crate for the living-city narrative. It holds the data every
//! other part of the system agrees on: play progression, narrative moments,
//! endings, the city's relationship graph, and the content records loaded
//! from the content store. This crate owns no engine logic and no I/O.

pub mod city;
pub mod content;
pub mod error;
pub mod mechanics;
pub mod moments;
pub mod progression;

pub use city::*;
pub use content::*;
pub use error::*;
pub use mechanics::*;
pub use moments::*;
pub use progression::*;
