//! # Spindle Common Library
//!
//! Shared code for the Spindle album store:
//! - Domain model (Album, Verdict, ReviewMessage)
//! - Wire envelope encoding/parsing for the review queue
//! - Error types

pub mod error;
pub mod model;

pub use error::{Error, Result};
pub use model::{Album, NewAlbum, ReviewMessage, Verdict};
