//! # forge-core
//!
//! The engine itself: register targets with `TargetSetBuilder`, hand the
//! resulting `Build` and a planned execution order to `validate_requirements`
//! and then `execute`.

mod builder;
mod executor;
mod validator;

pub use builder::{TargetBuilder, TargetSetBuilder};
pub use executor::{execute, first_failure};
pub use validator::validate_requirements;
