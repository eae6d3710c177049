//! Data model and validators for the tracefold trace protocol.
//!
//! Everything in this crate is synchronous and side-effect free apart from
//! [`config`], which reads an optional settings file and the environment.

pub mod config;
pub mod error;
pub mod model;
pub mod validate;

pub use config::{TracefoldConfig, ValidationOptions};
pub use error::{CoreError, InvariantError, ShapeError};
