//! Output formatting for CLI.

mod json;
mod text;

pub use json::{
    EntityInfoOutput, EntityStatusOutput, JsonFormatter, ResetOutput, SeasonStatusOutput,
    SourceInfoOutput, SourceStatusOutput,
};
pub use text::TextFormatter;
