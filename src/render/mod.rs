//! Rendering module for inspecting templates as text or JSON.

mod json;
mod text;

pub use json::{to_json, to_json_string, JsonFormat};
pub use text::{to_text, TextOptions};
