//! Markdown handling for assistant output: repair of streaming artifacts and
//! rendering to styled terminal lines.

mod code;
mod highlight;
mod lists;
mod render;
pub mod repair;
mod table;

#[cfg(test)]
mod tests;

pub use code::{code_blocks, CodeBlock};
pub use render::{render_markdown, render_message_with_config, MessageRenderConfig, RenderedMessage};
pub use repair::{prepare_for_render, repair_markdown};
