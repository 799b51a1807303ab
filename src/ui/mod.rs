//! Terminal presentation: color policy and styled line output.

pub mod ansi;
pub mod theme;
