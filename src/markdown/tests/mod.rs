mod helpers;
mod render;
