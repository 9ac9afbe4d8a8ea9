pub mod app;
pub mod arenal;
pub mod config;
pub mod logging;
pub mod nodes;
pub mod reactivity;
pub mod render;
pub mod result;
