pub mod cli;
pub mod config;
pub mod cover;
pub mod ffmpeg;
pub mod layout;
pub mod pipeline;
pub mod runtime;
pub mod tool;

#[cfg(test)]
mod test_util;
