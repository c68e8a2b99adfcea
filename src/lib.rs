pub mod assets;
pub mod audio;
pub mod clock;
pub mod compute;
pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod highscore;
pub mod logging;
pub mod render;
pub mod world;
