pub mod assets;
pub mod camera;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod math;
pub mod network;
pub mod player;

// Re-export commonly used items
pub use game::GamePlugin;
