pub mod app;
pub mod bridge;

pub use app::*;
pub use bridge::*;
