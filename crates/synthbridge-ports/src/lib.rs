pub mod midi;
pub mod storage;
pub mod synth;
pub mod types;

pub use midi::*;
pub use storage::*;
pub use synth::*;
pub use types::*;
