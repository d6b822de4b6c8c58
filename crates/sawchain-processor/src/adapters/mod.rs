pub mod codec;
pub mod memory_state;

pub use codec::*;
pub use memory_state::*;
