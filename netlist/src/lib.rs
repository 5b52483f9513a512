mod logic;
mod memory;
mod param;
mod sat;
mod sig;

pub use logic::{Const, Trit};
pub use memory::{Memory, MemoryReadPort, MemoryWritePort};
pub use param::ParamValue;
pub use sat::SatEngine;
pub use sig::{SigBit, SigMap, SigSpec};
