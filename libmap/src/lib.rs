//! This library implements the core of the `ramlib` memory mapping pass:
//! deciding whether, and how, an abstract memory can be realized with the
//! RAM primitives described by a declarative library.
//!
//! The pass is organized as follows:
//!
//! - the library files are parsed once per invocation into a [`Library`]:
//!   an ordered list of RAM definitions, each carrying capability
//!   declarations (supported dimensions, initializer kinds, named styles,
//!   and port groups with per-port capabilities), every capability
//!   annotated with the option bindings that were lexically in scope at its
//!   declaration;
//! - for each memory, [`MemMapping`] assembles the set of candidate
//!   configurations:
//!   - the memory's attributes select a mapping style (a RAM kind, a named
//!     style, or soft logic), and the logic fallback is judged viable or
//!     not;
//!   - the candidate set starts with one entry per RAM definition, and a
//!     fixed sequence of phases expands and prunes it: kind and style
//!     filters, the initializer filter, write-port binding, read-port
//!     binding (including sharing a physical port with a write port),
//!     transparency, priority, and read-port init/reset handling;
//!   - a phase may bind a candidate to a capability for free (its option
//!     constraints already hold), split the candidate (the constraints are
//!     newly applied to a clone), or fall back to an emulation clone that
//!     records soft logic to be synthesized alongside the primitive;
//!   - candidates whose option bindings, clock bindings, or reset-value
//!     bindings would become inconsistent are dropped;
//! - the surviving candidates, together with the logic-fallback verdict,
//!   are handed to the external geometry stage, which picks the final
//!   width/depth replication and emits the replacement cells.
//!
//! Port-sharing legality sometimes depends on whether one port's write
//! enable implies or excludes another port's read enable; those questions
//! are answered by cached queries against the host-provided
//! [`SatEngine`](ramlib_netlist::SatEngine).

mod lexer;
mod library;
mod map;
mod options;
mod parser;
mod print;
mod sat;

pub use library::{
    Capability, Caps, ClkPolKind, ClockDef, Library, LibraryError, MemoryDimsDef, MemoryInitKind, PortGroupDef,
    PortKind, RamDef, RamKind, RdEnKind, ResetKind, ResetValDef, ResetValKind, SrstKind, TransKind, TransTargetKind,
    WrTransDef,
};
pub use map::{MapError, MemConfig, MemMapping, RdPortConfig, SwizzleBit, WrPortConfig};
pub use options::{apply_options, options_applied, Options};
pub use sat::EnableSat;
