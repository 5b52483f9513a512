use std::fmt::Display;

use indexmap::IndexSet;
use thiserror::Error;

use crate::options::Options;
use crate::parser::Parser;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("failed to open {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{file}:{line}: {message}")]
    Syntax { file: String, line: usize, message: String },
}

/// RAM flavor of a definition, and also the mapping style a memory attribute
/// requests. Library definitions only ever carry the last three.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RamKind {
    #[default]
    Auto,
    Logic,
    NotLogic,
    Distributed,
    Block,
    Huge,
}

impl Display for RamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RamKind::Auto => write!(f, "auto"),
            RamKind::Logic => write!(f, "logic"),
            RamKind::NotLogic => write!(f, "not_logic"),
            RamKind::Distributed => write!(f, "distributed"),
            RamKind::Block => write!(f, "block"),
            RamKind::Huge => write!(f, "huge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryInitKind {
    None,
    Zero,
    Any,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PortKind {
    /// Async read.
    Ar,
    /// Sync read.
    #[default]
    Sr,
    /// Sync write.
    Sw,
    /// Async read + sync write.
    Arsw,
    /// Sync read + sync write.
    Srsw,
}

impl PortKind {
    pub fn can_read(self) -> bool {
        self != PortKind::Sw
    }

    pub fn can_write(self) -> bool {
        !matches!(self, PortKind::Ar | PortKind::Sr)
    }

    pub fn read_is_sync(self) -> bool {
        matches!(self, PortKind::Sr | PortKind::Srsw)
    }
}

impl Display for PortKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            PortKind::Ar => write!(f, "ar"),
            PortKind::Sr => write!(f, "sr"),
            PortKind::Sw => write!(f, "sw"),
            PortKind::Arsw => write!(f, "arsw"),
            PortKind::Srsw => write!(f, "srsw"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClkPolKind {
    Anyedge,
    Posedge,
    Negedge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockDef {
    pub kind: ClkPolKind,
    /// Named clocks must resolve to the same signal and polarity across the
    /// whole candidate.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdEnKind {
    None,
    Any,
    WriteImplies,
    WriteExcludes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetKind {
    Init,
    Async,
    Sync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetValKind {
    None,
    Zero,
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetValDef {
    pub kind: ResetKind,
    pub val_kind: ResetValKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SrstKind {
    SrstOverEn,
    EnOverSrst,
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransTargetKind {
    /// The read port sharing this physical port.
    SelfPort,
    /// Any read port not sharing this physical port.
    Other,
    /// The port group with this first name.
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransKind {
    New,
    Old,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrTransDef {
    pub target: TransTargetKind,
    pub kind: TransKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryDimsDef {
    pub abits: usize,
    pub dbits: usize,
}

/// A capability declaration, carrying the option bindings that were in
/// scope where it was declared. Using the capability in a candidate
/// commits the candidate to those bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability<T> {
    pub val: T,
    pub opts: Options,
    pub portopts: Options,
}

impl<T> Capability<T> {
    pub fn new(val: T, opts: Options, portopts: Options) -> Self {
        Capability { val, opts, portopts }
    }
}

pub type Caps<T> = Vec<Capability<T>>;

/// One group of identical physical ports on a RAM primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortGroupDef {
    pub kind: PortKind,
    pub names: Vec<String>,
    pub clock: Caps<ClockDef>,
    pub width: Caps<usize>,
    pub mixwidth: Caps<()>,
    pub addrce: Caps<()>,
    pub rden: Caps<RdEnKind>,
    pub rdrstval: Caps<ResetValDef>,
    pub rdsrstmode: Caps<SrstKind>,
    pub wrbe: Caps<usize>,
    pub wrprio: Caps<String>,
    pub wrtrans: Caps<WrTransDef>,
    pub wrcs: Caps<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RamDef {
    pub id: String,
    pub kind: RamKind,
    pub ports: Caps<PortGroupDef>,
    pub dims: Caps<MemoryDimsDef>,
    pub init: Caps<MemoryInitKind>,
    pub style: Caps<String>,
}

/// An ordered collection of RAM definitions, accumulated over one or more
/// library files, plus the active define set.
pub struct Library {
    pub ram_defs: Vec<RamDef>,
    pub defines: IndexSet<String>,
    pub(crate) defines_unused: IndexSet<String>,
}

impl Library {
    pub fn new(defines: IndexSet<String>) -> Self {
        Library { ram_defs: vec![], defines_unused: defines.clone(), defines }
    }

    pub fn parse_file(&mut self, file: &str) -> Result<(), LibraryError> {
        let text = std::fs::read_to_string(file)
            .map_err(|source| LibraryError::Io { file: file.to_owned(), source })?;
        self.parse_str(file, &text)
    }

    pub fn parse_str(&mut self, file: &str, text: &str) -> Result<(), LibraryError> {
        Parser::new(file, text, self).parse()
    }

    /// Defines never referenced by any `ifdef`/`ifndef` so far, in the
    /// order the user supplied them.
    pub fn unused_defines(&self) -> impl Iterator<Item = &str> {
        self.defines_unused.iter().map(|define| define.as_str())
    }

    /// Reports defines never referenced by any `ifdef`/`ifndef`, in the
    /// order the user supplied them. Call once, after the last file.
    pub fn finish(&self) {
        for define in &self.defines_unused {
            log::warn!("define {} not used in the library", define);
        }
    }
}
