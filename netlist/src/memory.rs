use std::collections::BTreeMap;

use crate::{Const, ParamValue, SigBit, SigSpec};

/// An abstract memory: the input of the RAM mapping passes. Dimensions,
/// initializer contents, attributes, and the port lists are extracted from
/// the netlist by the host before mapping starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memory {
    pub id: String,
    pub attributes: BTreeMap<String, ParamValue>,
    pub depth: usize,
    pub width: usize,
    /// `depth * width` trits; fully-undef rows are uninitialized.
    pub init_value: Const,
    pub write_ports: Vec<MemoryWritePort>,
    pub read_ports: Vec<MemoryReadPort>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWritePort {
    pub addr: SigSpec,
    /// Per-data-bit write enable mask.
    pub en: SigSpec,
    /// This port writes `width << wide_log2` bits per access.
    pub wide_log2: usize,
    pub clk_enable: bool,
    pub clk: SigBit,
    /// True for posedge.
    pub clk_polarity: bool,
    /// `priority_mask[i]` means this port overrides write port `i` on a
    /// same-address collision.
    pub priority_mask: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryReadPort {
    pub addr: SigSpec,
    pub wide_log2: usize,
    pub clk_enable: bool,
    pub clk: SigBit,
    pub clk_polarity: bool,
    pub en: SigBit,
    pub arst: SigBit,
    pub arst_value: Const,
    pub srst: SigBit,
    pub srst_value: Const,
    /// If true, the clock enable takes priority over the sync reset.
    pub ce_over_srst: bool,
    pub init_value: Const,
    /// `transparency_mask[i]`: this port reads the same-cycle write of write
    /// port `i`.
    pub transparency_mask: Vec<bool>,
    /// `collision_x_mask[i]`: a same-cycle collision with write port `i`
    /// reads undef, so no transparency relation needs upholding.
    pub collision_x_mask: Vec<bool>,
}

impl Memory {
    pub fn new(id: impl Into<String>, depth: usize, width: usize) -> Self {
        Memory {
            id: id.into(),
            attributes: BTreeMap::new(),
            depth,
            width,
            init_value: Const::undef(depth * width),
            write_ports: vec![],
            read_ports: vec![],
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_init(mut self, init_value: Const) -> Self {
        assert_eq!(init_value.len(), self.depth * self.width);
        self.init_value = init_value;
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&ParamValue> {
        self.attributes.get(name)
    }

    pub fn bool_attribute(&self, name: &str) -> bool {
        match self.attributes.get(name) {
            Some(ParamValue::Int(value)) => *value != 0,
            Some(ParamValue::Const(value)) => value.has_one(),
            Some(ParamValue::String(value)) => value == "1" || value == "true",
            None => false,
        }
    }

    pub fn has_init(&self) -> bool {
        !self.init_value.is_undef()
    }
}

impl MemoryWritePort {
    pub fn clocked(addr: impl Into<SigSpec>, width: usize, clk: SigBit) -> Self {
        MemoryWritePort {
            addr: addr.into(),
            en: SigSpec::ones(width),
            wide_log2: 0,
            clk_enable: true,
            clk,
            clk_polarity: true,
            priority_mask: vec![],
        }
    }

    pub fn asynchronous(addr: impl Into<SigSpec>, width: usize) -> Self {
        MemoryWritePort {
            addr: addr.into(),
            en: SigSpec::ones(width),
            wide_log2: 0,
            clk_enable: false,
            clk: SigBit::UNDEF,
            clk_polarity: true,
            priority_mask: vec![],
        }
    }

    pub fn with_en(mut self, en: impl Into<SigSpec>) -> Self {
        self.en = en.into();
        self
    }

    pub fn with_clk_polarity(mut self, clk_polarity: bool) -> Self {
        self.clk_polarity = clk_polarity;
        self
    }

    pub fn with_priority_over(mut self, index: usize) -> Self {
        if self.priority_mask.len() <= index {
            self.priority_mask.resize(index + 1, false);
        }
        self.priority_mask[index] = true;
        self
    }

    pub fn has_priority_over(&self, index: usize) -> bool {
        self.priority_mask.get(index).copied().unwrap_or(false)
    }
}

impl MemoryReadPort {
    pub fn asynchronous(addr: impl Into<SigSpec>, width: usize) -> Self {
        MemoryReadPort {
            addr: addr.into(),
            wide_log2: 0,
            clk_enable: false,
            clk: SigBit::UNDEF,
            clk_polarity: true,
            en: SigBit::ONE,
            arst: SigBit::ZERO,
            arst_value: Const::undef(width),
            srst: SigBit::ZERO,
            srst_value: Const::undef(width),
            ce_over_srst: false,
            init_value: Const::undef(width),
            transparency_mask: vec![],
            collision_x_mask: vec![],
        }
    }

    pub fn clocked(addr: impl Into<SigSpec>, width: usize, clk: SigBit) -> Self {
        MemoryReadPort { clk_enable: true, clk, ..Self::asynchronous(addr, width) }
    }

    pub fn with_en(mut self, en: SigBit) -> Self {
        self.en = en;
        self
    }

    pub fn with_clk_polarity(mut self, clk_polarity: bool) -> Self {
        self.clk_polarity = clk_polarity;
        self
    }

    pub fn with_arst(mut self, arst: SigBit, arst_value: Const) -> Self {
        self.arst = arst;
        self.arst_value = arst_value;
        self
    }

    pub fn with_srst(mut self, srst: SigBit, srst_value: Const) -> Self {
        self.srst = srst;
        self.srst_value = srst_value;
        self
    }

    pub fn with_init(mut self, init_value: Const) -> Self {
        self.init_value = init_value;
        self
    }

    pub fn with_transparent_to(mut self, index: usize) -> Self {
        if self.transparency_mask.len() <= index {
            self.transparency_mask.resize(index + 1, false);
        }
        self.transparency_mask[index] = true;
        self
    }

    pub fn with_collision_x(mut self, index: usize) -> Self {
        if self.collision_x_mask.len() <= index {
            self.collision_x_mask.resize(index + 1, false);
        }
        self.collision_x_mask[index] = true;
        self
    }

    pub fn has_en(&self) -> bool {
        self.en != SigBit::ONE
    }

    pub fn has_arst(&self) -> bool {
        self.arst != SigBit::ZERO && !self.arst_value.is_undef()
    }

    pub fn has_srst(&self) -> bool {
        self.srst != SigBit::ZERO && !self.srst_value.is_undef()
    }

    pub fn has_init(&self) -> bool {
        !self.init_value.is_undef()
    }

    pub fn is_transparent_with(&self, index: usize) -> bool {
        self.transparency_mask.get(index).copied().unwrap_or(false)
    }

    pub fn collides_x_with(&self, index: usize) -> bool {
        self.collision_x_mask.get(index).copied().unwrap_or(false)
    }
}
