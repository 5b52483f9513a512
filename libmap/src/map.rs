use std::collections::BTreeMap;

use log::debug;
use thiserror::Error;

use ramlib_netlist::{Const, Memory, ParamValue, SatEngine, SigBit, SigMap};

use crate::library::{
    Capability, ClkPolKind, ClockDef, Library, MemoryInitKind, PortKind, RamKind, RdEnKind, ResetKind, ResetValDef,
    ResetValKind, SrstKind, TransKind, TransTargetKind,
};
use crate::options::{apply_options, options_applied, Options};
use crate::sat::EnableSat;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("{memory}: no available {kind} RAMs")]
    NoRamOfKind { memory: String, kind: RamKind },
    #[error("{memory}: no available RAMs with style \"{style}\"")]
    NoRamWithStyle { memory: String, style: String },
}

/// Binding of one abstract write port in a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WrPortConfig {
    /// Index of the read port sharing this physical port, if any.
    pub rd_port: Option<usize>,
    /// Index of the port group in the RAM definition.
    pub port_def: usize,
    /// Port option settings already committed.
    pub portopts: Options,
    /// Emulate priority over these (source) write ports.
    pub emu_prio: Vec<usize>,
    /// Chosen width; picked by the geometry stage.
    pub width: usize,
    /// Chosen byte-enable granule; picked by the geometry stage.
    pub wrbe: usize,
}

/// Binding of one abstract read port in a candidate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RdPortConfig {
    /// Index of the write port sharing this physical port, if any. When
    /// set, the shared write port's `portopts` are authoritative and this
    /// port's own `portopts` stay empty.
    pub wr_port: Option<usize>,
    /// Index of the port group in the RAM definition.
    pub port_def: usize,
    pub portopts: Options,
    /// Values bound to named reset-value tags.
    pub resetvals: BTreeMap<String, Const>,
    /// Sync port mapped onto async hardware: synthesize an output register.
    /// Exclusive with the remaining emulation flags.
    pub emu_sync: bool,
    pub emu_en: bool,
    pub emu_arst: bool,
    pub emu_srst: bool,
    pub emu_init: bool,
    /// Emulate the enable/sync-reset priority.
    pub emu_srst_en_prio: bool,
    /// Emulate transparency with these (source) write ports.
    pub emu_trans: Vec<usize>,
    /// Chosen width; picked by the geometry stage.
    pub width: usize,
}

/// One bit of the geometry stage's data swizzle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SwizzleBit {
    pub src_bit: Option<usize>,
    pub d2w_idx: usize,
    pub d2a_idx: usize,
}

/// One candidate mapping of an abstract memory onto a RAM definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemConfig {
    /// Index of the RAM definition in the library.
    pub ram_def: usize,
    /// RAM-global option settings already committed.
    pub opts: Options,
    pub wr_ports: Vec<WrPortConfig>,
    pub rd_ports: Vec<RdPortConfig>,
    /// Named clock assignments. For anyedge clocks the flag is the shared
    /// clock polarity; for pos/negedge clocks it is the "needs inversion"
    /// flag.
    pub clocks_anyedge: BTreeMap<String, (SigBit, bool)>,
    pub clocks_pnedge: BTreeMap<String, (SigBit, bool)>,
    /// Geometry fields, populated by the downstream stage.
    pub unit_abits: usize,
    pub unit_dbits: usize,
    /// This many low address bits are always zero on all ports.
    pub base_width_log2: usize,
    pub d2w_log2: usize,
    /// Replicate the memory side-by-side this many times for a wider data
    /// path.
    pub mult_d: usize,
    /// A single `unit_dbits * mult_d`-bit word covers this many address
    /// units.
    pub d2a_factor: usize,
    pub swizzle: Vec<SwizzleBit>,
}

impl MemConfig {
    fn apply_wrport_opts<T>(&mut self, pidx: usize, cap: &Capability<T>) -> bool {
        apply_options(&mut self.opts, &cap.opts) && apply_options(&mut self.wr_ports[pidx].portopts, &cap.portopts)
    }

    fn apply_rdport_opts<T>(&mut self, pidx: usize, cap: &Capability<T>) -> bool {
        if let Some(wpidx) = self.rd_ports[pidx].wr_port {
            return self.apply_wrport_opts(wpidx, cap);
        }
        apply_options(&mut self.opts, &cap.opts) && apply_options(&mut self.rd_ports[pidx].portopts, &cap.portopts)
    }

    fn wrport_opts_applied<T>(&self, pidx: usize, cap: &Capability<T>) -> bool {
        options_applied(&self.opts, &cap.opts) && options_applied(&self.wr_ports[pidx].portopts, &cap.portopts)
    }

    fn rdport_opts_applied<T>(&self, pidx: usize, cap: &Capability<T>) -> bool {
        if let Some(wpidx) = self.rd_ports[pidx].wr_port {
            return self.wrport_opts_applied(wpidx, cap);
        }
        options_applied(&self.opts, &cap.opts) && options_applied(&self.rd_ports[pidx].portopts, &cap.portopts)
    }

    fn apply_clock(&mut self, def: &ClockDef, clk: SigBit, clk_polarity: bool) -> bool {
        let Some(name) = &def.name else { return true };
        if def.kind == ClkPolKind::Anyedge {
            match self.clocks_anyedge.get(name) {
                None => {
                    self.clocks_anyedge.insert(name.clone(), (clk, clk_polarity));
                    true
                }
                Some(&bound) => bound == (clk, clk_polarity),
            }
        } else {
            let flip = clk_polarity ^ (def.kind == ClkPolKind::Posedge);
            match self.clocks_pnedge.get(name) {
                None => {
                    self.clocks_pnedge.insert(name.clone(), (clk, flip));
                    true
                }
                Some(&bound) => bound == (clk, flip),
            }
        }
    }
}

fn apply_rstval(pcfg: &mut RdPortConfig, def: &ResetValDef, val: &Const) -> bool {
    match &def.val_kind {
        ResetValKind::None => false,
        ResetValKind::Zero => !val.has_one(),
        ResetValKind::Named(name) => match pcfg.resetvals.get(name) {
            None => {
                pcfg.resetvals.insert(name.clone(), val.clone());
                true
            }
            Some(bound) => bound == val,
        },
    }
}

// Memory attributes requesting a mapping style, in decreasing priority.
const STYLE_ATTRIBUTES: [&str; 8] =
    ["ram_block", "rom_block", "ram_style", "rom_style", "ramstyle", "romstyle", "syn_ramstyle", "syn_romstyle"];

/// Assembles the candidate mappings for one memory. The candidate set acts
/// as a beam: each phase rebuilds it by expanding or pruning the previous
/// generation, and the phase order is fixed. Identical inputs produce the
/// candidate list in the same order.
pub struct MemMapping<'a, E: SatEngine> {
    mem: &'a Memory,
    lib: &'a Library,
    sigmap: &'a SigMap,
    sat: EnableSat<E>,
    cfgs: Vec<MemConfig>,
    logic_ok: bool,
    kind: RamKind,
    style: Option<String>,
}

impl<E: SatEngine> std::fmt::Debug for MemMapping<'_, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("MemMapping")
            .field("memory", &self.mem.id)
            .field("kind", &self.kind)
            .field("style", &self.style)
            .field("logic_ok", &self.logic_ok)
            .field("cfgs", &self.cfgs)
            .finish_non_exhaustive()
    }
}

impl<'a, E: SatEngine> MemMapping<'a, E> {
    pub fn new(mem: &'a Memory, lib: &'a Library, sigmap: &'a SigMap, engine: E) -> Result<Self, MapError> {
        let mut mapping = MemMapping {
            mem,
            lib,
            sigmap,
            sat: EnableSat::new(engine),
            cfgs: vec![],
            logic_ok: false,
            kind: RamKind::Auto,
            style: None,
        };
        mapping.determine_style();
        mapping.logic_ok = mapping.determine_logic_ok();
        if mapping.kind == RamKind::Logic {
            return Ok(mapping);
        }
        for index in 0..lib.ram_defs.len() {
            mapping.cfgs.push(MemConfig { ram_def: index, ..MemConfig::default() });
        }
        mapping.handle_ram_kind()?;
        mapping.handle_ram_style()?;
        mapping.handle_init();
        mapping.handle_wr_ports();
        mapping.handle_rd_ports();
        mapping.handle_trans();
        // If we got this far, the memory is mappable. The remaining phases
        // may require emulating some functionality, but cannot make the
        // mapping fail.
        mapping.handle_priority();
        mapping.handle_rd_init();
        mapping.handle_rd_arst();
        mapping.handle_rd_srst();
        mapping.log_candidates();
        Ok(mapping)
    }

    pub fn configs(&self) -> &[MemConfig] {
        &self.cfgs
    }

    pub fn into_configs(self) -> Vec<MemConfig> {
        self.cfgs
    }

    /// Whether the memory may be lowered entirely to soft logic.
    pub fn logic_fallback_ok(&self) -> bool {
        self.logic_ok
    }

    pub fn requested_kind(&self) -> RamKind {
        self.kind
    }

    pub fn requested_style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    // Go through the memory attributes to determine the user-requested
    // mapping style.
    fn determine_style(&mut self) {
        self.kind = RamKind::Auto;
        self.style = None;
        for attr in STYLE_ATTRIBUTES {
            let Some(value) = self.mem.attribute(attr) else { continue };
            match value {
                ParamValue::Int(1) => self.kind = RamKind::NotLogic,
                ParamValue::Const(value) if value.as_uint() == Some(1) => self.kind = RamKind::NotLogic,
                ParamValue::String(value) => match value.as_str() {
                    "auto" => (),
                    "logic" | "registers" => self.kind = RamKind::Logic,
                    "distributed" => self.kind = RamKind::Distributed,
                    "block" | "block_ram" | "ebr" => self.kind = RamKind::Block,
                    "huge" | "ultra" => self.kind = RamKind::Huge,
                    other => {
                        self.kind = RamKind::NotLogic;
                        self.style = Some(other.to_owned());
                    }
                },
                _ => self.kind = RamKind::NotLogic,
            }
            return;
        }
        if self.mem.bool_attribute("logic_block") {
            self.kind = RamKind::Logic;
        }
    }

    // The memory is mappable entirely to soft logic iff all its write
    // ports are in the same clock domain.
    fn determine_logic_ok(&self) -> bool {
        if self.kind != RamKind::Auto && self.kind != RamKind::Logic {
            return false;
        }
        let Some(first) = self.mem.write_ports.first() else { return true };
        self.mem
            .write_ports
            .iter()
            .all(|port| port.clk_enable && port.clk == first.clk && port.clk_polarity == first.clk_polarity)
    }

    fn handle_ram_kind(&mut self) -> Result<(), MapError> {
        if self.kind == RamKind::Auto || self.kind == RamKind::NotLogic {
            return Ok(());
        }
        self.cfgs.retain(|cfg| self.lib.ram_defs[cfg.ram_def].kind == self.kind);
        if self.cfgs.is_empty() {
            return Err(MapError::NoRamOfKind { memory: self.mem.id.clone(), kind: self.kind });
        }
        Ok(())
    }

    fn handle_ram_style(&mut self) -> Result<(), MapError> {
        let Some(style) = &self.style else { return Ok(()) };
        let mut new_cfgs = vec![];
        for cfg in std::mem::take(&mut self.cfgs) {
            for def in &self.lib.ram_defs[cfg.ram_def].style {
                if &def.val != style {
                    continue;
                }
                let mut new_cfg = cfg.clone();
                if !apply_options(&mut new_cfg.opts, &def.opts) {
                    continue;
                }
                new_cfgs.push(new_cfg);
            }
        }
        self.cfgs = new_cfgs;
        if self.cfgs.is_empty() {
            return Err(MapError::NoRamWithStyle { memory: self.mem.id.clone(), style: style.clone() });
        }
        Ok(())
    }

    fn handle_init(&mut self) {
        if !self.mem.has_init() {
            return;
        }
        let has_one = self.mem.init_value.has_one();
        let mut new_cfgs = vec![];
        for cfg in std::mem::take(&mut self.cfgs) {
            for def in &self.lib.ram_defs[cfg.ram_def].init {
                let usable = if has_one {
                    def.val == MemoryInitKind::Any
                } else {
                    matches!(def.val, MemoryInitKind::Any | MemoryInitKind::Zero)
                };
                if !usable {
                    continue;
                }
                let mut new_cfg = cfg.clone();
                if !apply_options(&mut new_cfg.opts, &def.opts) {
                    continue;
                }
                new_cfgs.push(new_cfg);
            }
        }
        self.cfgs = new_cfgs;
    }

    // Write port assignment, validating clock options along the way.
    fn handle_wr_ports(&mut self) {
        for port in &self.mem.write_ports {
            if !port.clk_enable {
                // Async write ports are unsupported; only the logic
                // fallback can absorb them.
                self.cfgs.clear();
                return;
            }
            let mut new_cfgs = vec![];
            for cfg in std::mem::take(&mut self.cfgs) {
                let ram_def = &self.lib.ram_defs[cfg.ram_def];
                for (didx, def) in ram_def.ports.iter().enumerate() {
                    if !def.val.kind.can_write() {
                        continue;
                    }
                    // The group must still have a free physical port.
                    let used = cfg.wr_ports.iter().filter(|pcfg| pcfg.port_def == didx).count();
                    if used >= def.val.names.len() {
                        continue;
                    }
                    let mut cfg2 = cfg.clone();
                    if !apply_options(&mut cfg2.opts, &def.opts) {
                        continue;
                    }
                    let pcfg2 = WrPortConfig { port_def: didx, ..WrPortConfig::default() };
                    for cdef in &def.val.clock {
                        let mut cfg3 = cfg2.clone();
                        let mut pcfg3 = pcfg2.clone();
                        if !apply_options(&mut cfg3.opts, &cdef.opts) {
                            continue;
                        }
                        if !apply_options(&mut pcfg3.portopts, &cdef.portopts) {
                            continue;
                        }
                        if !cfg3.apply_clock(&cdef.val, port.clk, port.clk_polarity) {
                            continue;
                        }
                        cfg3.wr_ports.push(pcfg3);
                        new_cfgs.push(cfg3);
                    }
                }
            }
            self.cfgs = new_cfgs;
        }
    }

    // Read port assignment, validating clock and rden options along the
    // way.
    fn handle_rd_ports(&mut self) {
        for pidx in 0..self.mem.read_ports.len() {
            let port = &self.mem.read_ports[pidx];
            let mut new_cfgs = vec![];
            for cfg in std::mem::take(&mut self.cfgs) {
                let ram_def = &self.lib.ram_defs[cfg.ram_def];
                // First pass: the read port gets a port group of its own.
                for (didx, def) in ram_def.ports.iter().enumerate() {
                    if !def.val.kind.can_read() {
                        continue;
                    }
                    // An async read port accepts only async defs.
                    if !port.clk_enable && def.val.kind.read_is_sync() {
                        continue;
                    }
                    // The group needs a port not used up by write ports.
                    // Overuse by other read ports is not a problem, it
                    // just results in memory duplication downstream.
                    let used = cfg.wr_ports.iter().filter(|pcfg| pcfg.port_def == didx).count();
                    if used >= def.val.names.len() {
                        continue;
                    }
                    let mut cfg2 = cfg.clone();
                    if !apply_options(&mut cfg2.opts, &def.opts) {
                        continue;
                    }
                    let mut pcfg2 = RdPortConfig { port_def: didx, ..RdPortConfig::default() };
                    if def.val.kind.read_is_sync() {
                        for cdef in &def.val.clock {
                            let mut cfg3 = cfg2.clone();
                            let mut pcfg3 = pcfg2.clone();
                            if !apply_options(&mut cfg3.opts, &cdef.opts) {
                                continue;
                            }
                            if !apply_options(&mut pcfg3.portopts, &cdef.portopts) {
                                continue;
                            }
                            if !cfg3.apply_clock(&cdef.val, port.clk, port.clk_polarity) {
                                continue;
                            }
                            for endef in &def.val.rden {
                                let mut cfg4 = cfg3.clone();
                                let mut pcfg4 = pcfg3.clone();
                                if !apply_options(&mut cfg4.opts, &endef.opts) {
                                    continue;
                                }
                                if !apply_options(&mut pcfg4.portopts, &endef.portopts) {
                                    continue;
                                }
                                if endef.val == RdEnKind::None && port.has_en() {
                                    pcfg4.emu_en = true;
                                }
                                cfg4.rd_ports.push(pcfg4);
                                new_cfgs.push(cfg4);
                            }
                        }
                    } else {
                        pcfg2.emu_sync = port.clk_enable;
                        cfg2.rd_ports.push(pcfg2);
                        new_cfgs.push(cfg2);
                    }
                }
                // Second pass: share a physical port with an already-bound
                // write port.
                for wpidx in 0..self.mem.write_ports.len() {
                    let wport = &self.mem.write_ports[wpidx];
                    let didx = cfg.wr_ports[wpidx].port_def;
                    let def = &ram_def.ports[didx];
                    if cfg.wr_ports[wpidx].rd_port.is_some() {
                        continue;
                    }
                    if !def.val.kind.can_read() {
                        continue;
                    }
                    if !self.addr_compatible(wpidx, pidx) {
                        continue;
                    }
                    if def.val.kind == PortKind::Srsw {
                        if !port.clk_enable {
                            continue;
                        }
                        if port.clk != wport.clk {
                            continue;
                        }
                        if port.clk_polarity != wport.clk_polarity {
                            continue;
                        }
                    }
                    let mut cfg2 = cfg.clone();
                    cfg2.wr_ports[wpidx].rd_port = Some(pidx);
                    let mut pcfg2 =
                        RdPortConfig { wr_port: Some(wpidx), port_def: didx, ..RdPortConfig::default() };
                    pcfg2.emu_sync = port.clk_enable && def.val.kind == PortKind::Arsw;
                    if def.val.kind == PortKind::Srsw {
                        for endef in &def.val.rden {
                            let mut cfg3 = cfg2.clone();
                            let mut pcfg3 = pcfg2.clone();
                            if !cfg3.apply_wrport_opts(wpidx, endef) {
                                continue;
                            }
                            match endef.val {
                                RdEnKind::None => pcfg3.emu_en = port.has_en(),
                                RdEnKind::Any => (),
                                RdEnKind::WriteImplies => {
                                    pcfg3.emu_en = !self.sat.wr_implies_rd(self.mem, wpidx, pidx)
                                }
                                RdEnKind::WriteExcludes => {
                                    if !self.sat.wr_excludes_rd(self.mem, wpidx, pidx) {
                                        continue;
                                    }
                                }
                            }
                            cfg3.rd_ports.push(pcfg3);
                            new_cfgs.push(cfg3);
                        }
                    } else {
                        cfg2.rd_ports.push(pcfg2);
                        new_cfgs.push(cfg2);
                    }
                }
            }
            self.cfgs = new_cfgs;
        }
    }

    // Addresses are compatible when the high bits above the wider port's
    // stride are the same signal, after canonicalization.
    fn addr_compatible(&self, wpidx: usize, rpidx: usize) -> bool {
        let wport = &self.mem.write_ports[wpidx];
        let rport = &self.mem.read_ports[rpidx];
        let max_wide_log2 = wport.wide_log2.max(rport.wide_log2);
        let raddr = rport.addr.slice(max_wide_log2.min(rport.addr.len())..);
        let waddr = wport.addr.slice(max_wide_log2.min(wport.addr.len())..);
        let abits = raddr.len().max(waddr.len());
        self.sigmap.sigs_equal(&raddr.zext(abits), &waddr.zext(abits))
    }

    // Validate transparency restrictions and decide where to add soft
    // transparency logic.
    fn handle_trans(&mut self) {
        for rpidx in 0..self.mem.read_ports.len() {
            let rport = &self.mem.read_ports[rpidx];
            if !rport.clk_enable {
                continue;
            }
            for wpidx in 0..self.mem.write_ports.len() {
                let wport = &self.mem.write_ports[wpidx];
                if !wport.clk_enable {
                    continue;
                }
                if rport.clk != wport.clk {
                    continue;
                }
                if rport.clk_polarity != wport.clk_polarity {
                    continue;
                }
                if rport.collides_x_with(wpidx) {
                    continue;
                }
                let transparent = rport.is_transparent_with(wpidx);
                // There is a transparency restriction to uphold.
                let mut new_cfgs = vec![];
                for mut cfg in std::mem::take(&mut self.cfgs) {
                    if cfg.rd_ports[rpidx].emu_sync {
                        // The soft output register added for an async port
                        // is also the place to add the transparency mux.
                        if transparent {
                            cfg.rd_ports[rpidx].emu_trans.push(wpidx);
                        }
                        new_cfgs.push(cfg);
                        continue;
                    }
                    // Otherwise, split through the relevant wrtrans caps.
                    // Non-transparent pairs require a cap; transparent
                    // pairs can fall back to emulation.
                    let rdef = &self.lib.ram_defs[cfg.ram_def];
                    let wpdef = &rdef.ports[cfg.wr_ports[wpidx].port_def].val;
                    let rpdef = &rdef.ports[cfg.rd_ports[rpidx].port_def].val;
                    let mut found_free = false;
                    for tdef in &wpdef.wrtrans {
                        match &tdef.val.target {
                            TransTargetKind::SelfPort => {
                                if cfg.wr_ports[wpidx].rd_port != Some(rpidx) {
                                    continue;
                                }
                            }
                            TransTargetKind::Other => {
                                if cfg.wr_ports[wpidx].rd_port == Some(rpidx) {
                                    continue;
                                }
                            }
                            TransTargetKind::Named(name) => {
                                if &rpdef.names[0] != name {
                                    continue;
                                }
                            }
                        }
                        if transparent {
                            if tdef.val.kind == TransKind::Old {
                                continue;
                            }
                        } else if tdef.val.kind != TransKind::Old {
                            continue;
                        }
                        let mut cfg2 = cfg.clone();
                        if cfg2.wrport_opts_applied(wpidx, tdef) {
                            found_free = true;
                        } else if !cfg2.apply_wrport_opts(wpidx, tdef) {
                            continue;
                        }
                        new_cfgs.push(cfg2);
                    }
                    if !found_free && transparent {
                        // No cap, or only caps with a splitting cost:
                        // consider emulation as well.
                        cfg.rd_ports[rpidx].emu_trans.push(wpidx);
                        new_cfgs.push(cfg);
                    }
                }
                self.cfgs = new_cfgs;
            }
        }
    }

    // Decide where to add soft priority logic.
    fn handle_priority(&mut self) {
        for p1idx in 0..self.mem.write_ports.len() {
            for p2idx in 0..self.mem.write_ports.len() {
                if !self.mem.write_ports[p2idx].has_priority_over(p1idx) {
                    continue;
                }
                let mut new_cfgs = vec![];
                for mut cfg in std::mem::take(&mut self.cfgs) {
                    let rdef = &self.lib.ram_defs[cfg.ram_def];
                    let p1def = &rdef.ports[cfg.wr_ports[p1idx].port_def].val;
                    let p2def = &rdef.ports[cfg.wr_ports[p2idx].port_def].val;
                    let mut found_free = false;
                    for prdef in &p2def.wrprio {
                        if p1def.names[0] != prdef.val {
                            continue;
                        }
                        let mut cfg2 = cfg.clone();
                        if cfg2.wrport_opts_applied(p2idx, prdef) {
                            found_free = true;
                        } else if !cfg2.apply_wrport_opts(p2idx, prdef) {
                            continue;
                        }
                        new_cfgs.push(cfg2);
                    }
                    if !found_free {
                        cfg.wr_ports[p2idx].emu_prio.push(p1idx);
                        new_cfgs.push(cfg);
                    }
                }
                self.cfgs = new_cfgs;
            }
        }
    }

    // Decide where to add soft init value logic.
    fn handle_rd_init(&mut self) {
        for pidx in 0..self.mem.read_ports.len() {
            let port = &self.mem.read_ports[pidx];
            if !port.clk_enable || !port.has_init() {
                continue;
            }
            let mut new_cfgs = vec![];
            for mut cfg in std::mem::take(&mut self.cfgs) {
                // The soft output register of an async-emulated port
                // includes the init value for free.
                if cfg.rd_ports[pidx].emu_sync {
                    new_cfgs.push(cfg);
                    continue;
                }
                let rdef = &self.lib.ram_defs[cfg.ram_def];
                let pdef = &rdef.ports[cfg.rd_ports[pidx].port_def].val;
                let mut found_free = false;
                for rstdef in &pdef.rdrstval {
                    if rstdef.val.kind != ResetKind::Init {
                        continue;
                    }
                    let mut cfg2 = cfg.clone();
                    if !apply_rstval(&mut cfg2.rd_ports[pidx], &rstdef.val, &port.init_value) {
                        continue;
                    }
                    if cfg2.rdport_opts_applied(pidx, rstdef) {
                        found_free = true;
                    } else if !cfg2.apply_rdport_opts(pidx, rstdef) {
                        continue;
                    }
                    new_cfgs.push(cfg2);
                }
                if !found_free {
                    cfg.rd_ports[pidx].emu_init = true;
                    new_cfgs.push(cfg);
                }
            }
            self.cfgs = new_cfgs;
        }
    }

    // Decide where to add soft async reset logic.
    fn handle_rd_arst(&mut self) {
        for pidx in 0..self.mem.read_ports.len() {
            let port = &self.mem.read_ports[pidx];
            if !port.clk_enable || !port.has_arst() {
                continue;
            }
            let mut new_cfgs = vec![];
            for mut cfg in std::mem::take(&mut self.cfgs) {
                if cfg.rd_ports[pidx].emu_sync {
                    new_cfgs.push(cfg);
                    continue;
                }
                let rdef = &self.lib.ram_defs[cfg.ram_def];
                let pdef = &rdef.ports[cfg.rd_ports[pidx].port_def].val;
                let mut found_free = false;
                for rstdef in &pdef.rdrstval {
                    if rstdef.val.kind != ResetKind::Async {
                        continue;
                    }
                    let mut cfg2 = cfg.clone();
                    if !apply_rstval(&mut cfg2.rd_ports[pidx], &rstdef.val, &port.arst_value) {
                        continue;
                    }
                    if cfg2.rdport_opts_applied(pidx, rstdef) {
                        found_free = true;
                    } else if !cfg2.apply_rdport_opts(pidx, rstdef) {
                        continue;
                    }
                    new_cfgs.push(cfg2);
                }
                if !found_free {
                    cfg.rd_ports[pidx].emu_arst = true;
                    new_cfgs.push(cfg);
                }
            }
            self.cfgs = new_cfgs;
        }
    }

    // Decide where to add soft sync reset logic.
    fn handle_rd_srst(&mut self) {
        for pidx in 0..self.mem.read_ports.len() {
            let port = &self.mem.read_ports[pidx];
            if !port.clk_enable || !port.has_srst() {
                continue;
            }
            let mut new_cfgs = vec![];
            for mut cfg in std::mem::take(&mut self.cfgs) {
                if cfg.rd_ports[pidx].emu_sync {
                    new_cfgs.push(cfg);
                    continue;
                }
                let rdef = &self.lib.ram_defs[cfg.ram_def];
                let pdef = &rdef.ports[cfg.rd_ports[pidx].port_def].val;
                let mut found_free = false;
                for rstdef in &pdef.rdrstval {
                    if rstdef.val.kind != ResetKind::Sync {
                        continue;
                    }
                    let mut cfg2 = cfg.clone();
                    if !apply_rstval(&mut cfg2.rd_ports[pidx], &rstdef.val, &port.srst_value) {
                        continue;
                    }
                    if cfg2.rdport_opts_applied(pidx, rstdef) {
                        found_free = true;
                    } else if !cfg2.apply_rdport_opts(pidx, rstdef) {
                        continue;
                    }
                    if !port.has_en() {
                        new_cfgs.push(cfg2);
                    } else {
                        // With the enable in use, the relative priority of
                        // enable and srst must match, or be emulated. Any
                        // mode value is usable.
                        for mdef in &pdef.rdsrstmode {
                            let mut cfg3 = cfg2.clone();
                            if mdef.val == SrstKind::SrstOverEn && port.ce_over_srst {
                                cfg3.rd_ports[pidx].emu_srst_en_prio = true;
                            }
                            if mdef.val == SrstKind::EnOverSrst && !port.ce_over_srst {
                                cfg3.rd_ports[pidx].emu_srst_en_prio = true;
                            }
                            if !cfg3.apply_rdport_opts(pidx, mdef) {
                                continue;
                            }
                            new_cfgs.push(cfg3);
                        }
                    }
                }
                if !found_free {
                    cfg.rd_ports[pidx].emu_srst = true;
                    new_cfgs.push(cfg);
                }
            }
            self.cfgs = new_cfgs;
        }
    }

    fn log_candidates(&self) {
        debug!("memory {} mapping candidates (pre-geometry):", self.mem.id);
        if self.logic_ok {
            debug!("- logic fallback");
        }
        for cfg in &self.cfgs {
            let rdef = &self.lib.ram_defs[cfg.ram_def];
            debug!("- {}:", rdef.id);
            for (name, value) in &cfg.opts {
                debug!("  - option {} {}", name, value);
            }
            for (pidx, pcfg) in cfg.wr_ports.iter().enumerate() {
                let pdef = &rdef.ports[pcfg.port_def].val;
                match pcfg.rd_port {
                    None => debug!("  - write port {}: port group {}", pidx, pdef.names[0]),
                    Some(rpidx) => {
                        debug!("  - write port {}: port group {} (shared with read port {})", pidx, pdef.names[0], rpidx)
                    }
                }
                for (name, value) in &pcfg.portopts {
                    debug!("    - option {} {}", name, value);
                }
                for &idx in &pcfg.emu_prio {
                    debug!("    - emulate priority over write port {}", idx);
                }
            }
            for (pidx, pcfg) in cfg.rd_ports.iter().enumerate() {
                let pdef = &rdef.ports[pcfg.port_def].val;
                match pcfg.wr_port {
                    None => debug!("  - read port {}: port group {}", pidx, pdef.names[0]),
                    Some(wpidx) => {
                        debug!("  - read port {}: port group {} (shared with write port {})", pidx, pdef.names[0], wpidx)
                    }
                }
                for (name, value) in &pcfg.portopts {
                    debug!("    - option {} {}", name, value);
                }
                if pcfg.emu_sync {
                    debug!("    - emulate data register");
                }
                if pcfg.emu_en {
                    debug!("    - emulate clock enable");
                }
                if pcfg.emu_arst {
                    debug!("    - emulate async reset");
                }
                if pcfg.emu_srst {
                    debug!("    - emulate sync reset");
                }
                if pcfg.emu_init {
                    debug!("    - emulate init value");
                }
                if pcfg.emu_srst_en_prio {
                    debug!("    - emulate sync reset / enable priority");
                }
                for &idx in &pcfg.emu_trans {
                    debug!("    - emulate transparency with write port {}", idx);
                }
            }
        }
    }
}
