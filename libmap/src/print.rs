use std::fmt::{Display, Formatter, Result};

use ramlib_netlist::ParamValue;

use crate::library::{
    Capability, ClkPolKind, Library, MemoryInitKind, PortGroupDef, RamDef, RdEnKind, ResetKind, ResetValKind,
    SrstKind, TransKind, TransTargetKind,
};
use crate::options::Options;

// Canonical emission: every capability is prefixed with an option (and,
// inside ports, portoption) chain reconstructing its captured bindings.
// A chain needs no braces since a block body may be a single item, and
// re-binding a name to the value it already has is idempotent, so inherited
// bindings may be repeated freely.

fn write_value(f: &mut Formatter, value: &ParamValue) -> Result {
    match value {
        ParamValue::Int(value) => write!(f, "{}", value),
        ParamValue::String(value) => write!(f, "\"{}\"", value),
        ParamValue::Const(value) => write!(f, "\"{}\"", value),
    }
}

fn write_opts_prefix(f: &mut Formatter, opts: &Options) -> Result {
    for (name, value) in opts {
        write!(f, "option \"{}\" ", name)?;
        write_value(f, value)?;
        write!(f, " ")?;
    }
    Ok(())
}

fn write_portopts_prefix(f: &mut Formatter, portopts: &Options) -> Result {
    for (name, value) in portopts {
        write!(f, "portoption \"{}\" ", name)?;
        write_value(f, value)?;
        write!(f, " ")?;
    }
    Ok(())
}

fn write_port_cap<T>(f: &mut Formatter, cap: &Capability<T>, body: impl Fn(&mut Formatter, &T) -> Result) -> Result {
    write!(f, "\t\t")?;
    write_opts_prefix(f, &cap.opts)?;
    write_portopts_prefix(f, &cap.portopts)?;
    body(f, &cap.val)?;
    writeln!(f, ";")
}

fn write_port_group(f: &mut Formatter, group: &Capability<PortGroupDef>) -> Result {
    write!(f, "\t")?;
    write_opts_prefix(f, &group.opts)?;
    let def = &group.val;
    write!(f, "port {}", def.kind)?;
    for name in &def.names {
        write!(f, " \"{}\"", name)?;
    }
    writeln!(f, " {{")?;
    for cap in &def.clock {
        write_port_cap(f, cap, |f, val| {
            let kind = match val.kind {
                ClkPolKind::Anyedge => "anyedge",
                ClkPolKind::Posedge => "posedge",
                ClkPolKind::Negedge => "negedge",
            };
            write!(f, "clock {}", kind)?;
            if let Some(name) = &val.name {
                write!(f, " \"{}\"", name)?;
            }
            Ok(())
        })?;
    }
    for cap in &def.width {
        write_port_cap(f, cap, |f, val| write!(f, "width {}", val))?;
    }
    for cap in &def.mixwidth {
        write_port_cap(f, cap, |f, _| write!(f, "mixwidth"))?;
    }
    for cap in &def.addrce {
        write_port_cap(f, cap, |f, _| write!(f, "addrce"))?;
    }
    for cap in &def.rden {
        write_port_cap(f, cap, |f, val| {
            write!(f, "rden {}", match val {
                RdEnKind::None => "none",
                RdEnKind::Any => "any",
                RdEnKind::WriteImplies => "write-implies",
                RdEnKind::WriteExcludes => "write-excludes",
            })
        })?;
    }
    for cap in &def.rdrstval {
        write_port_cap(f, cap, |f, val| {
            let keyword = match val.kind {
                ResetKind::Init => "rdinitval",
                ResetKind::Async => "rdarstval",
                ResetKind::Sync => "rdsrstval",
            };
            match &val.val_kind {
                ResetValKind::None => write!(f, "{} none", keyword),
                ResetValKind::Zero => write!(f, "{} zero", keyword),
                ResetValKind::Named(name) => write!(f, "{} \"{}\"", keyword, name),
            }
        })?;
    }
    for cap in &def.rdsrstmode {
        write_port_cap(f, cap, |f, val| {
            write!(f, "rdsrstmode {}", match val {
                SrstKind::EnOverSrst => "en-over-srst",
                SrstKind::SrstOverEn => "srst-over-en",
                SrstKind::Any => "any",
            })
        })?;
    }
    for cap in &def.wrbe {
        write_port_cap(f, cap, |f, val| write!(f, "wrbe {}", val))?;
    }
    for cap in &def.wrprio {
        write_port_cap(f, cap, |f, val| write!(f, "wrprio \"{}\"", val))?;
    }
    for cap in &def.wrtrans {
        write_port_cap(f, cap, |f, val| {
            match &val.target {
                TransTargetKind::SelfPort => write!(f, "wrtrans self")?,
                TransTargetKind::Other => write!(f, "wrtrans other")?,
                TransTargetKind::Named(name) => write!(f, "wrtrans \"{}\"", name)?,
            }
            write!(f, " {}", match val.kind {
                TransKind::New => "new",
                TransKind::Old => "old",
            })
        })?;
    }
    for cap in &def.wrcs {
        write_port_cap(f, cap, |f, val| write!(f, "wrcs {}", val))?;
    }
    writeln!(f, "\t}}")
}

fn write_ram_def(f: &mut Formatter, ram: &RamDef) -> Result {
    writeln!(f, "ram {} {} {{", ram.kind, ram.id)?;
    for cap in &ram.dims {
        write!(f, "\t")?;
        write_opts_prefix(f, &cap.opts)?;
        writeln!(f, "dims {} {};", cap.val.abits, cap.val.dbits)?;
    }
    for cap in &ram.init {
        write!(f, "\t")?;
        write_opts_prefix(f, &cap.opts)?;
        writeln!(f, "init {};", match cap.val {
            MemoryInitKind::None => "none",
            MemoryInitKind::Zero => "zero",
            MemoryInitKind::Any => "any",
        })?;
    }
    for cap in &ram.style {
        write!(f, "\t")?;
        write_opts_prefix(f, &cap.opts)?;
        writeln!(f, "style \"{}\";", cap.val)?;
    }
    for group in &ram.ports {
        write_port_group(f, group)?;
    }
    writeln!(f, "}}")
}

impl Display for Library {
    fn fmt(&self, f: &mut Formatter) -> Result {
        for ram in &self.ram_defs {
            write_ram_def(f, ram)?;
        }
        Ok(())
    }
}
