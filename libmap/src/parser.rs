use std::collections::BTreeSet;

use ramlib_netlist::ParamValue;

use crate::lexer::Lexer;
use crate::library::{
    Capability, ClkPolKind, ClockDef, Library, LibraryError, MemoryDimsDef, MemoryInitKind, PortGroupDef, PortKind,
    RamDef, RamKind, RdEnKind, ResetKind, ResetValDef, ResetValKind, SrstKind, TransKind, TransTargetKind, WrTransDef,
};
use crate::options::Options;

type Result<T> = std::result::Result<T, LibraryError>;

/// Recursive descent parser for library files. Three nested scopes: top,
/// ram, and port; each accepts its own items plus `ifdef`/`ifndef` and the
/// option scopes. Items inside an inactive `ifdef` branch are parsed and
/// discarded.
pub(crate) struct Parser<'a> {
    file: String,
    lexer: Lexer<'a>,
    lib: &'a mut Library,
    option_stack: Vec<(String, ParamValue)>,
    portoption_stack: Vec<(String, ParamValue)>,
    ram: RamDef,
    port: PortGroupDef,
    active: bool,
}

impl<'a> Parser<'a> {
    pub fn new(file: &str, text: &'a str, lib: &'a mut Library) -> Self {
        Parser {
            file: file.to_owned(),
            lexer: Lexer::new(text),
            lib,
            option_stack: vec![],
            portoption_stack: vec![],
            ram: RamDef::default(),
            port: PortGroupDef::default(),
            active: true,
        }
    }

    pub fn parse(mut self) -> Result<()> {
        while self.lexer.peek().is_some() {
            self.parse_top_item()?;
        }
        Ok(())
    }

    fn err_at(&self, line: usize, message: impl Into<String>) -> LibraryError {
        LibraryError::Syntax { file: self.file.clone(), line, message: message.into() }
    }

    fn err(&self, message: impl Into<String>) -> LibraryError {
        self.err_at(self.lexer.line(), message)
    }

    fn peek_token(&mut self) -> &str {
        self.lexer.peek().unwrap_or("")
    }

    fn get_token(&mut self) -> String {
        self.lexer.advance().unwrap_or_default()
    }

    fn get_id(&mut self) -> Result<String> {
        let token = self.get_token();
        if !(token.starts_with('$') || token.starts_with('\\')) {
            return Err(self.err(format!("expected id string, got `{}`", token)));
        }
        Ok(token)
    }

    fn get_name(&mut self) -> Result<String> {
        let token = self.get_token();
        let mut valid = !token.is_empty();
        if let Some(first) = token.chars().next() {
            if !first.is_ascii_alphabetic() && first != '_' {
                valid = false;
            }
        }
        if !token.chars().all(|chr| chr.is_ascii_alphanumeric() || chr == '_') {
            valid = false;
        }
        if !valid {
            return Err(self.err(format!("expected name, got `{}`", token)));
        }
        Ok(token)
    }

    fn get_string(&mut self) -> Result<String> {
        let token = self.get_token();
        if token.len() < 2 || !token.starts_with('"') || !token.ends_with('"') {
            return Err(self.err(format!("expected string, got `{}`", token)));
        }
        Ok(token[1..token.len() - 1].to_owned())
    }

    fn peek_string(&mut self) -> bool {
        self.peek_token().starts_with('"')
    }

    fn get_int(&mut self) -> Result<i64> {
        let token = self.get_token();
        let parsed = if let Some(hex) = token.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else {
            token.parse::<i64>()
        };
        parsed.map_err(|_| self.err(format!("expected int, got `{}`", token)))
    }

    fn get_uint(&mut self) -> Result<usize> {
        let value = self.get_int()?;
        usize::try_from(value).map_err(|_| self.err(format!("expected non-negative int, got `{}`", value)))
    }

    fn peek_int(&mut self) -> bool {
        self.peek_token().starts_with(|chr: char| chr.is_ascii_digit())
    }

    fn get_semi(&mut self) -> Result<()> {
        let token = self.get_token();
        if token != ";" {
            return Err(self.err(format!("expected `;`, got `{}`", token)));
        }
        Ok(())
    }

    fn get_value(&mut self) -> Result<ParamValue> {
        if self.peek_string() {
            Ok(ParamValue::String(self.get_string()?))
        } else {
            Ok(ParamValue::Int(self.get_int()?))
        }
    }

    fn options(&self) -> Options {
        self.option_stack.iter().cloned().collect()
    }

    fn portoptions(&self) -> Options {
        self.portoption_stack.iter().cloned().collect()
    }

    fn cap<T>(&self, val: T) -> Capability<T> {
        Capability::new(val, self.options(), self.portoptions())
    }

    // An `ifdef` nested in an inactive region stays inactive no matter what
    // its define says.
    fn enter_ifdef(&mut self, polarity: bool) -> Result<bool> {
        let save = self.active;
        let name = self.get_name()?;
        self.lib.defines_unused.shift_remove(&name);
        self.active = save && (self.lib.defines.contains(&name) == polarity);
        Ok(save)
    }

    fn parse_ifdef(&mut self, polarity: bool, item: fn(&mut Self) -> Result<()>) -> Result<()> {
        let save = self.enter_ifdef(polarity)?;
        self.parse_block(item)?;
        if self.peek_token() == "else" {
            self.get_token();
            self.active = !self.active && save;
            self.parse_block(item)?;
        }
        self.active = save;
        Ok(())
    }

    fn parse_option(&mut self, item: fn(&mut Self) -> Result<()>) -> Result<()> {
        let name = self.get_string()?;
        let value = self.get_value()?;
        self.option_stack.push((name, value));
        let res = self.parse_block(item);
        self.option_stack.pop();
        res
    }

    fn parse_portoption(&mut self, item: fn(&mut Self) -> Result<()>) -> Result<()> {
        let name = self.get_string()?;
        let value = self.get_value()?;
        self.portoption_stack.push((name, value));
        let res = self.parse_block(item);
        self.portoption_stack.pop();
        res
    }

    // The braces are optional for a single item.
    fn parse_block(&mut self, item: fn(&mut Self) -> Result<()>) -> Result<()> {
        if self.peek_token() == "{" {
            self.get_token();
            while self.peek_token() != "}" {
                if self.lexer.peek().is_none() {
                    return Err(self.err("unexpected EOF while parsing block"));
                }
                item(self)?;
            }
            self.get_token();
        } else {
            item(self)?;
        }
        Ok(())
    }

    fn parse_port_item(&mut self) -> Result<()> {
        let token = self.get_token();
        match token.as_str() {
            "ifdef" => self.parse_ifdef(true, Self::parse_port_item)?,
            "ifndef" => self.parse_ifdef(false, Self::parse_port_item)?,
            "option" => self.parse_option(Self::parse_port_item)?,
            "portoption" => self.parse_portoption(Self::parse_port_item)?,
            "clock" => {
                if self.port.kind == PortKind::Ar {
                    return Err(self.err("`clock` not allowed in async read port"));
                }
                let kind = match self.get_token().as_str() {
                    "anyedge" => ClkPolKind::Anyedge,
                    "posedge" => ClkPolKind::Posedge,
                    "negedge" => ClkPolKind::Negedge,
                    other => {
                        return Err(self.err(format!(
                            "expected `posedge`, `negedge`, or `anyedge`, got `{}`",
                            other
                        )))
                    }
                };
                let name = if self.peek_string() { Some(self.get_string()?) } else { None };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(ClockDef { kind, name });
                    self.port.clock.push(cap);
                }
            }
            "width" => {
                loop {
                    let width = self.get_uint()?;
                    if self.active {
                        let cap = self.cap(width);
                        self.port.width.push(cap);
                    }
                    if !self.peek_int() {
                        break;
                    }
                }
                self.get_semi()?;
            }
            "mixwidth" => {
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(());
                    self.port.mixwidth.push(cap);
                }
            }
            "addrce" => {
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(());
                    self.port.addrce.push(cap);
                }
            }
            "rden" => {
                if !self.port.kind.read_is_sync() {
                    return Err(self.err("`rden` only allowed on sync read ports"));
                }
                let val = match self.get_token().as_str() {
                    "none" => RdEnKind::None,
                    "any" => RdEnKind::Any,
                    "write-implies" => {
                        if self.port.kind != PortKind::Srsw {
                            return Err(self.err("`write-implies` only makes sense for read+write ports"));
                        }
                        RdEnKind::WriteImplies
                    }
                    "write-excludes" => {
                        if self.port.kind != PortKind::Srsw {
                            return Err(self.err("`write-excludes` only makes sense for read+write ports"));
                        }
                        RdEnKind::WriteExcludes
                    }
                    other => {
                        return Err(self.err(format!(
                            "expected `none`, `any`, `write-implies`, or `write-excludes`, got `{}`",
                            other
                        )))
                    }
                };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(val);
                    self.port.rden.push(cap);
                }
            }
            "rdinitval" | "rdsrstval" | "rdarstval" => {
                if !self.port.kind.read_is_sync() {
                    return Err(self.err(format!("`{}` only allowed on sync read ports", token)));
                }
                let kind = match token.as_str() {
                    "rdinitval" => ResetKind::Init,
                    "rdsrstval" => ResetKind::Sync,
                    "rdarstval" => ResetKind::Async,
                    _ => unreachable!(),
                };
                let val_kind = match self.peek_token().to_owned().as_str() {
                    "none" => {
                        self.get_token();
                        ResetValKind::None
                    }
                    "zero" => {
                        self.get_token();
                        ResetValKind::Zero
                    }
                    _ => ResetValKind::Named(self.get_string()?),
                };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(ResetValDef { kind, val_kind });
                    self.port.rdrstval.push(cap);
                }
            }
            "rdsrstmode" => {
                if !self.port.kind.read_is_sync() {
                    return Err(self.err("`rdsrstmode` only allowed on sync read ports"));
                }
                let val = match self.get_token().as_str() {
                    "en-over-srst" => SrstKind::EnOverSrst,
                    "srst-over-en" => SrstKind::SrstOverEn,
                    "any" => SrstKind::Any,
                    other => {
                        return Err(self.err(format!(
                            "expected `en-over-srst`, `srst-over-en`, or `any`, got `{}`",
                            other
                        )))
                    }
                };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(val);
                    self.port.rdsrstmode.push(cap);
                }
            }
            "wrbe" => {
                if !self.port.kind.can_write() {
                    return Err(self.err("`wrbe` only allowed on write ports"));
                }
                let val = self.get_uint()?;
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(val);
                    self.port.wrbe.push(cap);
                }
            }
            "wrprio" => {
                if !self.port.kind.can_write() {
                    return Err(self.err("`wrprio` only allowed on write ports"));
                }
                loop {
                    let target = self.get_string()?;
                    if self.active {
                        let cap = self.cap(target);
                        self.port.wrprio.push(cap);
                    }
                    if !self.peek_string() {
                        break;
                    }
                }
                self.get_semi()?;
            }
            "wrtrans" => {
                if !self.port.kind.can_write() {
                    return Err(self.err("`wrtrans` only allowed on write ports"));
                }
                let target = match self.peek_token().to_owned().as_str() {
                    "self" => {
                        if self.port.kind != PortKind::Srsw {
                            return Err(self.err("`wrtrans self` only allowed on sync read + sync write ports"));
                        }
                        self.get_token();
                        TransTargetKind::SelfPort
                    }
                    "other" => {
                        self.get_token();
                        TransTargetKind::Other
                    }
                    _ => TransTargetKind::Named(self.get_string()?),
                };
                let kind = match self.get_token().as_str() {
                    "new" => TransKind::New,
                    "old" => TransKind::Old,
                    other => return Err(self.err(format!("expected `new` or `old`, got `{}`", other))),
                };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(WrTransDef { target, kind });
                    self.port.wrtrans.push(cap);
                }
            }
            "wrcs" => {
                if !self.port.kind.can_write() {
                    return Err(self.err("`wrcs` only allowed on write ports"));
                }
                let val = self.get_uint()?;
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(val);
                    self.port.wrcs.push(cap);
                }
            }
            "" => return Err(self.err("unexpected EOF while parsing port item")),
            other => return Err(self.err(format!("unknown port-level item `{}`", other))),
        }
        Ok(())
    }

    fn parse_ram_item(&mut self) -> Result<()> {
        let token = self.get_token();
        match token.as_str() {
            "ifdef" => self.parse_ifdef(true, Self::parse_ram_item)?,
            "ifndef" => self.parse_ifdef(false, Self::parse_ram_item)?,
            "option" => self.parse_option(Self::parse_ram_item)?,
            "dims" => {
                let abits = self.get_uint()?;
                let dbits = self.get_uint()?;
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(MemoryDimsDef { abits, dbits });
                    self.ram.dims.push(cap);
                }
            }
            "init" => {
                let kind = match self.get_token().as_str() {
                    "zero" => MemoryInitKind::Zero,
                    "any" => MemoryInitKind::Any,
                    "none" => MemoryInitKind::None,
                    other => return Err(self.err(format!("expected `zero`, `any`, or `none`, got `{}`", other))),
                };
                self.get_semi()?;
                if self.active {
                    let cap = self.cap(kind);
                    self.ram.init.push(cap);
                }
            }
            "style" => {
                loop {
                    let style = self.get_string()?;
                    if self.active {
                        let cap = self.cap(style);
                        self.ram.style.push(cap);
                    }
                    if !self.peek_string() {
                        break;
                    }
                }
                self.get_semi()?;
            }
            "port" => {
                let orig_line = self.lexer.line();
                self.port = PortGroupDef::default();
                self.port.kind = match self.get_token().as_str() {
                    "ar" => PortKind::Ar,
                    "sr" => PortKind::Sr,
                    "sw" => PortKind::Sw,
                    "arsw" => PortKind::Arsw,
                    "srsw" => PortKind::Srsw,
                    other => {
                        return Err(self.err(format!(
                            "expected `ar`, `sr`, `sw`, `arsw`, or `srsw`, got `{}`",
                            other
                        )))
                    }
                };
                loop {
                    let name = self.get_string()?;
                    self.port.names.push(name);
                    if !self.peek_string() {
                        break;
                    }
                }
                self.parse_block(Self::parse_port_item)?;
                if self.active {
                    // Add defaults for some capabilities.
                    if self.port.kind != PortKind::Ar && self.port.clock.is_empty() {
                        let cap = self.cap(ClockDef { kind: ClkPolKind::Anyedge, name: None });
                        self.port.clock.push(cap);
                    }
                    if self.port.width.is_empty() {
                        let cap = self.cap(1);
                        self.port.width.push(cap);
                    }
                    // Refuse to guess this one, there is no safe default.
                    if self.port.kind.read_is_sync() && self.port.rden.is_empty() {
                        return Err(self.err_at(orig_line, "`rden` capability should be specified"));
                    }
                    let port = std::mem::take(&mut self.port);
                    let cap = self.cap(port);
                    self.ram.ports.push(cap);
                }
            }
            "" => return Err(self.err("unexpected EOF while parsing ram item")),
            other => return Err(self.err(format!("unknown ram-level item `{}`", other))),
        }
        Ok(())
    }

    fn parse_top_item(&mut self) -> Result<()> {
        let token = self.get_token();
        match token.as_str() {
            "ifdef" => self.parse_ifdef(true, Self::parse_top_item)?,
            "ifndef" => self.parse_ifdef(false, Self::parse_top_item)?,
            "option" => self.parse_option(Self::parse_top_item)?,
            "ram" => {
                let orig_line = self.lexer.line();
                self.ram = RamDef::default();
                self.ram.kind = match self.get_token().as_str() {
                    "distributed" => RamKind::Distributed,
                    "block" => RamKind::Block,
                    "huge" => RamKind::Huge,
                    other => {
                        return Err(self.err(format!("expected `distributed`, `block`, or `huge`, got `{}`", other)))
                    }
                };
                self.ram.id = self.get_id()?;
                self.parse_block(Self::parse_ram_item)?;
                if self.active {
                    if self.ram.dims.is_empty() {
                        return Err(self.err_at(orig_line, "`dims` capability should be specified"));
                    }
                    if self.ram.ports.is_empty() {
                        return Err(self.err_at(orig_line, "at least one port group should be specified"));
                    }
                    // A named clock is either always anyedge or always
                    // pos/negedge across the whole definition.
                    let mut pnedge_clock = BTreeSet::new();
                    let mut anyedge_clock = BTreeSet::new();
                    for port in &self.ram.ports {
                        for def in &port.val.clock {
                            let Some(name) = &def.val.name else { continue };
                            if def.val.kind == ClkPolKind::Anyedge {
                                anyedge_clock.insert(name.clone());
                            } else {
                                pnedge_clock.insert(name.clone());
                            }
                        }
                    }
                    if let Some(name) = pnedge_clock.intersection(&anyedge_clock).next() {
                        return Err(self.err_at(
                            orig_line,
                            format!("named clock \"{}\" used with both posedge/negedge and anyedge clocks", name),
                        ));
                    }
                    self.lib.ram_defs.push(std::mem::take(&mut self.ram));
                }
            }
            "" => return Err(self.err("unexpected EOF while parsing top item")),
            other => return Err(self.err(format!("unknown top-level item `{}`", other))),
        }
        Ok(())
    }
}
