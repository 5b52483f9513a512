#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexSet;
use ramlib_libmap::Library;
use ramlib_netlist::{SatEngine, SigBit};

pub fn library(text: &str) -> Library {
    let mut lib = Library::new(IndexSet::new());
    lib.parse_str("<test>", text).unwrap();
    lib
}

pub fn library_with_defines(text: &str, defines: &[&str]) -> Library {
    let mut lib = Library::new(IndexSet::from_iter(defines.iter().map(|&define| define.to_owned())));
    lib.parse_str("<test>", text).unwrap();
    lib
}

/// A vector of `len` fresh wire bits starting at `start`.
pub fn wires(start: usize, len: usize) -> ramlib_netlist::SigSpec {
    ramlib_netlist::SigSpec::from_iter((start..start + len).map(SigBit::from_wire))
}

/// A Boolean expression over signal bits, evaluated by brute force. Stands
/// in for the host's cone-importing solver.
#[derive(Clone, Debug)]
pub enum Expr {
    Const(bool),
    Var(SigBit),
    Not(Box<Expr>),
    Or(Vec<Expr>),
    And(Vec<Expr>),
}

impl Expr {
    fn vars(&self, into: &mut BTreeSet<SigBit>) {
        match self {
            Expr::Const(_) => (),
            Expr::Var(bit) => {
                into.insert(*bit);
            }
            Expr::Not(arg) => arg.vars(into),
            Expr::Or(args) | Expr::And(args) => {
                for arg in args {
                    arg.vars(into);
                }
            }
        }
    }

    fn eval(&self, assignment: &BTreeMap<SigBit, bool>) -> bool {
        match self {
            Expr::Const(value) => *value,
            Expr::Var(bit) => assignment[bit],
            Expr::Not(arg) => !arg.eval(assignment),
            Expr::Or(args) => args.iter().any(|arg| arg.eval(assignment)),
            Expr::And(args) => args.iter().all(|arg| arg.eval(assignment)),
        }
    }
}

/// Test engine: each signal bit is either a free variable or scripted to an
/// expression over other bits via [`TableEngine::define`].
pub struct TableEngine {
    defs: BTreeMap<SigBit, Expr>,
}

impl TableEngine {
    pub fn new() -> Self {
        TableEngine { defs: BTreeMap::new() }
    }

    pub fn define(mut self, bit: SigBit, expr: Expr) -> Self {
        self.defs.insert(bit, expr);
        self
    }
}

impl SatEngine for TableEngine {
    type Lit = Expr;

    fn import_bit(&mut self, bit: SigBit) -> Expr {
        if let Some(expr) = self.defs.get(&bit) {
            return expr.clone();
        }
        if bit == SigBit::ZERO {
            Expr::Const(false)
        } else if bit == SigBit::ONE {
            Expr::Const(true)
        } else {
            Expr::Var(bit)
        }
    }

    fn build_or(&mut self, lits: Vec<Expr>) -> Expr {
        Expr::Or(lits)
    }

    fn build_not(&mut self, lit: Expr) -> Expr {
        Expr::Not(Box::new(lit))
    }

    fn solve(&mut self, assumptions: &[Expr]) -> bool {
        let query = Expr::And(assumptions.to_vec());
        let mut vars = BTreeSet::new();
        query.vars(&mut vars);
        let vars = Vec::from_iter(vars);
        assert!(vars.len() <= 16, "too many free variables for brute force");
        (0..1u32 << vars.len()).any(|choice| {
            let assignment =
                BTreeMap::from_iter(vars.iter().enumerate().map(|(pos, &bit)| (bit, (choice >> pos) & 1 != 0)));
            query.eval(&assignment)
        })
    }
}
