mod common;

use std::cell::Cell;
use std::rc::Rc;

use common::{wires, Expr, TableEngine};

use ramlib_libmap::EnableSat;
use ramlib_netlist::{Memory, MemoryReadPort, MemoryWritePort, SatEngine, SigBit, SigSpec};

struct CountingEngine {
    inner: TableEngine,
    solves: Rc<Cell<usize>>,
}

impl SatEngine for CountingEngine {
    type Lit = Expr;

    fn import_bit(&mut self, bit: SigBit) -> Expr {
        self.inner.import_bit(bit)
    }

    fn build_or(&mut self, lits: Vec<Expr>) -> Expr {
        self.inner.build_or(lits)
    }

    fn build_not(&mut self, lit: Expr) -> Expr {
        self.inner.build_not(lit)
    }

    fn solve(&mut self, assumptions: &[Expr]) -> bool {
        self.solves.set(self.solves.get() + 1);
        self.inner.solve(assumptions)
    }
}

// One write port whose enable is the free signal `w`, and two read ports:
// the first enabled by `w` itself, the second by its negation.
fn enable_memory(wr_en: SigBit, rd_en_same: SigBit, rd_en_opposite: SigBit) -> Memory {
    let mut mem = Memory::new("$mem", 16, 4);
    mem.write_ports
        .push(MemoryWritePort::clocked(wires(100, 4), 4, SigBit::from_wire(0)).with_en(SigSpec::from(vec![wr_en; 4])));
    mem.read_ports.push(MemoryReadPort::clocked(wires(200, 4), 4, SigBit::from_wire(0)).with_en(rd_en_same));
    mem.read_ports.push(MemoryReadPort::clocked(wires(300, 4), 4, SigBit::from_wire(0)).with_en(rd_en_opposite));
    mem
}

#[test]
fn test_implies_and_excludes() {
    let wr_en = SigBit::from_wire(1);
    let rd_en_same = wr_en;
    let rd_en_opposite = SigBit::from_wire(2);
    let engine = TableEngine::new().define(rd_en_opposite, Expr::Not(Box::new(Expr::Var(wr_en))));
    let mem = enable_memory(wr_en, rd_en_same, rd_en_opposite);
    let mut sat = EnableSat::new(engine);

    // Writing implies reading on port 0, and the write enable is
    // satisfiable, so writing cannot also exclude reading there.
    assert!(sat.wr_implies_rd(&mem, 0, 0));
    assert!(!sat.wr_excludes_rd(&mem, 0, 0));

    // Port 1 is enabled exactly when the write port is not.
    assert!(!sat.wr_implies_rd(&mem, 0, 1));
    assert!(sat.wr_excludes_rd(&mem, 0, 1));
}

#[test]
fn test_queries_are_cached() {
    let wr_en = SigBit::from_wire(1);
    let rd_en = SigBit::from_wire(2);
    let solves = Rc::new(Cell::new(0));
    let engine = CountingEngine { inner: TableEngine::new(), solves: solves.clone() };
    let mem = enable_memory(wr_en, wr_en, rd_en);
    let mut sat = EnableSat::new(engine);

    assert!(sat.wr_implies_rd(&mem, 0, 0));
    assert!(sat.wr_implies_rd(&mem, 0, 0));
    assert!(sat.wr_implies_rd(&mem, 0, 0));
    assert_eq!(solves.get(), 1);

    assert!(!sat.wr_excludes_rd(&mem, 0, 0));
    assert!(!sat.wr_excludes_rd(&mem, 0, 0));
    assert_eq!(solves.get(), 2);

    // A different port pair solves again.
    sat.wr_implies_rd(&mem, 0, 1);
    sat.wr_implies_rd(&mem, 0, 1);
    assert_eq!(solves.get(), 3);
}

#[test]
fn test_constant_enables() {
    // A constant-zero write enable is unsatisfiable, so it both implies
    // and excludes any read enable.
    let mut mem = Memory::new("$mem", 16, 4);
    mem.write_ports.push(
        MemoryWritePort::clocked(wires(100, 4), 4, SigBit::from_wire(0)).with_en(SigSpec::zero(4)),
    );
    mem.read_ports
        .push(MemoryReadPort::clocked(wires(200, 4), 4, SigBit::from_wire(0)).with_en(SigBit::from_wire(5)));
    let mut sat = EnableSat::new(TableEngine::new());
    assert!(sat.wr_implies_rd(&mem, 0, 0));
    assert!(sat.wr_excludes_rd(&mem, 0, 0));
}
