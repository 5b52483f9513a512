use std::collections::BTreeMap;

use ramlib_netlist::{Memory, SatEngine};

/// Cached write-enable/read-enable queries against the host's SAT engine.
/// One instance is scoped to one memory's mapping; the queries are
/// expensive, so each (write port, read port) pair is solved at most once,
/// and the OR over a write port's enable bits is built at most once.
pub struct EnableSat<E: SatEngine> {
    engine: E,
    wr_en_cache: BTreeMap<usize, E::Lit>,
    wr_implies_rd_cache: BTreeMap<(usize, usize), bool>,
    wr_excludes_rd_cache: BTreeMap<(usize, usize), bool>,
}

impl<E: SatEngine> EnableSat<E> {
    pub fn new(engine: E) -> Self {
        EnableSat {
            engine,
            wr_en_cache: BTreeMap::new(),
            wr_implies_rd_cache: BTreeMap::new(),
            wr_excludes_rd_cache: BTreeMap::new(),
        }
    }

    fn wr_en(&mut self, mem: &Memory, wpidx: usize) -> E::Lit {
        if let Some(lit) = self.wr_en_cache.get(&wpidx) {
            return lit.clone();
        }
        let bits = mem.write_ports[wpidx].en.iter().map(|bit| self.engine.import_bit(bit)).collect();
        let lit = self.engine.build_or(bits);
        self.wr_en_cache.insert(wpidx, lit.clone());
        lit
    }

    /// True iff no assignment makes any bit of write port `wpidx`'s enable
    /// true while read port `rpidx`'s enable is false.
    pub fn wr_implies_rd(&mut self, mem: &Memory, wpidx: usize, rpidx: usize) -> bool {
        if let Some(&res) = self.wr_implies_rd_cache.get(&(wpidx, rpidx)) {
            return res;
        }
        let wr_en = self.wr_en(mem, wpidx);
        let rd_en = self.engine.import_bit(mem.read_ports[rpidx].en);
        let rd_en_false = self.engine.build_not(rd_en);
        let res = !self.engine.solve(&[wr_en, rd_en_false]);
        self.wr_implies_rd_cache.insert((wpidx, rpidx), res);
        res
    }

    /// True iff no assignment makes any bit of write port `wpidx`'s enable
    /// true while read port `rpidx`'s enable is also true.
    pub fn wr_excludes_rd(&mut self, mem: &Memory, wpidx: usize, rpidx: usize) -> bool {
        if let Some(&res) = self.wr_excludes_rd_cache.get(&(wpidx, rpidx)) {
            return res;
        }
        let wr_en = self.wr_en(mem, wpidx);
        let rd_en = self.engine.import_bit(mem.read_ports[rpidx].en);
        let res = !self.engine.solve(&[wr_en, rd_en]);
        self.wr_excludes_rd_cache.insert((wpidx, rpidx), res);
        res
    }
}
