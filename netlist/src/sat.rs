use crate::SigBit;

/// An opaque satisfiability engine over the netlist cone feeding the signals
/// of interest. Importing a bit pulls in whatever combinational logic drives
/// it; how that happens is entirely the engine's business.
pub trait SatEngine {
    type Lit: Clone;

    /// Returns a literal constrained to the value of `bit`, importing the
    /// cone of logic driving it.
    fn import_bit(&mut self, bit: SigBit) -> Self::Lit;

    fn build_or(&mut self, lits: Vec<Self::Lit>) -> Self::Lit;

    fn build_not(&mut self, lit: Self::Lit) -> Self::Lit;

    /// Returns true iff the imported cone admits an assignment making every
    /// literal in `assumptions` true.
    fn solve(&mut self, assumptions: &[Self::Lit]) -> bool;
}
