use std::collections::BTreeMap;

use ramlib_netlist::ParamValue;

/// Scoped option bindings: names to values, ordered for deterministic
/// iteration. Used both for RAM-global options and port-local options.
pub type Options = BTreeMap<String, ParamValue>;

/// Merges `src` into `dst`. Absent keys are inserted; present-and-equal keys
/// are kept; a present-and-unequal key fails the merge, leaving `dst` with
/// the bindings merged so far. Callers merge into a clone and drop it on
/// failure.
pub fn apply_options(dst: &mut Options, src: &Options) -> bool {
    for (name, value) in src {
        match dst.get(name) {
            None => {
                dst.insert(name.clone(), value.clone());
            }
            Some(present) if present == value => (),
            Some(_) => return false,
        }
    }
    true
}

/// Returns true iff every binding in `src` is already present and equal in
/// `dst`. Never mutates.
pub fn options_applied(dst: &Options, src: &Options) -> bool {
    src.iter().all(|(name, value)| dst.get(name) == Some(value))
}
