mod common;

use common::{library, wires, TableEngine};

use ramlib_libmap::MemMapping;
use ramlib_netlist::{Memory, MemoryReadPort, MemoryWritePort, ParamValue, SigBit, SigMap};

// One sync write port and one sync read port on the same clock, with the
// given transparency relation between them.
fn trans_memory(clk: SigBit, transparent: bool) -> Memory {
    let mut mem = Memory::new("$mem", 1024, 16);
    mem.write_ports.push(MemoryWritePort::clocked(wires(100, 10), 16, clk));
    let rport = MemoryReadPort::clocked(wires(300, 10), 16, clk);
    let rport = if transparent { rport.with_transparent_to(0) } else { rport };
    mem.read_ports.push(rport);
    mem
}

#[test]
fn test_transparency_without_capability_is_emulated() {
    // The write group has no wrtrans capability: the transparent pair
    // survives only through emulation.
    let lib = library(concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = trans_memory(clk, true);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert_eq!(cfgs[0].rd_ports[0].emu_trans, [0]);
}

#[test]
fn test_non_transparent_needs_old_capability() {
    // A non-transparent same-clock pair requires `wrtrans ... old`; there
    // is no emulation fallback for reads of old data.
    let text_without = concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; }\n",
        "}\n",
    );
    let text_with = concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; wrtrans \"R\" old; }\n",
        "}\n",
    );
    let clk = SigBit::from_wire(0);
    let mem = trans_memory(clk, false);
    let sigmap = SigMap::new();

    let lib_without = library(text_without);
    let mapping = MemMapping::new(&mem, &lib_without, &sigmap, TableEngine::new()).unwrap();
    assert!(mapping.configs().is_empty());

    let lib_with = library(text_with);
    let mapping = MemMapping::new(&mem, &lib_with, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].rd_ports[0].emu_trans.is_empty());
}

#[test]
fn test_transparent_with_new_capability_binds_free() {
    let lib = library(concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; wrtrans \"R\" new; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = trans_memory(clk, true);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    // The free capability suppresses the emulation clone.
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].rd_ports[0].emu_trans.is_empty());
}

#[test]
fn test_transparent_splitting_capability_also_emulates() {
    // The wrtrans capability needs a fresh option binding, so the engine
    // emits both the constrained clone and the emulation clone.
    let lib = library(concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; option \"WT\" 1 wrtrans \"R\" new; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = trans_memory(clk, true);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 2);
    // The constrained clone commits the option and needs no emulation.
    assert_eq!(cfgs[0].opts.get("WT"), Some(&ParamValue::Int(1)));
    assert!(cfgs[0].rd_ports[0].emu_trans.is_empty());
    // The emulation clone stays unconstrained.
    assert!(cfgs[1].opts.is_empty());
    assert_eq!(cfgs[1].rd_ports[0].emu_trans, [0]);
}

#[test]
fn test_transparency_self_capability_applies_to_shared_port() {
    let lib = library(concat!(
        "ram block $SP {\n",
        "    dims 10 16;\n",
        "    port srsw \"RW\" { clock anyedge \"C\"; rden any; wrtrans self new; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mut mem = Memory::new("$mem", 1024, 16);
    mem.write_ports.push(MemoryWritePort::clocked(wires(100, 10), 16, clk));
    mem.read_ports.push(MemoryReadPort::clocked(wires(100, 10), 16, clk).with_transparent_to(0));
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert_eq!(cfgs[0].rd_ports[0].wr_port, Some(0));
    assert!(cfgs[0].rd_ports[0].emu_trans.is_empty());
}

#[test]
fn test_transparency_on_emulated_register_is_free() {
    // A sync read port emulated on an async group absorbs transparency in
    // its soft output register.
    let lib = library(concat!(
        "ram distributed $LR {\n",
        "    dims 10 16;\n",
        "    port ar \"R\" width 16;\n",
        "    port sw \"W\" clock anyedge;\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = trans_memory(clk, true);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].rd_ports[0].emu_sync);
    assert_eq!(cfgs[0].rd_ports[0].emu_trans, [0]);
}

#[test]
fn test_collision_x_lifts_restriction() {
    // An undefined collision result means no transparency restriction at
    // all, even without any wrtrans capability.
    let lib = library(concat!(
        "ram block $BR {\n",
        "    dims 10 16;\n",
        "    port sr \"R\" { clock anyedge \"C\"; rden any; }\n",
        "    port sw \"W\" { clock anyedge \"C\"; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mut mem = Memory::new("$mem", 1024, 16);
    mem.write_ports.push(MemoryWritePort::clocked(wires(100, 10), 16, clk));
    mem.read_ports.push(MemoryReadPort::clocked(wires(300, 10), 16, clk).with_collision_x(0));
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].rd_ports[0].emu_trans.is_empty());
}

fn priority_memory(clk: SigBit) -> Memory {
    let mut mem = Memory::new("$mem", 1024, 16);
    mem.write_ports.push(MemoryWritePort::clocked(wires(100, 10), 16, clk));
    mem.write_ports.push(MemoryWritePort::clocked(wires(200, 10), 16, clk).with_priority_over(0));
    mem
}

#[test]
fn test_priority_without_capability_is_emulated() {
    let lib = library(concat!(
        "ram block $DP {\n",
        "    dims 10 16;\n",
        "    port sw \"A\" \"B\" { clock anyedge \"C\"; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = priority_memory(clk);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].wr_ports[0].emu_prio.is_empty());
    assert_eq!(cfgs[0].wr_ports[1].emu_prio, [0]);
}

#[test]
fn test_priority_with_capability_binds_free() {
    let lib = library(concat!(
        "ram block $DP {\n",
        "    dims 10 16;\n",
        "    port sw \"A\" \"B\" { clock anyedge \"C\"; wrprio \"A\"; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = priority_memory(clk);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 1);
    assert!(cfgs[0].wr_ports[1].emu_prio.is_empty());
}

#[test]
fn test_priority_splitting_capability_also_emulates() {
    let lib = library(concat!(
        "ram block $DP {\n",
        "    dims 10 16;\n",
        "    port sw \"A\" \"B\" { clock anyedge \"C\"; option \"PRIO\" 1 wrprio \"A\"; }\n",
        "}\n",
    ));
    let clk = SigBit::from_wire(0);
    let mem = priority_memory(clk);
    let sigmap = SigMap::new();
    let mapping = MemMapping::new(&mem, &lib, &sigmap, TableEngine::new()).unwrap();
    let cfgs = mapping.configs();
    assert_eq!(cfgs.len(), 2);
    assert_eq!(cfgs[0].opts.get("PRIO"), Some(&ParamValue::Int(1)));
    assert!(cfgs[0].wr_ports[1].emu_prio.is_empty());
    assert!(cfgs[1].opts.is_empty());
    assert_eq!(cfgs[1].wr_ports[1].emu_prio, [0]);
}
