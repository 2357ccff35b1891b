#![no_main]
use gopolis_core::driver::Simulation;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must produce an error, never a panic.
    let _ = Simulation::deserialize(data);
});
