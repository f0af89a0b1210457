#![no_main]
use bpsdelta::bps::decoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a patch. The decoder must never panic — only
    // return errors, or a target plus warnings.
    let _ = decoder::apply(&[], data);

    // Also with a non-empty source.
    if data.len() >= 2 {
        let split = data.len() / 2;
        let (source, patch) = data.split_at(split);
        let _ = decoder::apply(source, patch);
    }
});
