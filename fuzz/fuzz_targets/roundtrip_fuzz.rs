#![no_main]
use bpsdelta::bps::decoder;
use bpsdelta::bps::encoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // Use first byte as control flags.
    let flags = data[0];
    let payload = &data[1..];
    let use_source = flags & 1 != 0;

    // Split payload into "source" and "target".
    let split = payload.len() / 2;
    let (source, target) = if use_source && split > 0 {
        (&payload[..split], &payload[split..])
    } else {
        (&[] as &[u8], payload)
    };

    if target.is_empty() {
        return;
    }

    let patch = encoder::create(source, target, "").unwrap();
    let out = decoder::apply(source, &patch).unwrap();
    assert_eq!(out.target, target);
    assert!(out.warnings.is_empty());
});
