// Concrete patch scenarios with literal byte sequences, plus boundary
// behaviors around sizes and malformed inputs.

use bpsdelta::bps::checksum::crc32;
use bpsdelta::bps::command::{Command, SOURCE_READ, write_op};
use bpsdelta::bps::decoder::{self, DecodeError, Patch, Warning};
use bpsdelta::bps::encoder::{EncodeOptions, create, create_with_options};
use bpsdelta::bps::header::PatchHeader;
use bpsdelta::search::Backend;

fn roundtrip(source: &[u8], target: &[u8], metadata: &str) -> Vec<u8> {
    let patch = create(source, target, metadata).expect("encode failed");
    let out = decoder::apply(source, &patch).expect("decode failed");
    assert_eq!(out.target, target, "decode mismatch");
    assert!(out.warnings.is_empty(), "warnings: {:?}", out.warnings);
    patch
}

fn commands(patch: &[u8]) -> Vec<Command<'_>> {
    Patch::parse(patch)
        .unwrap()
        .commands()
        .collect::<Result<_, _>>()
        .unwrap()
}

/// Deterministic pseudo-random bytes.
fn gen_data(size: usize, seed: u64) -> Vec<u8> {
    let mut s = seed;
    let mut out = Vec::with_capacity(size);
    for _ in 0..size {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        out.push((s >> 33) as u8);
    }
    out
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_one_letter_edit() {
    let patch = roundtrip(b"Hello World", b"Hello Warld", "");
    assert!(patch.len() <= 50, "patch is {} bytes", patch.len());
}

#[test]
fn scenario_repetition_is_one_overlapping_copy() {
    let patch = roundtrip(b"ABC", b"ABCABCABCABC", "");
    let cmds = commands(&patch);
    let copies: Vec<_> = cmds
        .iter()
        .filter(|c| matches!(c, Command::TargetCopy { .. }))
        .collect();
    assert_eq!(copies.len(), 1, "{cmds:?}");
    assert_eq!(copies[0], &Command::TargetCopy { length: 9, delta: 0 });
}

#[test]
fn scenario_incompressible_target_is_a_literal_run() {
    let source = vec![0u8; 1000];
    let target: Vec<u8> = (0..1000u32).map(|i| (i % 256) as u8).collect();
    let patch = roundtrip(&source, &target, "");
    let cmds = commands(&patch);
    assert!(
        matches!(cmds[0], Command::TargetRead { .. }),
        "first command should be a literal run: {cmds:?}"
    );
    // 256 literal bytes, then the period-256 tail copies itself.
    assert!(patch.len() < 320, "patch is {} bytes", patch.len());
}

#[test]
fn scenario_single_byte_change_in_large_input() {
    let mut source = gen_data(8192, 42);
    source[100] = 1;
    let mut target = source.clone();
    target[100] = 2;
    let patch = roundtrip(&source, &target, "");
    assert!(patch.len() <= 200, "patch is {} bytes", patch.len());
}

#[test]
fn scenario_identical_inputs() {
    let data = gen_data(1000, 7);
    let patch = roundtrip(&data, &data, "");
    assert!(patch.len() <= 40, "patch is {} bytes", patch.len());
    assert_eq!(commands(&patch), vec![Command::SourceRead { length: 1000 }]);
}

#[test]
fn scenario_wrong_source_warns_but_decodes() {
    let source = gen_data(512, 1);
    let target = gen_data(512, 2);
    let patch = create(&source, &target, "").unwrap();

    let mut other = source.clone();
    other[17] ^= 0x80;
    let out = decoder::apply(&other, &patch).expect("decode must not fail");
    assert!(
        out.warnings
            .iter()
            .any(|w| matches!(w, Warning::SourceCrcMismatch { .. })),
        "warnings: {:?}",
        out.warnings
    );
}

// ---------------------------------------------------------------------------
// Boundary behaviors
// ---------------------------------------------------------------------------

#[test]
fn single_byte_inputs_produce_small_patches() {
    for (s, t) in [(&b"a"[..], &b"a"[..]), (b"a", b"b")] {
        let patch = roundtrip(s, t, "");
        assert!(patch.len() < 100, "patch is {} bytes", patch.len());
    }
}

#[test]
fn sizes_around_simd_vector_widths() {
    for len in [15usize, 16, 17, 31, 32, 33, 63, 64, 65, 127, 128, 129] {
        let source: Vec<u8> = (0..len as u32).map(|i| (i % 251) as u8).collect();
        let mut target = source.clone();
        *target.last_mut().unwrap() ^= 0xFF;
        roundtrip(&source, &target, "");
        roundtrip(&source, &source, "");
    }
}

#[test]
fn source_read_past_source_end_is_rejected() {
    let source = b"abcd";
    let header = PatchHeader {
        source_size: source.len(),
        target_size: 8,
        metadata: Vec::new(),
    };
    let mut patch = Vec::new();
    header.encode(&mut patch).unwrap();
    write_op(&mut patch, SOURCE_READ, 8).unwrap(); // past the 4-byte source
    patch.extend_from_slice(&crc32(source).to_le_bytes());
    patch.extend_from_slice(&crc32(b"").to_le_bytes());
    let self_crc = crc32(&patch);
    patch.extend_from_slice(&self_crc.to_le_bytes());

    assert_eq!(
        decoder::apply(source, &patch).unwrap_err(),
        DecodeError::Truncated
    );
}

#[test]
fn multibyte_metadata_is_preserved() {
    let metadata = "パッチ v2 — größer & better 🎉";
    let patch = roundtrip(b"old data here", b"new data here", metadata);
    let parsed = Patch::parse(&patch).unwrap();
    assert_eq!(parsed.header.metadata, metadata.as_bytes());
}

#[test]
fn all_backends_agree_on_decoded_output() {
    let source = gen_data(4096, 99);
    let mut target = source.clone();
    target[10] ^= 1;
    target[2000] ^= 2;
    target.extend_from_slice(&source[100..400]);

    for backend in [Backend::Linear, Backend::RollingHash, Backend::SuffixArray] {
        let patch = create_with_options(
            &source,
            &target,
            "",
            &EncodeOptions {
                backend: Some(backend),
            },
        )
        .unwrap();
        let out = decoder::apply(&source, &patch).unwrap();
        assert_eq!(out.target, target, "{backend:?}");
        assert!(out.warnings.is_empty(), "{backend:?}");
    }
}
