// BPS patch creation.
//
// Single pass, left to right over the target. At each output position
// the encoder evaluates three copy candidates in order (SourceRead,
// SourceCopy, TargetCopy) and keeps the longest; the order settles ties
// in favor of the cheaper command (a SourceRead pays no offset bytes).
// Positions no copy can cover accumulate into a pending literal run
// that is flushed as one TargetRead before the next copy command.
//
// All scratch state (search indexes, the pending run) is owned by the
// current call; nothing survives between encodes.

use crate::search::{
    Backend, LinearSearch, RollingSearch, SubstringSearch, SuffixSearch, lcp,
};

use super::checksum::crc32;
use super::command::{self, SOURCE_COPY, SOURCE_READ, TARGET_COPY, TARGET_READ};
use super::header::{MAX_INPUT_SIZE, PatchHeader, TRAILER_LEN};
use super::varint;

/// Shortest copy worth a command. A copy costs an opcode varint plus an
/// offset varint; below four matched bytes a literal is cheaper.
pub const MIN_MATCH_LENGTH: usize = 4;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Configuration for patch creation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeOptions {
    /// Substring-search backend. `None` picks one from the source size.
    pub backend: Option<Backend>,
}

// ---------------------------------------------------------------------------
// Encoder error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// The target is empty. Zero-length sources are fine; zero-length
    /// targets are rejected.
    EmptyTarget,
    /// An input exceeds the 2^31-1 byte limit.
    SizeOverflow,
}

impl std::fmt::Display for EncodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTarget => write!(f, "cannot encode an empty target"),
            Self::SizeOverflow => write!(f, "input exceeds the 2^31-1 byte limit"),
        }
    }
}

impl std::error::Error for EncodeError {}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// Create a patch that rebuilds `target` from `source`.
///
/// `metadata` is stored verbatim in the header (UTF-8, may be empty).
pub fn create(source: &[u8], target: &[u8], metadata: &str) -> Result<Vec<u8>, EncodeError> {
    create_with_options(source, target, metadata, &EncodeOptions::default())
}

/// Create a patch with an explicit backend choice.
pub fn create_with_options(
    source: &[u8],
    target: &[u8],
    metadata: &str,
    opts: &EncodeOptions,
) -> Result<Vec<u8>, EncodeError> {
    if target.is_empty() {
        return Err(EncodeError::EmptyTarget);
    }
    if source.len() > MAX_INPUT_SIZE || target.len() > MAX_INPUT_SIZE {
        return Err(EncodeError::SizeOverflow);
    }

    let backend = opts.backend.unwrap_or_else(|| Backend::auto(source.len()));
    let patch = match backend {
        Backend::Linear => run(source, target, metadata, LinearSearch::new(source)),
        Backend::RollingHash => run(source, target, metadata, RollingSearch::new(source)),
        Backend::SuffixArray => run(source, target, metadata, SuffixSearch::new(source)),
    };
    Ok(patch)
}

// ---------------------------------------------------------------------------
// Greedy encode loop
// ---------------------------------------------------------------------------

/// The action chosen for one output position.
enum Run {
    Literal,
    SourceRead { len: usize },
    SourceCopy { len: usize, start: usize },
    TargetCopy { len: usize, start: usize },
}

fn run<S: SubstringSearch>(
    source: &[u8],
    target: &[u8],
    metadata: &str,
    mut search: S,
) -> Vec<u8> {
    let header = PatchHeader {
        source_size: source.len(),
        target_size: target.len(),
        metadata: metadata.as_bytes().to_vec(),
    };
    let mut out = Vec::with_capacity(header.encoded_len() + TRAILER_LEN + target.len() / 4);
    header.encode(&mut out).unwrap();

    let mut stream = CommandStream::new(out, target);
    let mut pos = 0usize;
    while pos < target.len() {
        match next_run(source, target, pos, &mut search) {
            Run::Literal => {
                stream.push_literal(pos);
                pos += 1;
            }
            Run::SourceRead { len } => {
                stream.source_read(len);
                pos += len;
            }
            Run::SourceCopy { len, start } => {
                stream.source_copy(len, start);
                pos += len;
            }
            Run::TargetCopy { len, start } => {
                stream.target_copy(len, start);
                pos += len;
            }
        }
    }

    stream.finish(source)
}

/// Pick the best action covering `target[pos..]`.
fn next_run<S: SubstringSearch>(
    source: &[u8],
    target: &[u8],
    pos: usize,
    search: &mut S,
) -> Run {
    let needle = &target[pos..];
    let mut best_len = MIN_MATCH_LENGTH - 1;
    let mut best = Run::Literal;

    if pos < source.len() {
        let (len, _) = lcp::common_prefix(&source[pos..], needle);
        if len > best_len {
            if len == needle.len() {
                // Reaches the end of the target; nothing can beat it.
                return Run::SourceRead { len };
            }
            best_len = len;
            best = Run::SourceRead { len };
        }
    }

    if let Some(f) = search.find_in_source(needle, best_len) {
        best_len = f.len;
        best = Run::SourceCopy {
            len: f.len,
            start: f.start,
        };
    }

    if let Some(f) = search.find_in_target(target, pos, best_len) {
        best = Run::TargetCopy {
            len: f.len,
            start: f.start,
        };
    }

    best
}

// ---------------------------------------------------------------------------
// Command stream builder
// ---------------------------------------------------------------------------

/// Accumulates commands into the patch body, coalescing literal runs
/// and tracking the two copy cursors for delta emission.
struct CommandStream<'a> {
    out: Vec<u8>,
    target: &'a [u8],
    literal_start: usize,
    literal_len: usize,
    source_cursor: i64,
    target_cursor: i64,
}

impl<'a> CommandStream<'a> {
    fn new(out: Vec<u8>, target: &'a [u8]) -> Self {
        Self {
            out,
            target,
            literal_start: 0,
            literal_len: 0,
            source_cursor: 0,
            target_cursor: 0,
        }
    }

    /// Extend the pending literal run by the byte at `pos`.
    fn push_literal(&mut self, pos: usize) {
        if self.literal_len == 0 {
            self.literal_start = pos;
        }
        self.literal_len += 1;
    }

    /// Emit the pending run as one TargetRead.
    fn flush_literals(&mut self) {
        if self.literal_len == 0 {
            return;
        }
        command::write_op(&mut self.out, TARGET_READ, self.literal_len).unwrap();
        self.out
            .extend_from_slice(&self.target[self.literal_start..self.literal_start + self.literal_len]);
        self.literal_len = 0;
    }

    fn source_read(&mut self, len: usize) {
        self.flush_literals();
        command::write_op(&mut self.out, SOURCE_READ, len).unwrap();
    }

    fn source_copy(&mut self, len: usize, start: usize) {
        self.flush_literals();
        command::write_op(&mut self.out, SOURCE_COPY, len).unwrap();
        varint::write_i64(&mut self.out, start as i64 - self.source_cursor).unwrap();
        self.source_cursor = (start + len) as i64;
    }

    fn target_copy(&mut self, len: usize, start: usize) {
        self.flush_literals();
        command::write_op(&mut self.out, TARGET_COPY, len).unwrap();
        varint::write_i64(&mut self.out, start as i64 - self.target_cursor).unwrap();
        self.target_cursor = (start + len) as i64;
    }

    /// Flush and append the trailer: source CRC, target CRC, then the
    /// CRC of everything written so far.
    fn finish(mut self, source: &[u8]) -> Vec<u8> {
        self.flush_literals();
        let mut out = self.out;
        out.extend_from_slice(&crc32(source).to_le_bytes());
        out.extend_from_slice(&crc32(self.target).to_le_bytes());
        let patch_crc = crc32(&out);
        out.extend_from_slice(&patch_crc.to_le_bytes());
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bps::checksum::PATCH_SELF_CRC;
    use crate::bps::command::Command;
    use crate::bps::decoder::{self, Patch};

    fn roundtrip(source: &[u8], target: &[u8]) -> Vec<u8> {
        let patch = create(source, target, "").expect("encode failed");
        let out = decoder::apply(source, &patch).expect("decode failed");
        assert_eq!(out.target, target, "roundtrip mismatch");
        assert!(out.warnings.is_empty(), "unexpected {:?}", out.warnings);
        patch
    }

    fn commands(patch: &[u8]) -> Vec<Command<'_>> {
        Patch::parse(patch)
            .unwrap()
            .commands()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn identity_is_one_source_read() {
        let data = b"The quick brown fox jumps over the lazy dog.";
        let patch = roundtrip(data, data);
        assert_eq!(
            commands(&patch),
            vec![Command::SourceRead { length: data.len() }]
        );
    }

    #[test]
    fn small_edit_keeps_patch_small() {
        let source = b"Hello, world! This is a test of the delta encoder.";
        let target = b"Hello, earth! This is a test of the delta encoder.";
        let patch = roundtrip(source, target);
        assert!(patch.len() < 60, "patch {} bytes", patch.len());
    }

    #[test]
    fn all_new_target_is_one_literal_run() {
        let target = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
        let patch = roundtrip(b"", target);
        let cmds = commands(&patch);
        assert_eq!(cmds, vec![Command::TargetRead { data: target }]);
    }

    #[test]
    fn repetition_becomes_overlapping_target_copy() {
        let patch = roundtrip(b"ABC", b"ABCABCABCABC");
        let cmds = commands(&patch);
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0], Command::TargetRead { data: b"ABC" });
        assert_eq!(
            cmds[1],
            Command::TargetCopy {
                length: 9,
                delta: 0
            }
        );
    }

    #[test]
    fn moved_block_uses_source_copy() {
        let source = b"0123456789abcdefghij";
        let target = b"abcdefghij0123456789";
        let patch = roundtrip(source, target);
        let cmds = commands(&patch);
        assert!(
            cmds.iter()
                .all(|c| matches!(c, Command::SourceCopy { .. })),
            "{cmds:?}"
        );
    }

    #[test]
    fn rejects_empty_target() {
        assert_eq!(create(b"abc", b"", ""), Err(EncodeError::EmptyTarget));
    }

    #[test]
    fn metadata_is_preserved() {
        let meta = "{\"title\":\"déjà vu\",\"v\":1}";
        let patch = create(b"aaaa", b"bbbb", meta).unwrap();
        let parsed = Patch::parse(&patch).unwrap();
        assert_eq!(parsed.header.metadata, meta.as_bytes());
    }

    #[test]
    fn every_patch_passes_its_self_check() {
        for (s, t) in [
            (&b"abc"[..], &b"abcd"[..]),
            (b"", b"x"),
            (b"same", b"same"),
            (b"aaaaaaaa", b"bbbbbbbb"),
        ] {
            let patch = create(s, t, "meta").unwrap();
            assert_eq!(crc32(&patch), PATCH_SELF_CRC);
        }
    }

    #[test]
    fn backends_roundtrip_identically_sized_inputs() {
        let source: Vec<u8> = (0..2048u32).map(|i| (i % 251) as u8).collect();
        let mut target = source.clone();
        target[100] ^= 0xFF;
        target[1500] ^= 0x0F;
        target.extend_from_slice(b"tail data");

        for backend in [Backend::Linear, Backend::RollingHash, Backend::SuffixArray] {
            let opts = EncodeOptions {
                backend: Some(backend),
            };
            let patch = create_with_options(&source, &target, "", &opts).unwrap();
            let out = decoder::apply(&source, &patch).unwrap();
            assert_eq!(out.target, target, "{backend:?}");
            assert!(out.warnings.is_empty(), "{backend:?}");
        }
    }

    #[test]
    fn single_byte_inputs() {
        let patch = roundtrip(b"a", b"a");
        assert!(patch.len() < 100);
        let patch = roundtrip(b"a", b"b");
        assert!(patch.len() < 100);
    }
}
