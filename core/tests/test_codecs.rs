#[cfg(test)]
mod codec_tests {
    use std::io::{Read, Write};
    use flate2::read::{DeflateDecoder, ZlibDecoder};
    use flate2::write::{DeflateEncoder, ZlibEncoder};
    use flate2::{Compression, Decompress, FlushDecompress};

    use codec_stream_core::buffer::OutputBuffer;
    use codec_stream_core::codec::{create_adapter, resolve, CodecKind, FlushMode};
    use codec_stream_core::constants::codec_codes;
    use codec_stream_core::stream::{StreamMachine, StreamState};
    use codec_stream_core::types::{Status, StreamError};

    fn sample(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8 ^ (i / 7) as u8).collect()
    }

    fn open(kind: CodecKind, level: Option<i32>) -> StreamMachine {
        let mut m = StreamMachine::new(create_adapter(kind, level));
        m.init().unwrap();
        m
    }

    /// Feed `input` in `chunk`-sized writes, then close; returns all output.
    fn run(kind: CodecKind, input: &[u8], chunk: usize) -> (Vec<u8>, StreamState) {
        let mut m = open(kind, None);
        let mut collected = Vec::new();
        for piece in input.chunks(chunk.max(1)) {
            let mut out = OutputBuffer::new();
            let status = m.write(piece, FlushMode::None, &mut out).unwrap();
            collected.extend_from_slice(out.as_slice());
            if status == Status::EndOfStream {
                break;
            }
        }
        let mut out = OutputBuffer::new();
        m.close(&mut out).unwrap();
        collected.extend_from_slice(out.as_slice());
        (collected, m.state())
    }

    #[test]
    fn registry_names() {
        assert_eq!(resolve(CodecKind::Deflate).name, "deflate");
        assert_eq!(resolve(CodecKind::ZstdDecompress).name, "unzstd");
        assert_eq!(CodecKind::InflateRaw.to_string(), "inflate-raw");
        assert!(resolve(CodecKind::ZstdCompress).compresses);
        assert!(!resolve(CodecKind::Identity).compresses);
    }

    #[test]
    fn deflate_output_matches_reference_decoder() -> anyhow::Result<()> {
        let input = sample(100_000);
        let (compressed, state) = run(CodecKind::Deflate, &input, 4096);
        assert_eq!(state, StreamState::Destroyed);
        assert!(compressed.len() < input.len());

        let mut plain = Vec::new();
        ZlibDecoder::new(&compressed[..]).read_to_end(&mut plain)?;
        assert_eq!(plain, input);
        Ok(())
    }

    #[test]
    fn raw_deflate_output_matches_reference_decoder() {
        let input = sample(20_000);
        let (compressed, _) = run(CodecKind::DeflateRaw, &input, 333);

        let mut plain = Vec::new();
        DeflateDecoder::new(&compressed[..]).read_to_end(&mut plain).unwrap();
        assert_eq!(plain, input);
    }

    #[test]
    fn inflate_decodes_reference_stream() {
        let input = sample(50_000);
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::best());
        enc.write_all(&input).unwrap();
        let compressed = enc.finish().unwrap();

        let (plain, state) = run(CodecKind::Inflate, &compressed, 97);
        assert_eq!(plain, input);
        assert_eq!(state, StreamState::Destroyed);
    }

    #[test]
    fn raw_inflate_decodes_reference_stream() {
        let input = sample(10_000);
        let mut enc = DeflateEncoder::new(Vec::new(), Compression::fast());
        enc.write_all(&input).unwrap();
        let compressed = enc.finish().unwrap();

        let (plain, _) = run(CodecKind::InflateRaw, &compressed, 1024);
        assert_eq!(plain, input);
    }

    #[test]
    fn inflate_reports_end_of_stream_on_last_write() {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(b"short payload").unwrap();
        let compressed = enc.finish().unwrap();

        let mut m = open(CodecKind::Inflate, None);
        let mut out = OutputBuffer::new();
        assert_eq!(m.write(&compressed, FlushMode::None, &mut out), Ok(Status::EndOfStream));
        assert_eq!(out.as_slice(), b"short payload");
        assert_eq!(m.state(), StreamState::Eos);
    }

    #[test]
    fn inflate_rejects_garbage() {
        let mut m = open(CodecKind::Inflate, None);
        let mut out = OutputBuffer::new();
        let err = m.write(b"definitely not zlib", FlushMode::None, &mut out).unwrap_err();
        assert!(matches!(err, StreamError::Codec { code: codec_codes::DATA_ERROR, .. }));
        assert_eq!(m.state(), StreamState::Error);
    }

    #[test]
    fn closing_truncated_inflate_reports_error_and_destroys() {
        let input = sample(10_000);
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(&input).unwrap();
        let compressed = enc.finish().unwrap();

        let mut m = open(CodecKind::Inflate, None);
        let mut out = OutputBuffer::new();
        m.write(&compressed[..compressed.len() / 2], FlushMode::None, &mut out).unwrap();

        let mut tail = OutputBuffer::new();
        assert!(matches!(m.close(&mut tail), Err(StreamError::Codec { .. })));
        assert_eq!(m.state(), StreamState::Destroyed);
    }

    #[test]
    fn sync_flush_makes_prefix_decodable() {
        let mut m = open(CodecKind::Deflate, None);
        let mut out = OutputBuffer::new();
        m.write(b"first half, ", FlushMode::Sync, &mut out).unwrap();

        let mut d = Decompress::new(true);
        let mut plain = Vec::with_capacity(256);
        d.decompress_vec(out.as_slice(), &mut plain, FlushDecompress::Sync).unwrap();
        assert_eq!(plain, b"first half, ");
    }

    #[test]
    fn invalid_levels_fail_init() {
        let mut m = StreamMachine::new(create_adapter(CodecKind::Deflate, Some(11)));
        assert!(matches!(m.init(), Err(StreamError::Init { .. })));

        let mut m = StreamMachine::new(create_adapter(CodecKind::ZstdCompress, Some(1_000)));
        assert!(matches!(m.init(), Err(StreamError::Init { codec: "zstd", .. })));
    }

    #[test]
    fn zstd_output_matches_reference_decoder() {
        let input = sample(200_000);
        let (compressed, state) = run(CodecKind::ZstdCompress, &input, 8192);
        assert_eq!(state, StreamState::Destroyed);

        let plain = zstd::decode_all(&compressed[..]).unwrap();
        assert_eq!(plain, input);
    }

    #[test]
    fn unzstd_decodes_reference_frame() -> anyhow::Result<()> {
        let input = sample(64_000);
        let compressed = zstd::encode_all(&input[..], 5)?;

        let (plain, state) = run(CodecKind::ZstdDecompress, &compressed, 500);
        assert_eq!(plain, input);
        assert_eq!(state, StreamState::Destroyed);
        Ok(())
    }

    #[test]
    fn closing_truncated_zstd_frame_fails() {
        let compressed = zstd::encode_all(&sample(30_000)[..], 3).unwrap();

        let mut m = open(CodecKind::ZstdDecompress, None);
        let mut out = OutputBuffer::new();
        m.write(&compressed[..compressed.len() - 8], FlushMode::None, &mut out).unwrap();

        let mut tail = OutputBuffer::new();
        assert!(m.close(&mut tail).is_err());
        assert_eq!(m.state(), StreamState::Destroyed);
    }

    #[test]
    fn empty_stream_round_trips() {
        let (compressed, _) = run(CodecKind::Deflate, b"", 1);
        let mut plain = Vec::new();
        ZlibDecoder::new(&compressed[..]).read_to_end(&mut plain).unwrap();
        assert!(plain.is_empty());
    }
}
