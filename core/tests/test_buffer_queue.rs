#[cfg(test)]
mod output_buffer_tests {
    use codec_stream_core::buffer::OutputBuffer;
    use codec_stream_core::types::StreamError;

    #[test]
    fn grow_by_reserves_spare_capacity() {
        let mut buf = OutputBuffer::new();
        buf.grow_by(64).unwrap();
        assert!(buf.spare_capacity() >= 64);
        assert!(buf.is_empty());
    }

    #[test]
    fn grow_by_respects_limit() {
        let mut buf = OutputBuffer::with_limit(Some(16));
        buf.grow_by(16).unwrap();
        let err = buf.grow_by(17).unwrap_err();
        assert_eq!(err, StreamError::Memory { requested: 17 });
    }

    #[test]
    fn grow_by_overflow_is_memory_error() {
        let mut buf = OutputBuffer::new();
        buf.grow_by(1).unwrap();
        buf.fill_spare(|s| { s[0] = 1; Ok::<_, ()>((1, ())) }).unwrap();
        assert!(matches!(buf.grow_by(usize::MAX), Err(StreamError::Memory { .. })));
    }

    #[test]
    fn fill_spare_keeps_only_written_prefix() {
        let mut buf = OutputBuffer::new();
        buf.grow_by(8).unwrap();
        let tag = buf
            .fill_spare(|spare| {
                spare[..3].copy_from_slice(b"abc");
                Ok::<_, ()>((3, "tag"))
            })
            .unwrap();
        assert_eq!(tag, "tag");
        assert_eq!(buf.as_slice(), b"abc");
    }

    #[test]
    fn fill_spare_error_appends_nothing() {
        let mut buf = OutputBuffer::new();
        buf.grow_by(8).unwrap();
        buf.fill_spare(|s| { s[0] = b'x'; Ok::<_, ()>((1, ())) }).unwrap();

        let res: Result<(), &str> = buf.fill_spare(|spare| {
            spare[0] = b'!';
            Err("boom")
        });
        assert_eq!(res, Err("boom"));
        assert_eq!(buf.as_slice(), b"x");
    }

    #[test]
    fn into_bytes_hands_over_contents() {
        let mut buf = OutputBuffer::new();
        buf.grow_by(4).unwrap();
        buf.fill_spare(|s| { s[..2].copy_from_slice(b"ok"); Ok::<_, ()>((2, ())) }).unwrap();
        assert_eq!(&buf.into_bytes()[..], b"ok");
    }
}

#[cfg(test)]
mod queue_tests {
    use codec_stream_core::queue::Queue;

    #[test]
    fn fifo_order() {
        let mut q = Queue::new();
        for i in 0..5 {
            q.push(i).unwrap();
        }
        let drained: Vec<_> = std::iter::from_fn(|| q.pop()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(q.is_empty());
    }

    #[test]
    fn limit_hands_back_rejected_item() {
        let mut q = Queue::with_limit(Some(2));
        q.push("a").unwrap();
        q.push("b").unwrap();
        assert_eq!(q.push("c"), Err("c"));
        assert_eq!(q.len(), 2);

        q.pop();
        q.push("c").unwrap();
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let mut q: Queue<u8> = Queue::with_limit(Some(0));
        assert_eq!(q.push(1), Err(1));
        assert!(q.pop().is_none());
    }
}
