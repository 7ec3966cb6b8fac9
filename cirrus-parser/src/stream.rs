use ::lending_iterator::prelude::*;
use bytes::{Buf, BytesMut};
pub use lending_iterator::LendingIterator;

const CRLF: &[u8; 2] = b"\r\n";

/// Reassembles CRLF-terminated lines from a byte stream read in arbitrary chunks.
///
/// Everything after the last CRLF is kept until a later chunk completes it.
#[derive(Debug)]
pub struct StreamParser {
    buffer: BytesMut,
    /// No CRLF starts before this offset of the buffer.
    scanned: usize,
}

impl Default for StreamParser {
    fn default() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: 0,
        }
    }
}

impl StreamParser {
    pub fn feed_from_slice(&mut self, buf: &[u8]) {
        self.buffer.extend_from_slice(buf);
    }

    /// Iterate over the complete lines buffered so far, without their CRLF.
    ///
    /// Lines are discarded from the buffer only once yielded, so an iteration stopped
    /// early resumes at the next line on the following call.
    pub fn consume_iter(&mut self) -> MessageIterator<'_> {
        MessageIterator {
            stream_parser: self,
            consumed: 0,
        }
    }

    /// Bytes of the incomplete line waiting for more data.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

// windows() never yields a pair starting at the last byte, so a lone
// trailing CR stays pending instead of being matched
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(CRLF.len()).position(|w| w == CRLF)
}

pub struct MessageIterator<'a> {
    stream_parser: &'a mut StreamParser,
    consumed: usize,
}

#[gat]
impl LendingIterator for MessageIterator<'_> {
    type Item<'next>
    where
        Self: 'next,
    = &'next [u8];

    fn next(&mut self) -> Option<&[u8]> {
        let start = self.consumed;
        let from = self.stream_parser.scanned.max(start);
        let unscanned = self.stream_parser.buffer.get(from..)?;
        let Some(offset) = find_crlf(unscanned) else {
            // the last byte may be the CR of a CRLF split across reads
            let len = self.stream_parser.buffer.len();
            self.stream_parser.scanned = len.saturating_sub(1).max(start);
            return None;
        };
        let end = from + offset;
        self.consumed = end + CRLF.len();
        self.stream_parser.scanned = self.consumed;
        self.stream_parser.buffer.get(start..end)
    }
}

impl Drop for MessageIterator<'_> {
    fn drop(&mut self) {
        self.stream_parser.buffer.advance(self.consumed);
        self.stream_parser.scanned = self.stream_parser.scanned.saturating_sub(self.consumed);
    }
}

#[cfg(test)]
mod tests {
    use lending_iterator::LendingIterator;
    use proptest::prelude::*;

    use super::StreamParser;

    fn collect(sp: &mut StreamParser) -> Vec<Vec<u8>> {
        let mut lines = vec![];
        let mut iter = sp.consume_iter();
        while let Some(line) = iter.next() {
            lines.push(line.to_vec());
        }
        lines
    }

    #[test]
    fn test_empty() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"");
        let iter = sp.consume_iter();
        assert_eq!(iter.count(), 0);
    }

    #[test]
    fn test_one() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"CMD\r\n");
        assert_eq!(collect(&mut sp), [b"CMD".to_vec()]);
        assert!(sp.pending().is_empty());
    }

    #[test]
    fn test_one_and_half() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"CMD\r\nCA");
        let iter = sp.consume_iter();
        assert_eq!(iter.count(), 1);
        assert_eq!(sp.pending(), b"CA");
    }

    #[test]
    fn test_split_message() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"PING :a");
        assert!(collect(&mut sp).is_empty());
        sp.feed_from_slice(b"bc\r\n");
        assert_eq!(collect(&mut sp), [b"PING :abc".to_vec()]);
    }

    #[test]
    fn test_lone_line_feed_is_not_a_delimiter() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"CMD\nCAP\r");
        let iter = sp.consume_iter();
        assert_eq!(iter.count(), 0);
        sp.feed_from_slice(b"\n");
        assert_eq!(collect(&mut sp), [b"CMD\nCAP".to_vec()]);
    }

    #[test]
    fn test_trailing_carriage_return_stays_pending() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"A\r\nB\r");
        assert_eq!(collect(&mut sp), [b"A".to_vec()]);
        assert_eq!(sp.pending(), b"B\r");
        sp.feed_from_slice(b"\nC\r\n");
        assert_eq!(collect(&mut sp), [b"B".to_vec(), b"C".to_vec()]);
    }

    #[test]
    fn test_empty_lines() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"\r\n\r\nX\r\n");
        assert_eq!(collect(&mut sp), [vec![], vec![], b"X".to_vec()]);
    }

    #[test]
    fn test_restart_after_partial_iteration() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"ONE\r\nTWO\r\nTHR");
        {
            let mut iter = sp.consume_iter();
            assert_eq!(iter.next(), Some(&b"ONE"[..]));
        }
        sp.feed_from_slice(b"EE\r\n");
        assert_eq!(collect(&mut sp), [b"TWO".to_vec(), b"THREE".to_vec()]);
    }

    #[test]
    fn test_long_line_is_scanned_once() {
        let mut sp = StreamParser::default();
        for _ in 0..1000 {
            sp.feed_from_slice(b"x");
            assert!(collect(&mut sp).is_empty());
            assert_eq!(sp.scanned, sp.pending().len() - 1);
        }
        sp.feed_from_slice(b"\r");
        assert!(collect(&mut sp).is_empty());
        assert_eq!(sp.scanned, 1000);
        sp.feed_from_slice(b"\nNEXT");
        assert_eq!(collect(&mut sp), [vec![b'x'; 1000]]);
        assert_eq!(sp.pending(), b"NEXT");
        assert_eq!(sp.scanned, 3);
    }

    #[test]
    fn test_clear() {
        let mut sp = StreamParser::default();
        sp.feed_from_slice(b"PARTIAL");
        sp.clear();
        sp.feed_from_slice(b"NEW\r\n");
        assert_eq!(collect(&mut sp), [b"NEW".to_vec()]);
    }

    proptest! {
        #[test]
        fn chunking_does_not_change_the_lines(
            data in proptest::collection::vec(
                prop_oneof![Just(b'\r'), Just(b'\n'), Just(b'a'), Just(b' ')],
                0..200,
            ),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..10),
        ) {
            let mut whole = StreamParser::default();
            whole.feed_from_slice(&data);
            let expected = collect(&mut whole);

            let mut cuts: Vec<usize> = cuts.iter().map(|i| i.index(data.len() + 1)).collect();
            cuts.sort_unstable();

            let mut chunked = StreamParser::default();
            let mut lines = vec![];
            let mut start = 0;
            for cut in cuts.into_iter().chain(std::iter::once(data.len())) {
                chunked.feed_from_slice(&data[start..cut]);
                lines.extend(collect(&mut chunked));
                start = cut;
            }

            prop_assert_eq!(lines, expected);
            prop_assert_eq!(chunked.pending(), whole.pending());
        }
    }
}
