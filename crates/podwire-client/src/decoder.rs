//! Incremental decoder for a stream of concatenated JSON documents.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

/// Buffers raw bytes and yields complete records one at a time.
///
/// Records may be separated by newlines, other whitespace, or nothing at
/// all. A record split across chunks stays buffered until the rest of it
/// arrives. Object and array records are framed by a bracket scanner that
/// resumes where the previous chunk left off, so each byte is scanned once
/// and parsed once.
#[derive(Debug)]
pub(crate) struct RecordDecoder<T> {
    buf: Vec<u8>,
    frame: Frame,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RecordDecoder<T> {
    pub(crate) const fn new() -> Self {
        Self {
            buf: Vec::new(),
            frame: Frame::new(),
            _record: PhantomData,
        }
    }

    pub(crate) fn extend(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete record, or `None` if more bytes are needed.
    pub(crate) fn next_record(&mut self) -> Result<Option<T>, serde_json::Error> {
        if self.frame.is_fresh() {
            let lead = self.buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let _ = self.buf.drain(..lead);
        }
        match self.buf.first() {
            None => Ok(None),
            Some(b'{' | b'[') => self.next_container(),
            Some(_) => self.next_scalar(),
        }
    }

    /// Checks that nothing but whitespace is left once the input has ended.
    pub(crate) fn finish(&self) -> Result<(), serde_json::Error> {
        if self.buf.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        serde_json::from_slice::<T>(&self.buf).map(drop)
    }

    fn next_container(&mut self) -> Result<Option<T>, serde_json::Error> {
        let Some(end) = self.frame.advance(&self.buf) else {
            return Ok(None);
        };
        let record = serde_json::from_slice(&self.buf[..=end]);
        let _ = self.buf.drain(..=end);
        record.map(Some)
    }

    fn next_scalar(&mut self) -> Result<Option<T>, serde_json::Error> {
        let mut records = serde_json::Deserializer::from_slice(&self.buf).into_iter::<T>();
        match records.next() {
            None => Ok(None),
            Some(Ok(record)) => {
                let used = records.byte_offset();
                let _ = self.buf.drain(..used);
                Ok(Some(record))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(e),
        }
    }
}

/// Bracket-depth scanner over the record at the front of the buffer.
#[derive(Debug)]
struct Frame {
    pos: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
}

impl Frame {
    const fn new() -> Self {
        Self {
            pos: 0,
            depth: 0,
            in_string: false,
            escaped: false,
        }
    }

    const fn is_fresh(&self) -> bool {
        self.pos == 0
    }

    /// Index of the byte closing the outermost bracket, once it has arrived.
    /// Resets itself when a record is complete.
    fn advance(&mut self, buf: &[u8]) -> Option<usize> {
        for (i, &b) in buf.iter().enumerate().skip(self.pos) {
            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                }
                continue;
            }
            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        *self = Self::new();
                        return Some(i);
                    }
                }
                _ => {}
            }
        }
        self.pos = buf.len();
        None
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn drain(decoder: &mut RecordDecoder<Value>) -> Vec<Value> {
        let mut out = Vec::new();
        while let Some(v) = decoder.next_record().expect("well-formed") {
            out.push(v);
        }
        out
    }

    #[test]
    fn decodes_newline_delimited_records() {
        let mut decoder = RecordDecoder::new();
        decoder.extend(b"{\"a\":1}\n{\"a\":2}\n");
        assert_eq!(drain(&mut decoder).len(), 2);
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn decodes_back_to_back_records() {
        let mut decoder = RecordDecoder::new();
        decoder.extend(b"{\"a\":1}{\"a\":2}{\"a\":3}");
        let values = drain(&mut decoder);
        assert_eq!(values[2]["a"], 3);
    }

    #[test]
    fn waits_for_record_split_across_chunks() {
        let mut decoder = RecordDecoder::new();
        decoder.extend(b"{\"Type\":\"con");
        assert!(decoder.next_record().expect("partial is fine").is_none());
        decoder.extend(b"tainer\"}\n");
        let values = drain(&mut decoder);
        assert_eq!(values, [serde_json::json!({"Type": "container"})]);
    }

    #[test]
    fn finish_reports_truncated_record() {
        let mut decoder = RecordDecoder::<Value>::new();
        decoder.extend(b"{\"Type\":");
        assert!(decoder.next_record().expect("partial").is_none());
        assert!(decoder.finish().expect_err("truncated").is_eof());
    }

    #[test]
    fn malformed_record_is_an_error() {
        let mut decoder = RecordDecoder::<Value>::new();
        decoder.extend(b"{\"a\":1}\n{\"a\" 2}");
        assert!(decoder.next_record().expect("first ok").is_some());
        assert!(decoder.next_record().is_err());
    }

    #[test]
    fn record_fed_one_byte_at_a_time_is_decoded_once_complete() {
        let raw = br#"{"Type":"container","Actor":{"ID":"c1","Attributes":{"name":"web"}}}"#;
        let mut decoder = RecordDecoder::<Value>::new();
        for (i, byte) in raw.iter().enumerate() {
            decoder.extend(std::slice::from_ref(byte));
            let next = decoder.next_record().expect("partial is fine");
            if i + 1 < raw.len() {
                assert!(next.is_none());
            } else {
                assert_eq!(next.expect("complete")["Actor"]["ID"], "c1");
            }
        }
        assert!(decoder.finish().is_ok());
    }

    #[test]
    fn brackets_inside_strings_do_not_end_a_record() {
        let mut decoder = RecordDecoder::new();
        decoder.extend(br#"{"msg":"}{ \"]\" ["}"#);
        decoder.extend(b"\n[1,{\"a\":[2]}]");
        let values = drain(&mut decoder);
        assert_eq!(values[0]["msg"], "}{ \"]\" [");
        assert_eq!(values[1][1]["a"][0], 2);
    }

    #[test]
    fn scalar_records_still_decode() {
        let mut decoder = RecordDecoder::new();
        decoder.extend(b"\"a\" 7 true\n");
        assert_eq!(drain(&mut decoder).len(), 3);
    }
}
