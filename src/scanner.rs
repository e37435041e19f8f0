//! Line scanner: splits a byte stream into logical ZPL lines.
//!
//! A line ends at `\n`, `\r\n`, `\n\r` or a bare `\r`. Blank lines and
//! comment-only lines are consumed silently but still advance the physical
//! line counter, so every returned line carries its true 1-based position.
//! The scanner never hands out a line before its terminator (or end of
//! input) has been seen; it reads through `BufRead` so arbitrarily large
//! inputs stream without being loaded at once.

use std::io::{self, BufRead};

use crate::error::{Error, Location};

const BOM: char = '\u{feff}';

/// One non-blank, non-comment line together with its position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    pub(crate) text: String,
    pub(crate) location: Location,
}

pub(crate) struct LineScanner<R: BufRead> {
    reader: R,
    /// Physical lines consumed so far (blank and comment lines included).
    line: usize,
    /// Bytes of the line currently being assembled.
    buf: Vec<u8>,
    max_line_bytes: Option<usize>,
    done: bool,
}

impl<R: BufRead> LineScanner<R> {
    pub(crate) fn new(reader: R, max_line_bytes: Option<usize>) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
            max_line_bytes,
            done: false,
        }
    }

    /// Location of the most recently consumed physical line.
    pub(crate) fn location(&self) -> Location {
        Location::new(self.line)
    }

    /// Return the next line that carries structure, or `Ok(None)` at end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<Line>, Error> {
        while let Some(line) = self.read_physical()? {
            let trimmed = line.text.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(line));
        }
        Ok(None)
    }

    fn read_physical(&mut self) -> Result<Option<Line>, Error> {
        if self.done {
            return Ok(None);
        }
        self.buf.clear();
        let mut terminated = false;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if available.is_empty() {
                break;
            }
            match available.iter().position(|b| *b == b'\n' || *b == b'\r') {
                Some(pos) => {
                    let first = available[pos];
                    self.buf.extend_from_slice(&available[..pos]);
                    self.reader.consume(pos + 1);
                    self.skip_partner(first)?;
                    terminated = true;
                }
                None => {
                    let n = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(n);
                }
            }
            if let Some(limit) = self.max_line_bytes {
                if self.buf.len() > limit {
                    return Err(Error::syntax(
                        format!("line exceeds the limit of {limit} bytes"),
                        Location::new(self.line + 1),
                    ));
                }
            }
            if terminated {
                break;
            }
        }

        if !terminated {
            self.done = true;
            if self.buf.is_empty() {
                return Ok(None);
            }
        }
        self.line += 1;
        let location = self.location();

        let mut text = String::from_utf8(std::mem::take(&mut self.buf))
            .map_err(|_| Error::syntax("line is not valid UTF-8", location))?;
        if self.line == 1 && text.starts_with(BOM) {
            text.drain(..BOM.len_utf8());
        }
        Ok(Some(Line { text, location }))
    }

    /// After `\n` swallow a directly following `\r`, after `\r` a `\n`.
    fn skip_partner(&mut self, first: u8) -> Result<(), Error> {
        let partner = if first == b'\n' { b'\r' } else { b'\n' };
        loop {
            match self.reader.fill_buf() {
                Ok(next) => {
                    if next.first() == Some(&partner) {
                        self.reader.consume(1);
                    }
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn lines(input: &[u8]) -> Vec<(String, u64)> {
        let mut scanner = LineScanner::new(input, None);
        let mut out = Vec::new();
        while let Some(line) = scanner.next_line().unwrap() {
            out.push((line.text, line.location.line()));
        }
        out
    }

    #[test]
    fn all_line_endings_split_the_same_way() {
        for input in [
            &b"key = 1\r\nkey = 0"[..],
            &b"key = 1\n\rkey = 0"[..],
            &b"key = 1\rkey = 0"[..],
            &b"key = 1\nkey = 0"[..],
        ] {
            assert_eq!(
                lines(input),
                vec![("key = 1".to_string(), 1), ("key = 0".to_string(), 2)],
                "input {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn blank_and_comment_lines_are_skipped_but_counted() {
        let input = b"\n# comment\n    # indented comment\n   \nname = x\n";
        assert_eq!(lines(input), vec![("name = x".to_string(), 5)]);
    }

    #[test]
    fn tiny_reader_buffer_does_not_split_crlf() {
        let reader = BufReader::with_capacity(1, &b"a = 1\r\nb = 2\r\n"[..]);
        let mut scanner = LineScanner::new(reader, None);
        let first = scanner.next_line().unwrap().unwrap();
        let second = scanner.next_line().unwrap().unwrap();
        assert_eq!(first.text, "a = 1");
        assert_eq!(second.text, "b = 2");
        assert_eq!(second.location.line(), 2);
        assert!(scanner.next_line().unwrap().is_none());
    }

    #[test]
    fn leading_bom_is_dropped() {
        assert_eq!(lines("\u{feff}a = 1".as_bytes()), vec![("a = 1".to_string(), 1)]);
    }

    #[test]
    fn long_line_is_rejected() {
        let mut scanner = LineScanner::new(&b"a = 1\nb = 0123456789\n"[..], Some(8));
        assert!(scanner.next_line().unwrap().is_some());
        let err = scanner.next_line().unwrap_err();
        assert!(matches!(err, Error::Syntax { location, .. } if location.line() == 2));
    }

    #[test]
    fn invalid_utf8_reports_line() {
        let mut scanner = LineScanner::new(&b"a = 1\nb = \xff\n"[..], None);
        assert!(scanner.next_line().unwrap().is_some());
        let err = scanner.next_line().unwrap_err();
        assert_eq!(err.location().map(|l| l.line()), Some(2));
    }
}
