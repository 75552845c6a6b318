//! Line splitting shared by the decoder, verifier and inspector
//!
//! Lines are handled as raw bytes so that stray non-UTF-8 content only
//! affects the line it appears on.

use std::io::BufRead;

/// Iterator over the lines of an in-memory S-record file
///
/// Line terminators (`\n` or `\r\n`) and surrounding whitespace are stripped.
pub struct RecordLines<'a> {
    rest: &'a [u8],
}

impl<'a> RecordLines<'a> {
    /// Split `data` into lines
    pub fn new(data: &'a [u8]) -> Self {
        Self { rest: data }
    }
}

impl<'a> Iterator for RecordLines<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        let line = match memchr::memchr(b'\n', self.rest) {
            Some(pos) => {
                let line = &self.rest[..pos];
                self.rest = &self.rest[pos + 1..];
                line
            }
            None => core::mem::take(&mut self.rest),
        };

        Some(line.trim_ascii_end())
    }
}

/// Feed each line of `reader` to `f`, reusing one buffer
///
/// Stops at the first error from the reader or from `f`.
pub fn for_each_line<R, F, E>(mut reader: R, mut f: F) -> Result<(), E>
where
    R: BufRead,
    F: FnMut(&[u8]) -> Result<(), E>,
    E: From<std::io::Error>,
{
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        f(buf.trim_ascii_end())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_strip_terminators() {
        let data = b"S1\r\n\nS9  \nS5";
        let lines: Vec<&[u8]> = RecordLines::new(data).collect();
        assert_eq!(lines, vec![&b"S1"[..], b"", b"S9", b"S5"]);
    }

    #[test]
    fn test_leading_whitespace_kept() {
        let lines: Vec<&[u8]> = RecordLines::new(b" S1
\tS9\n").collect();
        assert_eq!(lines, vec![&b" S1"[..], b"\tS9"]);
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        assert_eq!(RecordLines::new(b"S1\nS9\n").count(), 2);
        assert_eq!(RecordLines::new(b"").count(), 0);
    }

    #[test]
    fn test_for_each_line_matches_iterator() {
        let data = b"S0\r\nS1\n\xff\xfe\nS9";
        let mut seen = Vec::new();
        for_each_line::<_, _, std::io::Error>(&data[..], |line| {
            seen.push(line.to_vec());
            Ok(())
        })
        .unwrap();

        let expected: Vec<Vec<u8>> = RecordLines::new(data).map(<[u8]>::to_vec).collect();
        assert_eq!(seen, expected);
    }
}
