use crate::error::{InspectorError, Result};
use memchr::memchr2;
use regex::Regex;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

const BINARY_CHECK_SIZE: usize = 8000;

/// Heuristic binary check: more than 30% NUL bytes in the first block.
pub fn is_binary(file: &Path) -> bool {
    if let Ok(mut file) = File::open(file) {
        let mut buffer = vec![0u8; BINARY_CHECK_SIZE];
        if let Ok(n) = file.read(&mut buffer) {
            if n > 0 {
                let null_bytes = buffer[..n].iter().filter(|&&b| b == 0).count();
                return (null_bytes as f64 / n as f64) > 0.3;
            }
        }
    }
    false
}

/// Lazy, single-pass sequence of `(line_number, trimmed_line)` for every line
/// the pattern matches.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`. Bytes that are not valid UTF-8
/// are replaced rather than rejected, so one malformed byte never hides the
/// rest of the file. A read failure is yielded once as `Err` and ends the
/// sequence.
pub struct LineMatches<'p, R> {
    reader: R,
    pattern: &'p Regex,
    line_number: usize,
    buf: Vec<u8>,
    /// The previous line ended in `\r`; a leading `\n` belongs to it.
    skip_lf: bool,
    finished: bool,
}

impl<'p, R: BufRead> LineMatches<'p, R> {
    pub fn new(reader: R, pattern: &'p Regex) -> Self {
        Self {
            reader,
            pattern,
            line_number: 0,
            buf: Vec::new(),
            skip_lf: false,
            finished: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.line_number
    }

    /// Reads the next line, without its terminator, into `buf`.
    /// Returns `false` once the input is exhausted.
    fn read_line(&mut self) -> io::Result<bool> {
        self.buf.clear();
        let mut started = false;
        loop {
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available.is_empty() {
                return Ok(started);
            }
            if self.skip_lf {
                self.skip_lf = false;
                if available[0] == b'\n' {
                    self.reader.consume(1);
                    continue;
                }
            }
            match memchr2(b'\n', b'\r', available) {
                Some(end) => {
                    self.buf.extend_from_slice(&available[..end]);
                    self.skip_lf = available[end] == b'\r';
                    self.reader.consume(end + 1);
                    return Ok(true);
                }
                None => {
                    let len = available.len();
                    self.buf.extend_from_slice(available);
                    self.reader.consume(len);
                    started = true;
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for LineMatches<'_, R> {
    type Item = io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            match self.read_line() {
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Ok(true) => {
                    self.line_number += 1;
                    let line = String::from_utf8_lossy(&self.buf);
                    if self.pattern.is_match(&line) {
                        return Some(Ok((self.line_number, line.trim().to_string())));
                    }
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Opens `path` and returns its matching lines lazily.
pub fn scan_file<'p>(
    path: &Path,
    pattern: &'p Regex,
) -> io::Result<LineMatches<'p, BufReader<File>>> {
    let file = File::open(path)?;
    Ok(LineMatches::new(BufReader::new(file), pattern))
}

/// Scans a whole file. A failure at any point discards the partial results.
pub fn search_file(path: &Path, pattern: &Regex) -> Result<Vec<(usize, String)>> {
    let read_error = |source| InspectorError::FileRead {
        path: path.to_path_buf(),
        source,
    };
    scan_file(path, pattern)
        .map_err(read_error)?
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_error)
}
