// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Decoding characters from a byte source while tracking positions.

use crate::error::ReadError;
use crate::pos::Position;
use kstring::KString;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use utf8::{BufReadDecoder, BufReadDecoderError};

/// A character cursor over a buffered byte source.
///
/// [next](Cursor::next) reports the position *of the character it
/// returns*, and [unread](Cursor::unread) pushes one character back
/// while restoring that position, so a caller can peek and rewind
/// without losing track of where it is.
pub struct Cursor<R: BufRead> {
    decoder: BufReadDecoder<R>,
    pending: VecDeque<char>,
    unread: Option<char>,
    file: KString,
    line: u32,
    column: u32,
    // position before the last read; present exactly when unread is legal
    before: Option<(u32, u32)>,
}

impl<R: BufRead> Cursor<R> {
    pub fn new(source: R, file: &str) -> Self {
        Cursor {
            decoder: BufReadDecoder::new(source),
            pending: VecDeque::new(),
            unread: None,
            file: KString::from_ref(file),
            line: 1,
            column: 0,
            before: None,
        }
    }

    /// Decode and return the next character, advancing the position.
    /// A newline reports the next line at column 0, so the first real
    /// character of every line is column 1. Fails with
    /// [ReadError::Eof] at end of input; source failures and invalid
    /// UTF-8 surface as [ReadError::Io].
    pub fn next(&mut self) -> Result<char, ReadError> {
        let c = match self.unread.take() {
            Some(c) => c,
            None => self.decode()?,
        };
        self.before = Some((self.line, self.column));
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Ok(c)
    }

    /// Push back the character returned by the last [next](Cursor::next)
    /// and restore its position, so the following `next` re-reports it.
    ///
    /// # Panics
    ///
    /// Panics when called twice in a row or before any read. Both are
    /// bugs in the calling handler, not input conditions.
    pub fn unread(&mut self, c: char) {
        assert!(
            self.unread.is_none(),
            "cursor: unread called twice in a row"
        );
        let (line, column) = match self.before.take() {
            Some(before) => before,
            None => panic!("cursor: unread before any read"),
        };
        self.unread = Some(c);
        self.line = line;
        self.column = column;
    }

    /// File, line and column of the character last returned by
    /// [next](Cursor::next).
    pub fn position(&self) -> Position {
        Position {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        }
    }

    fn decode(&mut self) -> Result<char, ReadError> {
        loop {
            if let Some(c) = self.pending.pop_front() {
                return Ok(c);
            }
            match self.decoder.next_strict() {
                None => return Err(ReadError::Eof),
                Some(Ok(chunk)) => self.pending.extend(chunk.chars()),
                Some(Err(BufReadDecoderError::Io(e))) => return Err(ReadError::Io(e)),
                Some(Err(e)) => {
                    return Err(ReadError::Io(io::Error::new(
                        io::ErrorKind::InvalidData,
                        e.to_string(),
                    )))
                }
            }
        }
    }
}
