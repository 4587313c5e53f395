// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Error kinds produced by the reader, and the helpers that attach a
//! [Position] to them on the way out.

use crate::pos::Position;
use thiserror::Error;

/// Which composite form an error is talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    List,
    Vector,
    Set,
    Map,
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_str(match self {
            FormKind::List => "list",
            FormKind::Vector => "vector",
            FormKind::Set => "set",
            FormKind::Map => "hash-map",
        })
    }
}

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("unexpected EOF while reading")]
    Eof,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("unterminated string")]
    UnterminatedString,
    #[error("unterminated {0}, reached EOF")]
    Unterminated(FormKind),
    #[error("invalid escape sequence '\\{0}' in string")]
    InvalidEscape(char),
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("unknown character literal '\\{0}'")]
    UnknownCharLiteral(String),
    #[error("expected one or more characters after ':'")]
    EmptyKeyword,
    #[error("no dispatch handler registered for '#{0}'")]
    IllegalDispatch(char),
    #[error("unmatched delimiter '{0}'")]
    UnmatchedDelimiter(char),
    #[error("set literal contains duplicate elements")]
    DuplicateSetElement,
    #[error("hash-map literal must contain an even number of forms")]
    OddMapLiteral,
    #[error("{0} cannot be used as a hash-map key")]
    NonHashableKey(&'static str),
    #[error("missing form after {0}")]
    MissingExpression(&'static str),
}

impl ReadError {
    pub fn is_eof(&self) -> bool {
        matches!(self, ReadError::Eof)
    }

    pub fn at(self, pos: Position) -> ReadErrorWithPos {
        ReadErrorWithPos { err: self, pos }
    }
}

/// A [ReadError] located at the cursor position where it was detected.
/// After an error the cursor is wherever the failing handler stopped;
/// further reads are permitted but nothing is promised about them.
#[derive(Error, Debug)]
#[error("{err} at {pos}")]
pub struct ReadErrorWithPos {
    pub err: ReadError,
    pub pos: Position,
}

impl ReadErrorWithPos {
    pub fn is_eof(&self) -> bool {
        self.err.is_eof()
    }
}

pub(crate) trait At<T> {
    fn at(self, pos: Position) -> Result<T, ReadErrorWithPos>;
}

impl<T> At<T> for Result<T, ReadError> {
    fn at(self, pos: Position) -> Result<T, ReadErrorWithPos> {
        match self {
            Err(e) => Err(e.at(pos)),
            Ok(v) => Ok(v),
        }
    }
}
