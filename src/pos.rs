// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use kstring::KString;

/// A location in the input: file name (or a sentinel such as
/// `"<string>"`), 1-based line, 1-based column. The all-zero default
/// marks a value constructed in code rather than read from input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub file: KString,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
           -> Result<(), std::fmt::Error> {
        f.write_fmt(format_args!("{}:{}:{}", self.file, self.line, self.column))
    }
}
