// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The reader: a table-driven recursive descender over a character
//! cursor. Trigger characters map to handlers ("reader macros"); a `#`
//! prefix selects from a second, dispatch-only table, so `#{` and `{`
//! can mean different things. Both tables are runtime-mutable through
//! [Reader::set_macro], and whatever falls through the tables is read
//! as a number or a symbol.

use crate::cursor::Cursor;
use crate::error::{At, FormKind, ReadError, ReadErrorWithPos};
use crate::number;
use crate::pos::Position;
use crate::value::{list2, symbol, Map, Set, Symbol, Value, Vector};
use kstring::KString;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;

/// What a handler returns: a form, or `None` when it consumed input
/// without producing one (comments, `#_`).
pub type ReadResult = Result<Option<Value>, ReadErrorWithPos>;

/// A reader macro. It is invoked with the trigger character already
/// consumed, and must leave the cursor just past the last character it
/// reads — in particular it must not eat trailing whitespace.
pub type Macro<R> = Rc<dyn Fn(&mut Reader<R>, char) -> ReadResult>;

/// Whitespace for the reader: space, tab, newline, carriage return,
/// form feed, and the comma. Nothing wider — other Unicode space
/// characters are ordinary symbol constituents.
pub fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\u{c}' | ',')
}

pub struct Reader<R: BufRead> {
    cursor: Cursor<R>,
    macros: HashMap<char, Macro<R>>,
    dispatch: HashMap<char, Macro<R>>,
}

impl<'s> Reader<&'s [u8]> {
    /// Read from an in-memory string; positions report `"<string>"`.
    pub fn from_str(source: &'s str) -> Self {
        Reader::new(source.as_bytes(), "<string>")
    }

    /// Read from an in-memory byte slice; positions report `"<bytes>"`.
    pub fn from_bytes(source: &'s [u8]) -> Self {
        Reader::new(source, "<bytes>")
    }
}

impl Reader<BufReader<File>> {
    /// Open `path` and read from it; positions report the path.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Reader::new(BufReader::new(file), &path.to_string_lossy()))
    }
}

impl<R: BufRead> Reader<R> {
    /// A reader over `source` with the built-in macro tables installed.
    /// `file_name` becomes the `file` field of every produced position.
    pub fn new(source: R, file_name: &str) -> Self {
        Reader {
            cursor: Cursor::new(source, file_name),
            macros: default_macros(),
            dispatch: default_dispatch(),
        }
    }

    /// Read the next form. Whitespace and comments before the form are
    /// consumed; whatever follows it is not. Fails with
    /// [ReadError::Eof] when the input ends before a form starts.
    pub fn one(&mut self) -> Result<Value, ReadErrorWithPos> {
        loop {
            if let Some(form) = self.read_one()? {
                return Ok(form);
            }
        }
    }

    /// Read forms until end of input and return them as a
    /// [Value::Module], in order. End of input *between* forms ends the
    /// read; end of input inside a form is that form's error.
    pub fn all(&mut self) -> Result<Value, ReadErrorWithPos> {
        let mut forms = Vec::new();
        loop {
            match self.skip_spaces() {
                Err(e) if e.is_eof() => break,
                Err(e) => return Err(e),
                Ok(()) => {}
            }
            if let Some(form) = self.read_one()? {
                forms.push(form);
            }
        }
        Ok(Value::Module(forms))
    }

    /// Install, replace or remove (`None`) the handler for `trigger`.
    /// With `dispatch` set the entry is only consulted after a `#`
    /// prefix. Removing an entry also removes the trigger from the
    /// terminal set, so removing `~` makes `~hello` one symbol.
    pub fn set_macro(&mut self, trigger: char, handler: Option<Macro<R>>, dispatch: bool) {
        let table = if dispatch {
            &mut self.dispatch
        } else {
            &mut self.macros
        };
        match handler {
            Some(handler) => {
                table.insert(trigger, handler);
            }
            None => {
                table.remove(&trigger);
            }
        }
    }

    /// The next character from the cursor. Exposed so user handlers
    /// consume input with the same position bookkeeping the built-ins
    /// get.
    pub fn next_rune(&mut self) -> Result<char, ReadErrorWithPos> {
        match self.cursor.next() {
            Ok(c) => Ok(c),
            Err(e) => Err(e.at(self.cursor.position())),
        }
    }

    /// Push back the character returned by the last
    /// [next_rune](Reader::next_rune); see [Cursor::unread] for the
    /// contract.
    pub fn unread(&mut self, c: char) {
        self.cursor.unread(c);
    }

    /// Position of the character last returned by
    /// [next_rune](Reader::next_rune).
    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    /// A terminal character ends the token before it without belonging
    /// to it: whitespace (comma included) or any plain macro trigger.
    /// Dispatch-only triggers such as `_` stay symbol constituents.
    pub fn is_terminal(&self, c: char) -> bool {
        is_space(c) || self.macros.contains_key(&c)
    }

    /// One attempt at reading a form; `Ok(None)` when a handler
    /// consumed input without producing one.
    fn read_one(&mut self) -> ReadResult {
        self.skip_spaces()?;
        let c = self.next_rune()?;
        if c == '#' {
            let c2 = self.next_rune()?;
            let handler = match self.dispatch.get(&c2) {
                Some(handler) => Rc::clone(handler),
                None => return Err(ReadError::IllegalDispatch(c2).at(self.position())),
            };
            return (*handler)(self, c2);
        }
        if let Some(handler) = self.macros.get(&c) {
            let handler = Rc::clone(handler);
            return (*handler)(self, c);
        }
        if c.is_ascii_digit() {
            return self.read_number(c).map(Some);
        }
        if c == '+' || c == '-' {
            match self.next_rune() {
                Ok(c2) => {
                    self.unread(c2);
                    if c2.is_ascii_digit() {
                        return self.read_number(c).map(Some);
                    }
                }
                Err(e) if e.is_eof() => {}
                Err(e) => return Err(e),
            }
        }
        self.read_symbol(c).map(Some)
    }

    fn skip_spaces(&mut self) -> Result<(), ReadErrorWithPos> {
        loop {
            let c = self.next_rune()?;
            if !is_space(c) {
                self.unread(c);
                return Ok(());
            }
        }
    }

    /// `init` plus the following run of non-terminal characters.
    fn read_token(&mut self, init: Option<char>) -> Result<String, ReadErrorWithPos> {
        let mut token = String::new();
        if let Some(c) = init {
            token.push(c);
        }
        loop {
            match self.next_rune() {
                Ok(c) if self.is_terminal(c) => {
                    self.unread(c);
                    return Ok(token);
                }
                Ok(c) => token.push(c),
                Err(e) if e.is_eof() => return Ok(token),
                Err(e) => return Err(e),
            }
        }
    }

    fn read_number(&mut self, init: char) -> Result<Value, ReadErrorWithPos> {
        let position = self.position();
        let token = self.read_token(Some(init))?;
        number::parse(&token).at(position)
    }

    fn read_symbol(&mut self, init: char) -> Result<Value, ReadErrorWithPos> {
        let position = self.position();
        let token = self.read_token(Some(init))?;
        Ok(match token.as_str() {
            "nil" => Value::Nil,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Symbol(Symbol {
                name: KString::from_ref(&token),
                position,
            }),
        })
    }
}

fn default_macros<R: BufRead>() -> HashMap<char, Macro<R>> {
    let mut table: HashMap<char, Macro<R>> = HashMap::new();
    table.insert('"', Rc::new(read_string));
    table.insert(';', Rc::new(read_comment));
    table.insert('\'', Rc::new(|rd: &mut Reader<R>, _: char| quoted(rd, "quote")));
    table.insert('~', Rc::new(|rd: &mut Reader<R>, _: char| quoted(rd, "unquote")));
    table.insert('`', Rc::new(|rd: &mut Reader<R>, _: char| {
        quoted(rd, "syntax-quote")
    }));
    table.insert('(', Rc::new(read_list));
    table.insert('[', Rc::new(read_vector));
    table.insert('{', Rc::new(read_map));
    table.insert(')', Rc::new(unmatched_delimiter));
    table.insert(']', Rc::new(unmatched_delimiter));
    table.insert('}', Rc::new(unmatched_delimiter));
    table.insert('\\', Rc::new(read_character));
    table.insert(':', Rc::new(read_keyword));
    table
}

fn default_dispatch<R: BufRead>() -> HashMap<char, Macro<R>> {
    let mut table: HashMap<char, Macro<R>> = HashMap::new();
    table.insert('{', Rc::new(read_set));
    table.insert('_', Rc::new(read_discard));
    table
}

fn read_string<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let mut text = String::new();
    loop {
        let c = match rd.next_rune() {
            Ok(c) => c,
            Err(e) if e.is_eof() => {
                return Err(ReadError::UnterminatedString.at(rd.position()))
            }
            Err(e) => return Err(e),
        };
        match c {
            '"' => return Ok(Some(Value::String(KString::from_ref(&text)))),
            '\\' => {
                let escape = match rd.next_rune() {
                    Ok(c) => c,
                    Err(e) if e.is_eof() => {
                        return Err(ReadError::UnterminatedString.at(rd.position()))
                    }
                    Err(e) => return Err(e),
                };
                text.push(match escape {
                    '"' => '"',
                    '\\' => '\\',
                    'a' => '\u{7}',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\u{b}',
                    other => return Err(ReadError::InvalidEscape(other).at(rd.position())),
                });
            }
            _ => text.push(c),
        }
    }
}

/// Consumes to the end of the line; a comment ending at EOF is still a
/// complete comment.
fn read_comment<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    loop {
        match rd.next_rune() {
            Ok('\n') => return Ok(None),
            Ok(_) => {}
            Err(e) if e.is_eof() => return Ok(None),
            Err(e) => return Err(e),
        }
    }
}

/// `'` / `~` / backtick expand to a two-element list around the next
/// form. The expansion carries no position; only the quoted form keeps
/// its own. A comment or EOF in place of that form is an error.
fn quoted<R: BufRead>(rd: &mut Reader<R>, expand: &'static str) -> ReadResult {
    let position = rd.position();
    match rd.read_one() {
        Ok(Some(form)) => Ok(Some(list2(symbol(expand), form))),
        Ok(None) => Err(ReadError::MissingExpression(expand).at(position)),
        Err(e) if e.is_eof() => Err(ReadError::MissingExpression(expand).at(position)),
        Err(e) => Err(e),
    }
}

fn read_keyword<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    let token = rd.read_token(None)?;
    if token.is_empty() {
        return Err(ReadError::EmptyKeyword.at(position));
    }
    Ok(Some(Value::Keyword(KString::from_ref(&token))))
}

fn read_character<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    // EOF right after the backslash propagates as EOF
    let first = rd.next_rune()?;
    if rd.is_terminal(first) {
        rd.unread(first);
        return Err(ReadError::UnknownCharLiteral(String::new()).at(position));
    }
    let token = rd.read_token(Some(first))?;
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(Some(Value::Char(c)));
    }
    let named = match token.as_str() {
        "newline" => Some('\n'),
        "space" => Some(' '),
        "tab" => Some('\t'),
        "formfeed" => Some('\u{c}'),
        "backspace" => Some('\u{8}'),
        "return" => Some('\r'),
        t if t.starts_with('u') => u32::from_str_radix(&t[1..], 16)
            .ok()
            .and_then(char::from_u32),
        _ => None,
    };
    match named {
        Some(c) => Ok(Some(Value::Char(c))),
        None => Err(ReadError::UnknownCharLiteral(token).at(position)),
    }
}

/// The shared accumulation loop behind every composite handler: skip
/// whitespace, stop at `closer`, otherwise recurse through the core
/// loop so comments, `#_` and nested macros compose.
fn read_container<R: BufRead>(
    rd: &mut Reader<R>,
    closer: char,
    kind: FormKind,
) -> Result<Vec<Value>, ReadErrorWithPos> {
    let mut values = Vec::new();
    loop {
        match rd.skip_spaces() {
            Ok(()) => {}
            Err(e) if e.is_eof() => {
                return Err(ReadError::Unterminated(kind).at(rd.position()))
            }
            Err(e) => return Err(e),
        }
        let c = rd.next_rune()?;
        if c == closer {
            return Ok(values);
        }
        rd.unread(c);
        if let Some(form) = rd.read_one()? {
            values.push(form);
        }
    }
}

fn read_list<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    let values = read_container(rd, ')', FormKind::List)?;
    Ok(Some(Value::list_at(values, position)))
}

fn read_vector<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    let values = read_container(rd, ']', FormKind::Vector)?;
    Ok(Some(Value::Vector(Vector { values, position })))
}

/// `#{…}`: the recorded position is that of the `{`, not the `#`.
fn read_set<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    let values = read_container(rd, '}', FormKind::Set)?;
    for (i, value) in values.iter().enumerate() {
        if values[..i].contains(value) {
            return Err(ReadError::DuplicateSetElement.at(rd.position()));
        }
    }
    Ok(Some(Value::Set(Set { values, position })))
}

fn read_map<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    let position = rd.position();
    let values = read_container(rd, '}', FormKind::Map)?;
    if values.len() % 2 != 0 {
        return Err(ReadError::OddMapLiteral.at(rd.position()));
    }
    let mut entries = HashMap::with_capacity(values.len() / 2);
    let mut forms = values.into_iter();
    while let (Some(key), Some(value)) = (forms.next(), forms.next()) {
        if !key.is_hashable() {
            return Err(ReadError::NonHashableKey(key.type_name()).at(rd.position()));
        }
        entries.insert(key, value);
    }
    Ok(Some(Value::Map(Map { entries, position })))
}

/// `#_`: read forms until one produces a value, then throw it away.
fn read_discard<R: BufRead>(rd: &mut Reader<R>, _init: char) -> ReadResult {
    loop {
        if rd.read_one()?.is_some() {
            return Ok(None);
        }
    }
}

fn unmatched_delimiter<R: BufRead>(rd: &mut Reader<R>, init: char) -> ReadResult {
    Err(ReadError::UnmatchedDelimiter(init).at(rd.position()))
}
