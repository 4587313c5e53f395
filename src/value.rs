// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The value tree produced by the reader.
//!
//! Scalars carry no position; symbols and composite forms remember
//! where their first character or opening delimiter was. Equality and
//! hashing are structural and never look at positions, so two reads of
//! the same text compare equal no matter where the text sat in its
//! source. Lists are the one composite with reference identity: a
//! `Value::List` is a shared handle, and cloning it aliases the same
//! cells so a later evaluation stage can splice in place.

use crate::pos::Position;
use kstring::KString;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Write};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(KString),
    Keyword(KString),
    Symbol(Symbol),
    List(Rc<RefCell<List>>),
    Vector(Vector),
    Set(Set),
    Map(Map),
    /// The ordered top-level forms of a full read.
    Module(Vec<Value>),
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: KString,
    pub position: Position,
}

#[derive(Debug)]
pub struct List {
    pub values: Vec<Value>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Vector {
    pub values: Vec<Value>,
    pub position: Position,
}

/// Members in read order; the reader rejects duplicates at
/// construction, so two sets compare as unordered collections.
#[derive(Debug, Clone)]
pub struct Set {
    pub values: Vec<Value>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct Map {
    pub entries: HashMap<Value, Value>,
    pub position: Position,
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Symbol {}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // bit equality keeps Eq lawful and NaN equal to itself
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Keyword(a), Value::Keyword(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                Rc::ptr_eq(a, b) || a.borrow().values == b.borrow().values
            }
            (Value::Vector(a), Value::Vector(b)) => a.values == b.values,
            (Value::Set(a), Value::Set(b)) => {
                a.values.len() == b.values.len()
                    && a.values.iter().all(|v| b.values.contains(v))
            }
            (Value::Map(a), Value::Map(b)) => a.entries == b.entries,
            (Value::Module(a), Value::Module(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Nil => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(n) => n.hash(state),
            Value::Float(x) => x.to_bits().hash(state),
            Value::Char(c) => c.hash(state),
            Value::String(s) | Value::Keyword(s) => s.hash(state),
            Value::Symbol(s) => s.name.hash(state),
            // composites are rejected as map keys before hashing ever
            // matters; length alone stays consistent with equality
            Value::List(l) => l.borrow().values.len().hash(state),
            Value::Vector(v) => v.values.len().hash(state),
            Value::Set(s) => s.values.len().hash(state),
            Value::Map(m) => m.entries.len().hash(state),
            Value::Module(forms) => forms.len().hash(state),
        }
    }
}

impl Value {
    /// True for every value the map handler accepts as a key: all
    /// scalars, keywords and symbols; no composite qualifies.
    pub fn is_hashable(&self) -> bool {
        !matches!(
            self,
            Value::List(_)
                | Value::Vector(_)
                | Value::Set(_)
                | Value::Map(_)
                | Value::Module(_)
        )
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Char(_) => "char",
            Value::String(_) => "string",
            Value::Keyword(_) => "keyword",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Vector(_) => "vector",
            Value::Set(_) => "set",
            Value::Map(_) => "hash-map",
            Value::Module(_) => "module",
        }
    }

    /// The position recorded by the reader, for the kinds of value that
    /// carry one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Value::Symbol(s) => Some(s.position.clone()),
            Value::List(l) => Some(l.borrow().position.clone()),
            Value::Vector(v) => Some(v.position.clone()),
            Value::Set(s) => Some(s.position.clone()),
            Value::Map(m) => Some(m.position.clone()),
            _ => None,
        }
    }

    /// A fresh list handle with no position.
    pub fn list(values: Vec<Value>) -> Value {
        Value::list_at(values, Position::default())
    }

    pub fn list_at(values: Vec<Value>, position: Position) -> Value {
        Value::List(Rc::new(RefCell::new(List { values, position })))
    }
}

/// A positionless symbol, as produced by the quote family.
pub fn symbol(name: &str) -> Value {
    Value::Symbol(Symbol {
        name: KString::from_ref(name),
        position: Position::default(),
    })
}

/// The two-element list a quoting macro expands to.
pub fn list2(a: Value, b: Value) -> Value {
    Value::list(vec![a, b])
}

fn write_joined<'v>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    values: impl Iterator<Item = &'v Value>,
    close: &str,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, v) in values.enumerate() {
        if i > 0 {
            f.write_char(' ')?;
        }
        write!(f, "{}", v)?;
    }
    f.write_str(close)
}

fn write_char_literal(f: &mut fmt::Formatter<'_>, c: char) -> fmt::Result {
    match c {
        '\n' => f.write_str("\\newline"),
        ' ' => f.write_str("\\space"),
        '\t' => f.write_str("\\tab"),
        '\u{c}' => f.write_str("\\formfeed"),
        '\u{8}' => f.write_str("\\backspace"),
        '\r' => f.write_str("\\return"),
        _ => write!(f, "\\{}", c),
    }
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\u{7}' => f.write_str("\\a")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{b}' => f.write_str("\\v")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            // Debug keeps the distinguishing dot or exponent on floats
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Char(c) => write_char_literal(f, *c),
            Value::String(s) => write_string_literal(f, s),
            Value::Keyword(k) => write!(f, ":{}", k),
            Value::Symbol(s) => f.write_str(&s.name),
            Value::List(l) => write_joined(f, "(", l.borrow().values.iter(), ")"),
            Value::Vector(v) => write_joined(f, "[", v.values.iter(), "]"),
            Value::Set(s) => write_joined(f, "#{", s.values.iter(), "}"),
            Value::Map(m) => {
                f.write_char('{')?;
                for (i, (k, v)) in m.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_char(' ')?;
                    }
                    write!(f, "{} {}", k, v)?;
                }
                f.write_char('}')
            }
            Value::Module(forms) => {
                for (i, form) in forms.iter().enumerate() {
                    if i > 0 {
                        f.write_char('\n')?;
                    }
                    write!(f, "{}", form)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(line: u32, column: u32) -> Position {
        Position {
            file: KString::from_ref("<test>"),
            line,
            column,
        }
    }

    #[test]
    fn equality_ignores_positions() {
        let a = Value::Symbol(Symbol {
            name: KString::from_ref("x"),
            position: at(1, 1),
        });
        let b = Value::Symbol(Symbol {
            name: KString::from_ref("x"),
            position: at(9, 9),
        });
        assert_eq!(a, b);

        let read = Value::Vector(Vector {
            values: vec![Value::Int(1)],
            position: at(1, 1),
        });
        let built = Value::Vector(Vector {
            values: vec![Value::Int(1)],
            position: Position::default(),
        });
        assert_eq!(read, built);
    }

    #[test]
    fn sets_compare_as_unordered() {
        let a = Value::Set(Set {
            values: vec![Value::Int(1), Value::Int(2)],
            position: Position::default(),
        });
        let b = Value::Set(Set {
            values: vec![Value::Int(2), Value::Int(1)],
            position: Position::default(),
        });
        assert_eq!(a, b);
    }

    #[test]
    fn only_non_composites_are_hashable() {
        assert!(Value::Int(3).is_hashable());
        assert!(Value::Keyword(KString::from_ref("k")).is_hashable());
        assert!(symbol("s").is_hashable());
        assert!(!Value::list(vec![]).is_hashable());
        assert!(!Value::Vector(Vector {
            values: vec![],
            position: Position::default(),
        })
        .is_hashable());
    }

    #[test]
    fn cloned_lists_share_their_cells() {
        let list = Value::list(vec![Value::Int(1)]);
        let alias = list.clone();
        if let Value::List(cells) = &alias {
            cells.borrow_mut().values.push(Value::Int(2));
        }
        assert_eq!(list, Value::list(vec![Value::Int(1), Value::Int(2)]));
        if let (Value::List(a), Value::List(b)) = (&list, &alias) {
            assert!(Rc::ptr_eq(a, b));
        }
    }

    #[test]
    fn rendering_reverses_the_escape_table() {
        let s = Value::String(KString::from_ref("a\tb\"c"));
        assert_eq!(s.to_string(), "\"a\\tb\\\"c\"");
        assert_eq!(Value::Char('\n').to_string(), "\\newline");
        assert_eq!(Value::Char('q').to_string(), "\\q");
        assert_eq!(Value::Float(12.0).to_string(), "12.0");
        assert_eq!(
            Value::list(vec![symbol("quote"), symbol("x")]).to_string(),
            "(quote x)"
        );
    }
}
