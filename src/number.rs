// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classification of numeric tokens.

use crate::error::ReadError;
use crate::value::Value;

/// Convert a complete numeric token (sign included) into an integer or
/// float value. The grammar, tried in order after stripping the sign:
/// hex (`0x`), binary (`0b`), arbitrary radix (`<base>r<digits>`, base
/// 2..=36), float (the token contains a dot or an exponent), octal
/// (leading zero), decimal. Anything that fits none of these — or
/// overflows 64 bits — is an invalid number.
pub fn parse(token: &str) -> Result<Value, ReadError> {
    let (negative, body) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.strip_prefix('+').unwrap_or(token)),
    };
    if let Some(digits) = body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        return integer(token, negative, digits, 16);
    }
    if let Some(digits) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        return integer(token, negative, digits, 2);
    }
    if body.contains('r') {
        return radix(token, negative, body);
    }
    if body.contains('.') || body.contains('e') || body.contains('E') {
        return match token.parse::<f64>() {
            Ok(x) => Ok(Value::Float(x)),
            Err(_) => Err(invalid(token)),
        };
    }
    if body.len() > 1 && body.starts_with('0') {
        return integer(token, negative, &body[1..], 8);
    }
    integer(token, negative, body, 10)
}

fn invalid(token: &str) -> ReadError {
    ReadError::InvalidNumber(token.to_string())
}

/// `<base>r<digits>` with a decimal base. A dot anywhere makes the
/// whole token invalid, as do missing digits and bases outside 2..=36.
fn radix(token: &str, negative: bool, body: &str) -> Result<Value, ReadError> {
    if body.contains('.') {
        return Err(invalid(token));
    }
    let (base, digits) = match body.split_once('r') {
        Some(parts) => parts,
        None => return Err(invalid(token)),
    };
    let base: u32 = base.parse().map_err(|_| invalid(token))?;
    if !(2..=36).contains(&base) {
        return Err(invalid(token));
    }
    integer(token, negative, digits, base)
}

fn integer(token: &str, negative: bool, digits: &str, base: u32) -> Result<Value, ReadError> {
    // the sign was stripped up front; a second one inside is malformed
    if digits.is_empty() || digits.starts_with(|c| c == '+' || c == '-') {
        return Err(invalid(token));
    }
    let magnitude = u64::from_str_radix(digits, base).map_err(|_| invalid(token))?;
    signed(negative, magnitude)
        .map(Value::Int)
        .ok_or_else(|| invalid(token))
}

// i64::MIN is one past i64::MAX in magnitude, so the negative branch
// admits it while anything further out remains an overflow error.
fn signed(negative: bool, magnitude: u64) -> Option<i64> {
    if negative {
        if magnitude <= i64::MAX as u64 + 1 {
            Some((magnitude as i128).wrapping_neg() as i64)
        } else {
            None
        }
    } else {
        i64::try_from(magnitude).ok()
    }
}
