// Copyright 2026 the formic developers. See the COPYRIGHT file at
// the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use anyhow::Result;
use clap::Parser;
use formic::reader::Reader;
use formic::value::Value;
use std::path::PathBuf;

/// Read a file of forms and print them back, one per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Print the position each top-level form was read at
    #[arg(short, long)]
    positions: bool,
    /// Print the Debug representation instead of the readable rendering
    #[arg(long)]
    dump: bool,
    /// Path to the input file
    input_path: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut rd = Reader::open(&args.input_path)?;
    let forms = match rd.all()? {
        Value::Module(forms) => forms,
        other => vec![other],
    };

    for form in &forms {
        if args.positions {
            match form.position() {
                Some(pos) => print!("{pos}\t"),
                None => print!("{}:-:-\t", args.input_path.display()),
            }
        }
        if args.dump {
            println!("{form:?}");
        } else {
            println!("{form}");
        }
    }
    Ok(())
}
