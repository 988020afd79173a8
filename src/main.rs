#[macro_use]
extern crate clap;

mod generate;
use generate::*;

use std::fs::File;

use anyhow::Context;
use clap::{App, Arg};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let matches = App::new("hdr2term")
        .version(crate_version!())
        .about("Generate Python terminology enums from a vendor #define header")
        .arg(
            Arg::with_name("INPUT")
                .help("C header file containing #define terminology constants")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("OUTPUT")
                .help("Destination Python source file")
                .required(true)
                .index(2),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("OUTPUT").unwrap();

    let src =
        File::open(input).with_context(|| format!("unable to open input header {}", input))?;
    let terms = extract_terminology(src)
        .with_context(|| format!("failed to extract terminology from {}", input))?;

    // The destination is only created once classification has succeeded, so
    // a malformed key never leaves a truncated file behind.
    let mut dest =
        File::create(output).with_context(|| format!("unable to create output {}", output))?;
    print_terminology(&terms, &mut dest)
        .with_context(|| format!("failed to write {}", output))?;

    Ok(())
}
