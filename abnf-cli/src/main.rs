// abnf-parser. An ABNF (RFC 5234) grammar parser.
// Copyright (c) 2026 abnf-parser contributors
//
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or http://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. All files in the project carrying such notice may not be copied,
// modified, or distributed except according to those terms.

//! Parses an ABNF grammar file and prints its syntax tree.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use abnf::ast::{Radix, UNBOUNDED};
use abnf::Visitor;
use anyhow::{Context as _, Result};
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "abnf",
    version,
    about = "Parse an ABNF (RFC 5234) grammar and print its syntax tree"
)]
struct Cli {
    /// Grammar file to parse.
    grammar: PathBuf,

    /// Print only the number of rules.
    #[arg(long)]
    count: bool,

    /// Reject quoted strings longer than LEN characters (0 = unlimited).
    #[arg(long, value_name = "LEN", default_value_t = 0)]
    max_string_len: usize,
}

struct TreePrinter {
    depth: usize,
}

impl TreePrinter {
    fn line(&self, text: &str) {
        println!("{:pad$}{text}", "", pad = self.depth * 2);
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth -= 1;
    }
}

fn bounds(lower: u64, upper: u64) -> String {
    if upper == UNBOUNDED {
        format!("{lower}..*")
    } else {
        format!("{lower}..{upper}")
    }
}

impl Visitor for TreePrinter {
    fn begin_document(&mut self) {
        self.open("DOCUMENT");
    }

    fn end_document(&mut self) {
        self.close();
    }

    fn begin_rule(&mut self, name: &str) {
        self.open(&format!("RULE {name}"));
    }

    fn end_rule(&mut self) {
        self.close();
    }

    fn begin_alternation(&mut self) {
        self.open("ALTERNATION");
    }

    fn end_alternation(&mut self) {
        self.close();
    }

    fn begin_concatenation(&mut self) {
        self.open("CONCATENATION");
    }

    fn end_concatenation(&mut self) {
        self.close();
    }

    fn begin_repetition(&mut self, lower: u64, upper: u64) {
        self.open(&format!("REPETITION {}", bounds(lower, upper)));
    }

    fn end_repetition(&mut self) {
        self.close();
    }

    fn begin_group(&mut self) {
        self.open("GROUP");
    }

    fn end_group(&mut self) {
        self.close();
    }

    fn begin_option(&mut self) {
        self.open("OPTION");
    }

    fn end_option(&mut self) {
        self.close();
    }

    fn rulename(&mut self, name: &str) {
        self.line(&format!("RULENAME {name}"));
    }

    fn quoted_string(&mut self, text: &str) {
        self.line(&format!("QUOTED STRING {text:?}"));
    }

    fn prose(&mut self, text: &str) {
        self.line(&format!("PROSE {text:?}"));
    }

    fn number(&mut self, radix: Radix, digits: &str) {
        self.line(&format!("NUMBER %{}{digits}", radix.prefix()));
    }

    fn number_range(&mut self, radix: Radix, from: &str, to: &str) {
        let prefix = radix.prefix();
        self.line(&format!("NUMBER RANGE %{prefix}{from}-%{prefix}{to}"));
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let source = fs::read_to_string(&cli.grammar)
        .with_context(|| format!("reading {}", cli.grammar.display()))?;

    let tree = abnf::parse_with_limit(&source, cli.max_string_len);

    if let Some(err) = tree.error() {
        eprintln!("{}: {err}", cli.grammar.display());
        return Ok(false);
    }

    if cli.count {
        println!("{}", tree.rules_count());
    } else {
        let mut printer = TreePrinter { depth: 0 };
        tree.traverse(&mut printer);
        println!("{} rules", tree.rules_count());
    }

    Ok(true)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
