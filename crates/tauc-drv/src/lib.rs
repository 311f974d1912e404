//! tauc-drv - Compiler Driver
//!
//! Orchestrates the pipeline:
//!
//! ```text
//! source text
//!      │
//!      ▼
//!  [Scanner] ──▶ tokens
//!      │
//!      ▼
//!  [Parser] ──▶ AST
//!      │
//!      ▼
//!  [Binder] ──▶ scopes + symbols
//!      │
//!      ▼
//!  [Type checker] ──▶ expression types
//!      │
//!      ▼
//!  [Frame layout] ──▶ offsets + frame sizes
//!      │
//!      ▼
//!  [Code generator] ──▶ instruction listing
//!      │
//!      ▼
//!  [VM] (optional --run)
//! ```
//!
//! The first diagnostic aborts the pipeline; the CLI exits 0 on success
//! and 1 on any error.

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use tauc_gen::{assign_frames, generate};
use tauc_lex::{Lexer, Token};
use tauc_par::{Parser, Program};
use tauc_sem::analyze;
use tauc_util::{CompileError, Result};
use tauc_vm::{Insn, Vm};

/// What the driver should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmitType {
    /// Scanner output
    Tokens,
    /// Parser output
    Ast,
    /// Full compilation to the instruction listing
    #[default]
    Insns,
}

/// One driver invocation.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input source file
    pub input: PathBuf,
    /// What to produce
    pub emit: EmitType,
    /// Execute the compiled program instead of dumping the listing
    pub run: bool,
}

impl Config {
    pub const USAGE: &'static str = "usage: tauc <file> [--emit tokens|ast|insns] [--run]";

    /// Parse command-line arguments (without the program name).
    pub fn from_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Config> {
        let mut input = None;
        let mut emit = EmitType::default();
        let mut run = false;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--run" => run = true,
                "--emit" => {
                    let what = args.next().context("--emit requires a value")?;
                    emit = match what.as_str() {
                        "tokens" => EmitType::Tokens,
                        "ast" => EmitType::Ast,
                        "insns" => EmitType::Insns,
                        _ => bail!("unknown emit kind `{what}`"),
                    };
                }
                _ if arg.starts_with('-') => bail!("unknown option `{arg}`\n{}", Self::USAGE),
                _ => {
                    if input.is_some() {
                        bail!("multiple input files\n{}", Self::USAGE);
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }
        let input = input.with_context(|| Self::USAGE.to_string())?;
        Ok(Config { input, emit, run })
    }
}

/// Scan source text.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::tokenize(source)
}

/// Scan and parse source text.
pub fn parse(source: &str) -> Result<Program> {
    Parser::parse(tokenize(source)?)
}

/// Compile source text all the way to the instruction listing.
pub fn compile(source: &str) -> Result<Vec<Insn>> {
    let program = parse(source)?;
    let (mut bindings, _types) = analyze(&program)?;
    let frames = assign_frames(&program, &mut bindings)?;
    generate(&program, &bindings, &frames)
}

/// Render an instruction listing for dumping. Debug aid; the format is
/// not normative.
pub fn render_listing(insns: &[Insn]) -> String {
    let mut out = String::new();
    for insn in insns {
        out.push_str(&insn.to_string());
        out.push('\n');
    }
    out
}

/// Execute one driver invocation.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&config.input)
        .with_context(|| format!("cannot read {}", config.input.display()))?;

    match config.emit {
        EmitType::Tokens => {
            let tokens = tokenize(&source).map_err(diagnostic)?;
            for token in &tokens {
                println!("{} at {}", token, token.span);
            }
        }
        EmitType::Ast => {
            let program = parse(&source).map_err(diagnostic)?;
            println!("{program:#?}");
        }
        EmitType::Insns => {
            let insns = compile(&source).map_err(diagnostic)?;
            if config.run {
                let vm = Vm::new(insns)?;
                for value in vm.run()? {
                    println!("{value}");
                }
            } else {
                print!("{}", render_listing(&insns));
            }
        }
    }
    Ok(())
}

/// Attach the source span to a diagnostic for display.
fn diagnostic(error: CompileError) -> anyhow::Error {
    let span = error.span();
    anyhow!("{error} at {span}")
}
