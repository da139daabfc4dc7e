use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use tinygpu_asm::compile;
use tinygpu_asm::output::{render, to_le_bytes, Format};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Assemble tiny-gpu source into 16-bit program words"
)]
struct Opts {
    /// Assembly source (one instruction or label per line, `;` comments)
    #[arg(value_name = "SOURCE")]
    input: PathBuf,
    /// Write output here instead of stdout (required for `bin`)
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = Emit::Listing)]
    format: Emit,
    /// Fail if any instruction did not assemble
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Emit {
    Listing,
    Verbose,
    Hex,
    Json,
    /// raw little-endian words; implies --strict
    Bin,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    let compiled = compile(&text)?;

    let diags = compiled.diagnostics();
    for d in &diags {
        eprintln!("error: {d}");
    }
    anyhow::ensure!(
        !opts.strict || diags.is_empty(),
        "{} instruction(s) failed to assemble",
        diags.len()
    );

    let format = match opts.format {
        Emit::Bin => {
            let path = opts.output.ok_or_else(|| anyhow!("--format bin requires --output"))?;
            let words = compiled
                .into_words()
                .map_err(|d| anyhow!("{} instruction(s) failed to assemble", d.len()))?;
            fs::write(&path, to_le_bytes(&words))
                .with_context(|| format!("writing {}", path.display()))?;
            return Ok(());
        }
        Emit::Listing => Format::Listing,
        Emit::Verbose => Format::Verbose,
        Emit::Hex => Format::Hex,
        Emit::Json => Format::Json,
    };
    let rendered = render(&compiled, format)?;
    match opts.output {
        Some(path) => fs::write(&path, rendered).with_context(|| format!("writing {}", path.display()))?,
        None => print!("{rendered}"),
    }
    Ok(())
}
