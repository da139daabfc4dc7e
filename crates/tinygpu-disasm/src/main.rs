use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Write as _;
use std::path::Path;

use tinygpu_asm::decoder::decode;
use tinygpu_asm::disasm::fmt_with;
use tinygpu_asm::output::bit_string;
use tinygpu_disasm::{analyze, load_raw_bin, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "tiny-gpu program image disassembler", long_about = None)]
struct Cli {
    /// Word address of the first loaded word
    #[arg(long, default_value_t = 0usize)]
    base: usize,
    /// Skip N words at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input image (little-endian 16-bit words)
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit words loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble word addresses [start, end)
    Range {
        start: String,
        end: String,
        /// Show the raw word in binary next to each instruction
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Follow control flow from entry points
    Analyze {
        /// Entry addresses (hex or dec). Repeat flag to add multiple entries.
        #[arg(long = "entry", value_name = "ADDR", num_args = 1.., required = false)]
        entries: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Emit a labelled listing of reached code (text format only)
        #[arg(long)]
        listing: bool,
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat { Text, Json }

fn parse_addr(s: &str) -> Result<usize> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(usize::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<usize>()?)
    }
}

fn line(img: &Image, pc: usize, show_bytes: bool, labels: &std::collections::BTreeMap<usize, String>) -> Option<String> {
    let word = img.word(pc)?;
    let text = match decode(word) {
        Ok(d) => fmt_with(&d, |a| labels.get(&a).map(String::as_str)),
        Err(_) => format!(".word {word:#06x}"),
    };
    Some(if show_bytes {
        format!("{pc:#04x}: {}  {text}", bit_string(word))
    } else {
        format!("{pc:#04x}: {text}")
    })
}

fn emit(out: Option<String>, buf: &str) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, buf)?,
        None => print!("{buf}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len)?;

    match cli.cmd {
        Command::Range { start, end, show_bytes, out } => {
            let start = parse_addr(&start)?;
            let end = parse_addr(&end)?;
            anyhow::ensure!(end >= start, "end must be >= start");
            let labels = Default::default();
            let mut buf = String::new();
            for pc in start..end {
                let Some(l) = line(&img, pc, show_bytes, &labels) else {
                    let _ = writeln!(buf, "{pc:#04x}: <oob>");
                    break;
                };
                let _ = writeln!(buf, "{l}");
            }
            emit(out, &buf)?;
        }
        Command::Analyze { entries, format, listing, out } => {
            let mut seeds: Vec<usize> = if entries.is_empty() {
                vec![img.base]
            } else {
                entries.iter().map(|e| parse_addr(e)).collect::<Result<_>>()?
            };
            seeds.sort_unstable();
            seeds.dedup();
            let rep = analyze(&img, &seeds);

            match format {
                OutputFormat::Json => emit(out, &serde_json::to_string_pretty(&rep)?)?,
                OutputFormat::Text => {
                    let mut buf = String::new();
                    let _ = writeln!(buf, "Analysis summary:");
                    let _ = writeln!(buf, "  entries : {:?}", rep.entries);
                    let _ = writeln!(buf, "  insts   : {}", rep.reached.len());
                    let _ = writeln!(buf, "  edges   : {}", rep.edges.len());
                    let _ = writeln!(buf, "  rets    : {}", rep.rets.len());
                    let _ = writeln!(buf, "Edges:");
                    for e in &rep.edges {
                        let _ = writeln!(buf, "  {:#04x} -> {:#04x} ({:?})", e.from, e.to, e.kind);
                    }
                    if listing {
                        let _ = writeln!(buf, "\nListing (reached words):");
                        for &pc in &rep.reached {
                            if let Some(lbl) = rep.labels.get(&pc) {
                                let _ = writeln!(buf, "{lbl}:");
                            }
                            if let Some(l) = line(&img, pc, false, &rep.labels) {
                                let _ = writeln!(buf, "  {l}");
                            }
                        }
                    }
                    emit(out, &buf)?;
                }
            }
        }
    }
    Ok(())
}
