use std::io::{self, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;

use c8dasm::{BitInsight, ByteImage, Disassembler, DisassemblyOptions, ListingWriter};

#[derive(Parser, Debug)]
#[command(name = "c8dasm", author, version, about = "Disassemble a CHIP-8 ROM")]
struct Args {
    /// The ROM binary file to load.
    rom_file: PathBuf,

    /// Print a bit level breakdown of every decoding step.
    #[arg(short, long)]
    insight: bool,

    /// List bytes that were never decoded as `DB` directives.
    #[arg(short, long)]
    data: bool,

    /// Address the ROM is loaded at.
    #[arg(long, value_parser = parse_addr, default_value = "0x200")]
    base: u16,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_addr(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let options = DisassemblyOptions {
        base_address: args.base,
        data_directives: args.data,
    };

    let image = ByteImage::load(&args.rom_file, options.base_address)
        .with_context(|| format!("failed to load {}", args.rom_file.display()))?;

    let color = io::stdout().is_terminal();
    let name = args.rom_file.display().to_string();

    println!("\nCHIP-8 Disassembler\n");
    if color {
        println!("ROM File: {}", name.green().bold());
    } else {
        println!("ROM File: {}", name);
    }

    let writer = ListingWriter::from(options);
    let listing = if args.insight {
        let mut dasm = Disassembler::new(image).with_insight(BitInsight::stdout(color));
        dasm.run();
        dasm.listing(&writer)
    } else {
        let mut dasm = Disassembler::new(image);
        dasm.run();
        dasm.listing(&writer)
    };

    println!();
    print!("{}", listing);

    Ok(())
}
