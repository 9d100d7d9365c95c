//! dwranges - Decode DWARF address range lists
//!
//! Usage:
//!   dwranges <section> units                              List .debug_rnglists units
//!   dwranges <section> list --offset <off>                Decode the list at a section offset
//!   dwranges <section> list --unit-base <b> --index <i>   Decode an indexed list

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use dwranges_core::Endianness;
use dwranges_formats::dwarf::{
    AddressRangeList, AddressTable, AddressTableHeader, ListOffset, RangeListConfig, SectionKind,
};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dwranges")]
#[command(about = "Decode DWARF address range lists from raw section data", long_about = None)]
struct Cli {
    /// Path to the raw .debug_ranges or .debug_rnglists contents
    section: PathBuf,

    #[command(subcommand)]
    command: Commands,

    /// Section encoding
    #[arg(short, long, default_value = "debug-ranges", value_parser = parse_kind)]
    kind: SectionKind,

    /// Address width in bytes for .debug_ranges
    #[arg(long, default_value_t = 8)]
    address_size: u8,

    /// Section data is big-endian
    #[arg(long)]
    big_endian: bool,

    /// Path to the raw .debug_addr contents
    #[arg(long)]
    addr_section: Option<PathBuf>,

    /// Byte offset of the unit's address table (DW_AT_addr_base)
    #[arg(long, value_parser = parse_number, conflicts_with = "addr_header")]
    addr_base: Option<u64>,

    /// Take the address table base from the .debug_addr header at offset 0
    #[arg(long, requires = "addr_section")]
    addr_header: bool,

    /// Address width in bytes of .debug_addr entries
    #[arg(long, default_value_t = 8)]
    addr_size: u8,

    /// Initial base address (the unit's low_pc)
    #[arg(short, long, default_value = "0", value_parser = parse_number)]
    base: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the units of a .debug_rnglists section
    Units,
    /// Decode one range list
    List {
        /// Section offset of the list
        #[arg(short, long, value_parser = parse_number, conflicts_with_all = ["unit_base", "index"])]
        offset: Option<u64>,
        /// Base offset of the owning unit, for indexed access
        #[arg(long, value_parser = parse_number, requires = "index")]
        unit_base: Option<u64>,
        /// Index into the unit's offset array
        #[arg(short, long, value_parser = parse_number, requires = "unit_base")]
        index: Option<u64>,
    },
}

/// Parses `0x`-prefixed hex or plain decimal.
fn parse_number(s: &str) -> Result<u64, String> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    }
    .map_err(|e| e.to_string())
}

fn parse_kind(s: &str) -> Result<SectionKind, String> {
    SectionKind::parse(s).ok_or_else(|| format!("unknown section kind: {s}"))
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let data = fs::read(&cli.section)
        .with_context(|| format!("Failed to read section: {}", cli.section.display()))?;
    let addr_data = match &cli.addr_section {
        Some(path) => Some(
            fs::read(path).with_context(|| format!("Failed to read address table: {}", path.display()))?,
        ),
        None => None,
    };

    let endianness = if cli.big_endian {
        Endianness::Big
    } else {
        Endianness::Little
    };

    let mut config = RangeListConfig {
        kind: cli.kind,
        ..RangeListConfig::default()
    }
    .with_endianness(endianness)
    .with_address_size(cli.address_size);

    let mut addr_base = cli.addr_base;
    if let Some(addr_data) = &addr_data {
        let mut addr_size = cli.addr_size;
        if cli.addr_header {
            let header = AddressTableHeader::parse(addr_data, 0, endianness)
                .context("Failed to parse .debug_addr header")?;
            debug!(
                addr_base = header.addr_base,
                address_size = header.address_size,
                "read address table header"
            );
            addr_base = Some(header.addr_base);
            addr_size = header.address_size;
        }
        let table = AddressTable::new(addr_data, addr_size, endianness)
            .context("Invalid address table")?;
        config = config.with_address_table(table);
    }

    debug!(
        section = %cli.section.display(),
        size = data.len(),
        kind = cli.kind.section_name(),
        endianness = endianness.name(),
        "loaded section"
    );

    let list = AddressRangeList::new(&data, config)
        .with_context(|| format!("Failed to parse {}", cli.kind.section_name()))?;

    match cli.command {
        Commands::Units => print_units(&list)?,
        Commands::List {
            offset,
            unit_base,
            index,
        } => {
            let offset = match (offset, unit_base, index) {
                (Some(offset), _, _) => ListOffset::Direct(offset),
                (None, Some(unit_base), Some(index)) => ListOffset::Indexed { unit_base, index },
                _ => bail!("Specify either --offset or --unit-base with --index"),
            };
            print_list(&list, offset, cli.base, addr_base)?;
        }
    }

    Ok(())
}

fn print_units(list: &AddressRangeList) -> Result<()> {
    if !list.is_dwarf5() {
        bail!("{} has no unit headers", list.kind().section_name());
    }

    println!(
        "{:<10} {:<10} {:<10} {:<8} {:<4} {:<6} {:<8}",
        "Unit", "Base", "End", "Format", "Ver", "AddrSz", "Offsets"
    );
    println!("{}", "-".repeat(62));

    for unit in list.units() {
        let format = if unit.format.is_64bit() { "DWARF64" } else { "DWARF32" };
        println!(
            "{:#010x} {:#010x} {:#010x} {:<8} {:<4} {:<6} {:<8}",
            unit.unit_offset,
            unit.base_offset,
            unit.end_offset,
            format,
            unit.version,
            unit.address_size,
            unit.offset_entry_count
        );
        for (index, offset) in unit.offsets.iter().enumerate() {
            println!("  [{index}] {:#x} -> {:#x}", offset, unit.base_offset.wrapping_add(*offset));
        }
    }

    Ok(())
}

fn print_list(list: &AddressRangeList, offset: ListOffset, base: u64, addr_base: Option<u64>) -> Result<()> {
    let ranges = list
        .range_list(offset, base, addr_base)
        .with_context(|| format!("Failed to decode range list at {offset:?}"))?;

    for range in &ranges {
        println!("{range}");
    }
    println!("min: {:#x}", AddressRangeList::ranges_min(&ranges));

    Ok(())
}
