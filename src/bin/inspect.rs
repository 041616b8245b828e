//! DDFF Inspector
//!
//! Lists blocks, inventory tags, members and periods of a DDFF file, and
//! dumps stream values as text.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ddff::container::scan_blocks;
use ddff::cursor::Values;
use ddff::{Config, Inventory, MemberKey, Result, TagIndex};
use tracing_subscriber::{fmt, EnvFilter};

/// DDFF Inspector
#[derive(Parser, Debug)]
#[command(name = "ddff-inspect")]
#[command(about = "Inspect DDFF multi-stream log files")]
#[command(version)]
struct Args {
    /// DDFF file to inspect
    file: PathBuf,

    /// Log every block while scanning
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every block header in file order
    Blocks,

    /// List inventory tags
    Keys,

    /// List the members of a stream
    Members {
        /// Inventory tag of the stream
        tag: String,
    },

    /// List named periods
    Periods,

    /// Print the ticks and values of a stream
    Dump {
        /// Inventory tag of the stream
        tag: String,

        /// Member to print (whole payload if omitted)
        #[arg(short, long)]
        member: Option<String>,

        /// Restrict output to a named period
        #[arg(short, long)]
        period: Option<String>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ddff=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::builder().verbose(args.verbose).build();

    match args.command {
        Commands::Blocks => {
            println!("offset\tstream\tblock\tsize\tfill\tfirst\tnext");
            for location in scan_blocks(&args.file)? {
                let h = location.header;
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    location.offset,
                    h.stream_id,
                    h.block_number,
                    h.block_size,
                    h.fill,
                    h.first_object_offset,
                    h.next_offset
                );
            }
        }
        Commands::Keys => {
            let inventory = Inventory::open(&args.file, config)?;
            for (tag, entry) in inventory.inventory() {
                let records = inventory.get(tag)?.len();
                println!("{}\t{}\t{}\t{}", tag, entry.stream_id, entry.schema.class, records);
            }
        }
        Commands::Members { tag } => {
            let inventory = Inventory::open(&args.file, config)?;
            let entry = inventory.entry(&tag)?;
            for (i, name) in entry.schema.member_names().enumerate() {
                println!("{}\t{}", i, name);
            }
        }
        Commands::Periods => {
            let tags = TagIndex::open(&args.file, config)?;
            for period in tags.index().iter() {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    period.name, period.index0, period.index1, period.cycle, period.time
                );
            }
        }
        Commands::Dump { tag, member, period } => {
            let key = MemberKey::from(member.as_deref());
            match period {
                // Only files with a period catalogue in stream 1 need the tag layer
                Some(period) => {
                    let tags = TagIndex::open(&args.file, config)?;
                    let ticks = tags.time(&tag, &period)?;
                    let values = tags.values(&tag, Some(&period), key)?;
                    print_rows(ticks, values);
                }
                None => {
                    let inventory = Inventory::open(&args.file, config)?;
                    let ticks = inventory.time(&tag)?;
                    let values = inventory.member(&tag, key)?;
                    print_rows(ticks, values);
                }
            }
        }
    }

    Ok(())
}

fn print_rows<'a>(ticks: Values<'a>, values: Values<'a>) {
    for (tick, value) in ticks.zip(values) {
        println!("{}\t{}", tick, value);
    }
}
