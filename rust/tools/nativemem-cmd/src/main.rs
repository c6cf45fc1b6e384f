use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod utils;

#[derive(Parser)]
#[command(name = "nativemem-cmd")]
#[command(about = "Diagnostics for native memory access and platform capabilities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print platform capabilities (64-bit, library handle, page sizes, byte order)
    Probe {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Allocate a direct buffer, fill a sub-range through its native address and dump it
    Fill {
        /// Buffer size in bytes
        #[arg(long, default_value_t = 32)]
        size: usize,

        /// Byte value to fill with (decimal or 0x-prefixed hex)
        #[arg(long, value_parser = utils::parse_byte)]
        value: u8,

        /// Offset of the filled range
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Length of the filled range (defaults to the rest of the buffer)
        #[arg(long)]
        len: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Probe { json } => commands::probe::run(json),
        Commands::Fill {
            size,
            value,
            offset,
            len,
        } => commands::fill::run(size, value, offset, len),
    }
}
