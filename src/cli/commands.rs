use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "minichain", about = "Single-node proof-of-work ledger")]
pub struct Opt {
    #[arg(
        long = "db-path",
        global = true,
        help = "Directory of the block database (overrides DB_PATH)"
    )]
    pub db_path: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Leading zero bits required of a block hash (overrides DIFFICULTY_BITS)"
    )]
    pub difficulty: Option<u32>,

    #[arg(
        long,
        global = true,
        help = "Number of mining threads (overrides MINING_WORKERS)"
    )]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    #[command(name = "createblockchain", about = "Create a new blockchain")]
    Createblockchain {
        #[arg(help = "The address to send genesis block reward to")]
        address: String,
    },
    #[command(name = "mineblock", about = "Mine a block paying the reward to an address")]
    Mineblock {
        #[arg(help = "The address to send the block reward to")]
        address: String,
    },
    #[command(name = "printchain", about = "Print blockchain all block")]
    Printchain,
    #[command(
        name = "verifychain",
        about = "Re-check proof-of-work and linkage of every stored block"
    )]
    Verifychain,
    #[command(name = "validateaddress", about = "Check an address checksum")]
    Validateaddress {
        #[arg(help = "The address to check")]
        address: String,
    },
}
