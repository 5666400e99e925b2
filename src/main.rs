// This is my main entry point for the minichain CLI application
// I'm importing the core components: the chain, its Sled store and the address helpers
use clap::Parser;
use data_encoding::HEXLOWER;
use log::{error, LevelFilter};
use minichain::{
    convert_address, decode_coinbase_payload, new_coinbase_payload, sha256_digest,
    validate_address, Blockchain, Command, Opt, ProofOfWork, SledBlockStore, SystemClock,
    GLOBAL_CONFIG, SUBSIDY,
};
use std::process;

fn main() {
    // I initialize logging so I can see what's happening while blocks are mined
    // Setting it to Info level gives me enough detail without being too verbose
    env_logger::builder().filter_level(LevelFilter::Info).init();

    // I parse the command line arguments using clap
    let opt = Opt::parse();

    // Command-line flags win over whatever came from the environment
    if let Some(db_path) = opt.db_path {
        GLOBAL_CONFIG.set_db_path(db_path);
    }
    if let Some(bits) = opt.difficulty {
        GLOBAL_CONFIG.set_difficulty_bits(bits);
    }
    if let Some(workers) = opt.workers {
        GLOBAL_CONFIG.set_mining_workers(workers);
    }

    // I run the actual command; if something goes wrong I log it and exit with code 1
    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

// I open the configured chain, failing if nobody has created it yet
fn open_blockchain() -> Result<Blockchain<SledBlockStore>, Box<dyn std::error::Error>> {
    let store = SledBlockStore::open(GLOBAL_CONFIG.get_db_path())?;
    Ok(Blockchain::open(store, GLOBAL_CONFIG.pow_config()?)?)
}

// This is where I handle all the different CLI commands
fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        // When I want to create a new blockchain, this is the genesis block creation
        Command::Createblockchain { address } => {
            if !validate_address(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            let store = SledBlockStore::open(GLOBAL_CONFIG.get_db_path())?;
            let coinbase = new_coinbase_payload(&address, SUBSIDY)?;
            let blockchain = Blockchain::create_blockchain(
                store,
                &coinbase,
                GLOBAL_CONFIG.pow_config()?,
                &SystemClock,
            )?;
            blockchain.get_store().flush()?;
            println!("Done!");
        }
        // When I want a new block on top of the tip, paying the reward to an address
        Command::Mineblock { address } => {
            if !validate_address(&address) {
                return Err(format!("Invalid address: {address}").into());
            }
            let blockchain = open_blockchain()?;
            let coinbase = new_coinbase_payload(&address, SUBSIDY)?;
            let block = blockchain.mine_block(&[coinbase], &SystemClock)?;
            blockchain.get_store().flush()?;
            println!(
                "Mined block {} at height {}",
                block.get_hash_hex(),
                block.get_height()
            );
        }
        // When I want to see the entire blockchain history, newest block first
        Command::Printchain => {
            let blockchain = open_blockchain()?;
            let pow_config = *blockchain.get_pow_config();
            for block in blockchain.iterator()? {
                let block = block?;
                println!(
                    "Pre block hash: {}",
                    HEXLOWER.encode(block.get_prev_block_hash())
                );
                println!("Cur block hash: {}", block.get_hash_hex());
                println!("Cur block Timestamp: {}", block.get_timestamp());
                println!("Height: {}, nonce: {}", block.get_height(), block.get_nonce());
                println!(
                    "PoW valid: {}",
                    ProofOfWork::validate_block(&block, &pow_config)?
                );

                for tx in block.get_transactions() {
                    let txid_hex = HEXLOWER.encode(sha256_digest(tx).as_slice());
                    println!("- Transaction hash: {txid_hex} ({} bytes)", tx.len());
                    // Reward payloads are the only transactions I know how to decode
                    if let Some(outputs) = decode_coinbase_payload(tx) {
                        for output in outputs.get_outputs() {
                            let address = convert_address(output.get_pub_key_hash());
                            println!("-- Output value = {}, to = {}", output.get_value(), address);
                        }
                    }
                }
                println!()
            }
        }
        // When I want to re-check every stored block against the current difficulty
        Command::Verifychain => {
            let blockchain = open_blockchain()?;
            let count = blockchain.verify_chain()?;
            println!("Chain is valid: {count} blocks checked");
        }
        Command::Validateaddress { address } => {
            if validate_address(&address) {
                println!("{address} is valid");
            } else {
                println!("{address} is NOT valid");
            }
        }
    }
    Ok(())
}
