use axia::common::{FromHex, Tx, TxBody};
use axia::{avm, evm, platformvm};
use clap::{Parser, ValueEnum};
use log::info;
use serde::Serialize;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Chain {
    Asset,
    Platform,
    Evm,
}

/// Decodes a signed transaction and prints it as JSON.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The chain the transaction belongs to.
    #[clap(value_enum)]
    chain: Chain,
    /// The signed transaction, in hex.
    hex: String,
}

fn show<T: TxBody + Serialize>(hex: &str) -> axia::Result<()> {
    let tx = Tx::<T>::from_hex(hex.trim_start_matches("0x"))?;
    info!("decoded tx {} with {} credentials", tx.id()?, tx.credentials().len());
    let json = serde_json::to_string_pretty(&tx)
        .map_err(|e| axia::Error::BadData(format!("json: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn main() {
    env_logger::init();
    let args: Args = Args::parse();
    let result = match args.chain {
        Chain::Asset => show::<avm::Transaction>(&args.hex),
        Chain::Platform => show::<platformvm::Transaction>(&args.hex),
        Chain::Evm => show::<evm::Transaction>(&args.hex),
    };
    if let Err(e) = result {
        eprintln!("couldn't decode transaction: {}", e);
        std::process::exit(1);
    }
}
