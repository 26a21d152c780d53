use axia::avm;
use axia::common::{Address, Id, Network, NetworkConfig, SoftKeyChain, UtxoSet};
use axia::util::{epoch_secs, Amount};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// Builds and signs an asset chain transfer from the given UTXOs and prints the signed hex.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// A JSON network configuration. Overrides --network.
    #[clap(long)]
    config: Option<PathBuf>,
    /// A known network: main, test or local. Its chain ids must then be given below.
    #[clap(long, default_value = "local")]
    network: String,
    /// The asset chain id, cb58.
    #[clap(long)]
    chain_id: Option<Id>,
    /// The fee asset id, cb58.
    #[clap(long)]
    fee_asset: Option<Id>,
    /// The asset to send. Defaults to the fee asset.
    #[clap(long)]
    asset: Option<Id>,
    /// The private key, as `PrivateKey-<cb58>`.
    #[clap(long)]
    key: String,
    /// A UTXO owned by the key, cb58 or 0x-hex. Repeat for more.
    #[clap(long = "utxo", required = true)]
    utxos: Vec<String>,
    /// The destination address.
    #[clap(long)]
    to: Address,
    /// The amount, in whole coins.
    #[clap(long)]
    amount: Amount,
}

fn load_config(args: &Args) -> axia::Result<NetworkConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| axia::Error::BadArgument(format!("{}: {}", path.display(), e)))?;
            NetworkConfig::from_json(&json)?
        }
        None => {
            let network: Network = serde_json::from_value(serde_json::Value::String(args.network.clone()))
                .map_err(|e| axia::Error::BadArgument(format!("network {}: {}", args.network, e)))?;
            NetworkConfig::new(network)
        }
    };
    if let Some(id) = args.chain_id {
        config = config.with_asset_chain_id(id);
    }
    if let Some(id) = args.fee_asset {
        config = config.with_fee_asset_id(id);
    }
    Ok(config)
}

fn run(args: Args) -> axia::Result<()> {
    let config = load_config(&args)?;
    let mut kc = SoftKeyChain::new();
    let from = kc.import_key(&args.key)?;
    let mut utxos = UtxoSet::<avm::Output>::new();
    for s in &args.utxos {
        let id = utxos.add_utxo_str(s)?;
        debug!("loaded utxo {}", id);
    }
    let asset = match args.asset {
        Some(a) => a,
        None => config.fee_asset_id()?,
    };
    info!(
        "sending {} of {} from {} to {}",
        args.amount, asset, from, args.to
    );
    let mut builder = avm::TxBuilder::new(config);
    builder.set_as_of(epoch_secs());
    let unsigned = builder.build_base_tx(
        &utxos,
        asset,
        args.amount.0,
        &[args.to],
        &[from],
        &[from],
    )?;
    let tx = unsigned.sign(&kc)?;
    info!("signed tx {}", tx.id()?);
    println!("{}", tx.to_hex()?);
    Ok(())
}

fn main() {
    env_logger::init();
    let args: Args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("couldn't build transaction: {}", e);
        std::process::exit(1);
    }
}
