use std::error::Error;
use std::fs;
use std::path::PathBuf;

use beacon_codec::{
    codec::generate_key,
    encode, examples,
    util::{log_error, read_key},
    Beacon, Params, PhaseEnvelope,
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Parser)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(short, default_value_t = 32)]
    k: usize,

    #[arg(short, default_value_t = 64)]
    q: u32,

    #[arg(long, default_value_t = 16)]
    chunk_bits: u32,
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Encode a file into a beacon bundle
    Encode {
        #[arg(long, required_unless_present = "key_file", conflicts_with = "key_file")]
        key: Option<String>,
        #[arg(long)]
        key_file: Option<PathBuf>,
        #[arg(long, required_unless_present = "auth_key_file", conflicts_with = "auth_key_file")]
        auth_key: Option<String>,
        #[arg(long)]
        auth_key_file: Option<PathBuf>,
        #[arg(long, conflicts_with = "phase_key_file")]
        phase_key: Option<String>,
        #[arg(long)]
        phase_key_file: Option<PathBuf>,
        #[arg(long, default_value_t = 0)]
        epoch: u32,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Decode a beacon bundle back into the original file
    Decode {
        #[arg(long, required_unless_present = "key_file", conflicts_with = "key_file")]
        key: Option<String>,
        #[arg(long)]
        key_file: Option<PathBuf>,
        #[arg(long, conflicts_with = "auth_key_file")]
        auth_key: Option<String>,
        #[arg(long)]
        auth_key_file: Option<PathBuf>,
        #[arg(long, conflicts_with = "phase_key_file")]
        phase_key: Option<String>,
        #[arg(long)]
        phase_key_file: Option<PathBuf>,
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Print a fresh random key as hex
    Keygen,
    /// Round-trip random payloads
    Selftest {
        #[arg(long, default_value_t = 256)]
        payload_len: usize,
        #[arg(long, default_value_t = 16)]
        payloads: usize,
    },
}

#[derive(Deserialize, Serialize)]
struct Bundle {
    beacon: Beacon,
    envelope: PhaseEnvelope,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let params = Params {
        modulus_count: args.k,
        levels: args.q,
        chunk_bits: args.chunk_bits,
    };
    params.validate()?;

    match args.command {
        Command::Encode {
            key,
            key_file,
            auth_key,
            auth_key_file,
            phase_key,
            phase_key_file,
            epoch,
            input,
            output,
        } => {
            let key = read_key(key.as_deref(), key_file.as_deref())?.ok_or("missing --key")?;
            let auth_key = read_key(auth_key.as_deref(), auth_key_file.as_deref())?
                .ok_or("missing --auth-key")?;
            let phase_key = read_key(phase_key.as_deref(), phase_key_file.as_deref())?;
            let payload = fs::read(input)?;

            let encoded = encode(
                &key,
                &payload,
                epoch,
                &auth_key,
                phase_key.as_deref(),
                &params,
            )?;
            let bundle = Bundle {
                envelope: PhaseEnvelope::seal(&encoded, phase_key.as_deref()),
                beacon: encoded.beacon,
            };
            fs::write(output, serde_json::to_vec(&bundle)?)?;
            println!("fingerprint {}", hex::encode(&bundle.beacon.fingerprint));
        }
        Command::Decode {
            key,
            key_file,
            auth_key,
            auth_key_file,
            phase_key,
            phase_key_file,
            input,
            output,
        } => {
            let key = read_key(key.as_deref(), key_file.as_deref())?.ok_or("missing --key")?;
            let phase_key = read_key(phase_key.as_deref(), phase_key_file.as_deref())?;
            let bundle: Bundle = serde_json::from_slice(&fs::read(input)?)?;

            if let Some(auth_key) = read_key(auth_key.as_deref(), auth_key_file.as_deref())? {
                let res = bundle.beacon.verify(&auth_key);
                let failed = res.is_err();
                log_error("signature check", res);
                if failed {
                    return Err("beacon signature does not verify".into());
                }
            }

            let decoded =
                bundle
                    .envelope
                    .open(&key, &bundle.beacon, phase_key.as_deref(), &params)?;
            fs::write(output, &decoded.payload)?;
            println!("alignment {:.4}", decoded.alignment);
        }
        Command::Keygen => {
            println!("{}", hex::encode(generate_key(rand::rngs::OsRng)));
        }
        Command::Selftest {
            payload_len,
            payloads,
        } => {
            let alignment = examples::roundtrip(&params, payload_len, payloads, rand::random())?;
            println!("mean alignment {:.4}", alignment);
        }
    }
    Ok(())
}
