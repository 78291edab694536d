mod opts;

use std::fs;

use aes256_core::{BlockMode, Engine, PaddingMode};
use anyhow::{Context, Result};
use clap::Parser;

use opts::{Action, Mode, Opts, Padding};

fn main() -> Result<()> {
    let opts = Opts::parse();

    let block_mode = to_block_mode(opts.mode);
    let padding = opts
        .padding
        .map(to_padding_mode)
        .unwrap_or(PaddingMode::Iso7816_4);

    let mut engine = match &opts.seed {
        Some(seed) => {
            let key = hex::decode(&opts.secret).context("secret key must be a hex string")?;
            let seed = hex::decode(seed).context("seed must be a hex string")?;
            Engine::with_seed(&key, &seed, block_mode, padding)?
        }
        None => Engine::from_hex_key(&opts.secret, block_mode, padding)
            .context("secret key must be a hex string")?,
    };

    if let Some(iv) = &opts.iv {
        engine
            .set_iv_from_hex(iv)
            .context("IV must be a hex string")?;
    }

    let input = fs::read(&opts.file)
        .with_context(|| format!("reading input file {:?}", opts.file))?;

    let output = match opts.action {
        Action::Encrypt => engine.encrypt(&input, false),
        Action::Decrypt => engine.decrypt(&input, false)?,
    };

    let dest = opts.dest_path();
    fs::write(&dest, output).with_context(|| format!("writing output file {:?}", dest))?;

    Ok(())
}

fn to_block_mode(mode: Mode) -> BlockMode {
    match mode {
        Mode::ECB => BlockMode::Ecb,
        Mode::CBC => BlockMode::Cbc,
        Mode::PCBC => BlockMode::Pcbc,
        Mode::CFB128 => BlockMode::Cfb128,
        Mode::CFB8 => BlockMode::Cfb8,
        Mode::OFB => BlockMode::Ofb,
        Mode::CTR => BlockMode::Ctr,
    }
}

fn to_padding_mode(padding: Padding) -> PaddingMode {
    match padding {
        Padding::Pkcs7 => PaddingMode::Pkcs7,
        Padding::AnsiX923 => PaddingMode::AnsiX923,
        Padding::Iso78164 => PaddingMode::Iso7816_4,
        Padding::AllNull => PaddingMode::AllNull,
    }
}
