use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const ABOUT: &str = "A command-line AES-256 encryption/decryption tool";
const LONG_ABOUT: &str = "\
aes256-cli is a flexible tool for encrypting and decrypting files with AES-256 \
using any of seven block chaining modes (ECB, CBC, PCBC, CFB-128, CFB-8, OFB, CTR) \
and four padding schemes. Use this tool to encrypt or decrypt data from files.";

#[derive(Parser, Debug)]
#[command(name = "aes256-cli", version, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Opts {
    /// 32-byte secret key, given as a hex string.
    #[clap(short, long)]
    pub secret: String,

    /// Seed (at least 16 bytes, as hex) for the IV generator. Needed
    /// whenever encryption should use a fresh random IV rather than
    /// one supplied via --iv.
    #[clap(long)]
    pub seed: Option<String>,

    /// Fixed initialization vector (16 bytes, as hex). When set, every
    /// encryption uses this IV instead of a randomly generated one.
    #[clap(long)]
    pub iv: Option<String>,

    /// Padding scheme for ECB, CBC and PCBC. Defaults to ISO/IEC 7816-4.
    #[clap(long, value_enum)]
    pub padding: Option<Padding>,

    /// Source file path to load the plaintext/ciphertext from.
    #[clap(short, long)]
    pub file: PathBuf,

    /// Destination file path to store the result.
    #[clap(short, long)]
    pub dest: Option<PathBuf>,

    /// Which block chaining mode to use.
    #[command(subcommand)]
    pub mode: Mode,

    /// What action to perform, either encrypt or decrypt.
    #[clap(short, long)]
    pub action: Action,
}

impl Opts {
    pub fn dest_path(&self) -> PathBuf {
        if let Some(path) = &self.dest {
            return path.clone();
        }

        let mut path = PathBuf::new();
        path.push("./");
        path.push("processed.bin");

        path
    }
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum Mode {
    /// Electronic Codebook mode
    ECB,

    /// Cipher Block Chaining mode
    CBC,

    /// Propagating Cipher Block Chaining mode
    PCBC,

    /// Cipher Feedback (128-bit) mode
    CFB128,

    /// Cipher Feedback (8-bit) mode
    CFB8,

    /// Output Feedback mode
    OFB,

    /// Counter mode
    CTR,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Padding {
    Pkcs7,
    AnsiX923,
    Iso78164,
    AllNull,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Action {
    Encrypt,
    Decrypt,
}
