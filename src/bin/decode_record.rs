//! Decode one captured camera record and print it.
//!
//! Usage: `decode_record [--half-step] <kind> [hex]`
//!
//! `kind` is one of `group1`..`group5`, `focus`, `api-config`, `capt-status`,
//! `pict-file-info2`. Without `hex` the bytes are read from stdin. Whitespace and `0x`
//! prefixes in the hex text are ignored. Set `RUST_LOG=debug` to see checksum and
//! directory-count diagnostics.

use anyhow::{anyhow, bail, Context};
use sigma_ptp_codec::{dump, ApexStep, RecordKind};
use std::io::Read;
use tracing_subscriber::EnvFilter;

fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let cleaned: String = text
        .split_whitespace()
        .map(|t| t.trim_start_matches("0x").trim_start_matches("0X"))
        .collect::<Vec<_>>()
        .concat();
    hex::decode(&cleaned).context("invalid hex input")
}

fn usage() -> String {
    let kinds: Vec<&str> = RecordKind::ALL.iter().map(|k| k.short_name()).collect();
    format!("usage: decode_record [--half-step] <{}> [hex]", kinds.join("|"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut raw_args: Vec<String> = std::env::args().skip(1).collect();
    let step = if let Some(pos) = raw_args.iter().position(|a| a == "--half-step") {
        raw_args.remove(pos);
        ApexStep::Half
    } else {
        ApexStep::Third
    };

    let mut args = raw_args.into_iter();
    let kind_name = args.next().ok_or_else(|| anyhow!(usage()))?;
    let kind = RecordKind::from_short_name(&kind_name)
        .ok_or_else(|| anyhow!("unknown record kind {:?}\n{}", kind_name, usage()))?;

    let text = match args.next() {
        Some(first) => std::iter::once(first).chain(args).collect::<Vec<_>>().join(" "),
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s).context("read stdin")?;
            s
        }
    };
    let bytes = parse_hex(&text)?;
    if bytes.is_empty() {
        bail!("no input bytes\n{}", usage());
    }

    let decoded = kind
        .decode(&bytes)
        .with_context(|| format!("decode {} ({} bytes)", kind.short_name(), bytes.len()))?;
    print!("{}", dump::render(&decoded, step));
    Ok(())
}
