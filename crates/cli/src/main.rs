//! Command-line entry point for `prpm-convert`.
//!
//! All behavior lives in the `prpm_convert_cli` library so it can be tested
//! without spawning a process.

fn main() -> anyhow::Result<()> {
    prpm_convert_cli::run()
}
