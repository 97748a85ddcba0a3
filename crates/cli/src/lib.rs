//! `prpm-convert`: a thin command-line layer over `prpm-convert`.

pub mod cli;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use prpm_canonical::{
    from_legacy_type, to_legacy_type, CanonicalPackage, Format, PackageInput, Subtype,
};
use prpm_convert::{
    convert, convert_to_all, detect_format, parse_package, ConversionOptions, ConversionResult,
};
use tracing::debug;

use crate::cli::{Cli, Commands, Target};

/// The main entry point for the `prpm-convert` binary.
pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = execute(cli.command)?;
    print!("{output}");
    Ok(())
}

/// Runs one command and returns what it prints.
pub fn execute(command: Commands) -> Result<String> {
    match command {
        Commands::Convert {
            file,
            from,
            to,
            subtype,
            options,
            id,
            name,
            output,
            json,
        } => {
            let request = ConvertRequest {
                file,
                from,
                to,
                subtype,
                options,
                id,
                name,
                output,
                json,
            };
            convert_command(&request)
        }
        Commands::Detect { file, json } => detect_command(&file, json),
        Commands::Taxonomy {
            legacy,
            format,
            subtype,
        } => taxonomy_command(legacy.as_deref(), format, subtype),
    }
}

/// Arguments of the `convert` command.
#[derive(Debug, Clone)]
pub struct ConvertRequest {
    pub file: PathBuf,
    pub from: Option<Format>,
    pub to: Target,
    pub subtype: Option<Subtype>,
    pub options: Option<PathBuf>,
    pub id: String,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Reads a TOML options file.
pub fn load_options(path: &Path) -> Result<ConversionOptions> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read options file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid options file {}", path.display()))
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn convert_command(request: &ConvertRequest) -> Result<String> {
    let content = read_source(&request.file)?;
    let options = match &request.options {
        Some(path) => load_options(path)?,
        None => ConversionOptions::default(),
    };

    let mut input = PackageInput::new(request.id.clone());
    if let Some(name) = &request.name {
        input = input.with_name(name.clone());
    }
    let mut pkg = parse_package(&content, &input, request.from, request.subtype);
    if request.name.is_none() && pkg.name == pkg.id {
        if let Some(stem) = request.file.file_stem().and_then(|s| s.to_str()) {
            debug!(name = stem, "Naming package after source file");
            pkg.name = stem.to_string();
        }
    }
    render_command(request, &pkg, &options)
}

fn render_command(
    request: &ConvertRequest,
    pkg: &CanonicalPackage,
    options: &ConversionOptions,
) -> Result<String> {
    let results = match request.to {
        Target::One(format) => vec![convert(pkg, format, options)],
        Target::All => convert_to_all(pkg, options),
    };
    for result in &results {
        for warning in &result.warnings {
            eprintln!("warning [{}]: {warning}", result.format);
        }
    }

    if let Some(path) = &request.output {
        let [result] = results.as_slice() else {
            bail!("--output needs a single target format, not `all`");
        };
        std::fs::write(path, &result.content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        return Ok(format!(
            "Wrote {} ({}, quality {})\n",
            path.display(),
            result.format,
            result.quality_score
        ));
    }

    if request.json {
        let json = match results.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            all => serde_json::to_string_pretty(all)?,
        };
        return Ok(format!("{json}\n"));
    }
    Ok(render_text(&results))
}

fn render_text(results: &[ConversionResult]) -> String {
    if let [single] = results {
        return single.content.clone();
    }
    let mut out = String::new();
    for result in results {
        let _ = writeln!(
            out,
            "==> {} (quality {}{}) <==",
            result.format,
            result.quality_score,
            if result.lossy_conversion { ", lossy" } else { "" }
        );
        out.push_str(&result.content);
        if !result.content.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

fn detect_command(file: &Path, json: bool) -> Result<String> {
    let content = read_source(file)?;
    let detected = detect_format(&content);
    let pkg = parse_package(&content, &PackageInput::new("local"), detected, None);
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(&pkg)?));
    }
    let format = match detected {
        Some(format) => format.to_string(),
        None => format!("unknown (treated as {})", Format::Generic),
    };
    Ok(format!(
        "format: {format}\nsubtype: {}\ntype: {}\n",
        pkg.subtype(),
        pkg.legacy_type()
    ))
}

fn taxonomy_command(legacy: Option<&str>, format: Option<Format>, subtype: Option<Subtype>) -> Result<String> {
    match (legacy, format) {
        (Some(legacy), _) => {
            let taxonomy = from_legacy_type(legacy);
            Ok(format!(
                "format: {}\nsubtype: {}\n",
                taxonomy.format, taxonomy.subtype
            ))
        }
        (None, Some(format)) => Ok(format!("{}\n", to_legacy_type(format, subtype))),
        (None, None) => bail!("Pass a legacy type or --format"),
    }
}
