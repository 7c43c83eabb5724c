use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vardiscover::config::StalePolicy;
use vardiscover::discovery::{self, FilePair};
use vardiscover::{DiscoveryConfig, VariableDiscoverer};

#[derive(Parser, Debug)]
#[command(name = "vardiscover", version, about = "Suggest semantic aliases for log template variables")]
struct Cli {
    /// Directory holding `*.zip.templates` / `*.zip.variables` files
    compressed_dir: PathBuf,

    /// Output alias config path
    #[arg(long = "output", short = 'o')]
    output: Option<PathBuf>,

    /// Archive name without `.zip`; defaults to the directory name
    #[arg(long = "zip-name")]
    zip_name: Option<String>,

    /// Aggregate every archive in the directory
    #[arg(long = "all", default_value_t = false)]
    all: bool,

    /// JSON discovery config
    #[arg(long = "config")]
    config: Option<PathBuf>,

    #[arg(long = "sample-limit")]
    sample_limit: Option<usize>,

    #[arg(long = "verbose", short = 'v', default_value_t = false)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<DiscoveryConfig> {
    let mut cfg = match &cli.config {
        Some(p) => DiscoveryConfig::from_path(p)?,
        None => DiscoveryConfig::default(),
    };
    if let Some(limit) = cli.sample_limit {
        cfg.sample_limit = limit;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cfg = load_config(&cli)?;
    let dir = cli.compressed_dir.as_path();

    let pairs = discovery::find_pairs(dir)
        .with_context(|| format!("cannot list {}", dir.display()))?;
    let name = cli.zip_name.clone().unwrap_or_else(|| discovery::dataset_name(dir));
    let single: FilePair = discovery::named_pair(dir, &name);

    if pairs.is_empty() && !single.templates.is_file() {
        eprintln!("error: no template file found");
        eprintln!("hint: the directory must contain a .zip.templates file");
        std::process::exit(1);
    }

    let mut d = VariableDiscoverer::new(cfg);

    if cli.all {
        println!("Aggregating {} template files", pairs.len());
        for p in &pairs {
            println!("  reading: {}", p.templates.display());
            if let Err(e) = d.ingest_templates(&p.templates) {
                println!("    skipped: {e}");
            }
        }
        for v in pairs.iter().filter_map(|p| p.variables.as_ref()) {
            println!("  reading samples: {}", v.display());
            if let Err(e) = d.ingest_samples(v) {
                println!("    skipped: {e}");
            }
        }
    } else {
        println!("Analyzing template file: {}", single.templates.display());
        if let Err(e) = d.ingest_templates(&single.templates) {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }

    println!("Found {} templates", d.templates().len());
    println!("Found {} variable positions", d.templates().position_count());

    if !cli.all {
        match &single.variables {
            Some(v) => {
                println!("Loading variable samples: {}", v.display());
                match d.ingest_samples(v) {
                    Ok(_) => println!(
                        "Loaded {} samples for {} variables",
                        d.samples().total_samples(),
                        d.samples().variable_count()
                    ),
                    Err(_) => println!("warning: variable samples unavailable; inferring from template context only"),
                }
            }
            None => println!("note: no variables file; inferring from template context only"),
        }
    }

    println!("\nInferring variable semantics...");
    let report = d.generate();
    if !report.stale.is_empty() {
        let verb = match d.config().stale_positions {
            StalePolicy::Drop => "withheld",
            StalePolicy::Keep => "kept",
        };
        println!("{} stale positions {verb} (placeholder missing from current template)", report.stale.len());
    }

    println!("\nGenerated {} alias suggestions:", report.suggestions.len());
    for (alias, positions) in report.suggestions.iter() {
        println!("  {alias}: {} variables", positions.len());
        for p in positions.iter().take(3) {
            println!("    - {p}");
        }
        if positions.len() > 3 {
            println!("    ... and {} more", positions.len() - 3);
        }
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| discovery::default_output(dir, &name, cli.all));
    println!("\nWriting config...");
    let text = report.suggestions.render();
    std::fs::write(&output, &text).with_context(|| format!("cannot write {}", output.display()))?;
    println!("Config saved to: {}", output.display());
    println!("\nDone. Review the generated aliases and rename them as needed.");
    Ok(())
}
