use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use fit_catalog::{
    decode, load_catalog, load_dogma_items, load_results, load_roll_templates, make_rng,
    parse_chat_links, roll_pool, write_json, AddOutcome, CatalogBuilder, RollTemplate,
};
use fit_core::{
    Category, FindRequest, LoadoutResult, Module, ModulesByCategory, NumModules, SortKey,
    SortRequest,
};
use fit_worker::{Request, Response, ResponsePayload, Worker, WorkerConfig};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "fit_cli", about = "Abyssal module loadout optimizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Enumerate every loadout that fits the budgets and rank it.
    Find {
        #[arg(long)]
        catalog: PathBuf,
        #[arg(long)]
        cpu: f64,
        #[arg(long)]
        pg: f64,
        /// Modules per category, e.g. `--count dps=3 --count battery=1`.
        #[arg(long = "count", value_parser = parse_count, required = true)]
        counts: Vec<(Category, u32)>,
        /// Sort key as `field[:asc|desc]`; repeat for tie-breakers.
        #[arg(long = "sort")]
        sort_keys: Vec<SortKey>,
        /// Drop loadouts reusing a module already in a better one.
        #[arg(long)]
        unique: bool,
        #[arg(long, default_value_t = 20)]
        top: usize,
        /// Report progress every N results found (0 = silent).
        #[arg(long, default_value_t = 10_000)]
        progress_every: usize,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Re-rank a saved result set.
    Sort {
        #[arg(long)]
        results: PathBuf,
        #[arg(long = "sort")]
        sort_keys: Vec<SortKey>,
        #[arg(long)]
        unique: bool,
        #[arg(long, default_value_t = 20)]
        top: usize,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Roll a random catalog from templates.
    Roll {
        #[arg(long, default_value = "./content/roll_templates.json")]
        templates: PathBuf,
        /// Random if omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long = "count", value_parser = parse_count, required = true)]
        counts: Vec<(Category, u32)>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Convert dogma attribute dumps into catalog modules.
    Decode {
        #[arg(long)]
        category: Category,
        #[arg(long)]
        items: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// List item links found in pasted chat text.
    Links {
        #[arg(long)]
        input: PathBuf,
    },
}

fn parse_count(raw: &str) -> Result<(Category, u32), String> {
    let (category, count) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=N, got '{raw}'"))?;
    let category = category.parse::<Category>().map_err(|err| err.to_string())?;
    let count = count
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("bad count '{count}': {err}"))?;
    Ok((category, count))
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Runs one request on the worker, echoing progress to stderr.
fn run_job(worker: &Worker, request: Request) -> Result<ResponsePayload> {
    let mut job = worker.submit(request)?;
    let mut reported = false;
    while let Some(response) = job.blocking_recv() {
        match response {
            Response::Progress { found, .. } => {
                eprint!("\rfound {found} loadouts...");
                reported = true;
            }
            Response::Finished { result, .. } => {
                if reported {
                    eprintln!();
                }
                return Ok(result);
            }
            Response::Failed { error, .. } => bail!(error),
        }
    }
    bail!("worker stopped without a result")
}

fn find(request: FindRequest, config: WorkerConfig, top: usize, output: Option<&Path>) -> Result<()> {
    let worker = Worker::new(config);
    let ResponsePayload::Search(summary) = run_job(&worker, Request::FindCombinations(request))?
    else {
        bail!("unexpected sort payload for a search");
    };
    println!(
        "{} loadouts fit ({} combinations examined)",
        summary.results.len(),
        summary.combinations_examined
    );
    print_results(&summary.results, top)?;
    if let Some(path) = output {
        write_json(path, &summary)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn sort(request: SortRequest, top: usize, output: Option<&Path>) -> Result<()> {
    let worker = Worker::new(WorkerConfig::default());
    let ResponsePayload::Sorted(sorted) = run_job(&worker, Request::Sort(request))? else {
        bail!("unexpected search payload for a sort");
    };
    print_results(&sorted.results, top)?;
    if let Some(path) = output {
        write_json(path, &sorted.results)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

/// Rolls `counts` modules per category. Repeating a category adds to its pool.
fn roll_catalog(
    templates: &[RollTemplate],
    counts: &[(Category, u32)],
    rng: &mut impl rand::Rng,
) -> Result<Vec<Module>> {
    let mut builder = CatalogBuilder::new();
    for &(category, count) in counts {
        let template = templates
            .iter()
            .find(|t| t.module.category() == category)
            .with_context(|| format!("no roll template for {category}"))?;
        // Index 0 lets the builder pick free indices.
        builder.extend(roll_pool(template, count, &mut *rng).into_iter().map(|mut module| {
            module.index = 0;
            module
        }));
    }
    Ok(flatten(builder.build()))
}

fn roll(templates: &Path, seed: Option<u64>, counts: &[(Category, u32)], output: &Path) -> Result<()> {
    let templates = load_roll_templates(templates)?;
    let seed = seed.unwrap_or_else(rand::random);
    let modules = roll_catalog(&templates, counts, &mut make_rng(seed))?;
    write_json(output, &modules)?;
    println!(
        "Rolled {} modules with seed {seed} into {}",
        modules.len(),
        output.display()
    );
    Ok(())
}

fn decode_items(category: Category, items: &Path, output: &Path) -> Result<()> {
    let items = load_dogma_items(items)?;
    let mut builder = CatalogBuilder::new();
    let mut rejected = 0usize;
    for item in &items {
        match decode(category, item) {
            Ok(module) => {
                if builder.add(module) == AddOutcome::Skipped {
                    tracing::info!(item = ?item.item_id, "duplicate item skipped");
                }
            }
            Err(err) => {
                tracing::warn!("{err}");
                rejected += 1;
            }
        }
    }
    let modules = flatten(builder.build());
    write_json(output, &modules)?;
    println!(
        "Decoded {} of {} items into {} ({rejected} rejected)",
        modules.len(),
        items.len(),
        output.display()
    );
    Ok(())
}

fn links(input: &Path) -> Result<()> {
    let text =
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    for link in parse_chat_links(&text) {
        println!("{:>8}  {:>14}  {}", link.type_id, link.item_id, link.name);
    }
    Ok(())
}

fn flatten(catalog: ModulesByCategory) -> Vec<Module> {
    catalog.into_values().flatten().collect()
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.1}"))
}

fn print_results(results: &[LoadoutResult], top: usize) -> Result<()> {
    let mut out = std::io::stdout().lock();
    writeln!(
        out,
        "{:>6}  {:<28} {:>7} {:>8} {:>7} {:>8} {:>8} {:>8} {:>8}",
        "id", "modules", "cpu", "pg", "dps%", "cap", "drain%", "prop", "GJ/s"
    )?;
    writeln!(out, "{}", "-".repeat(104))?;
    for result in results.iter().take(top) {
        let modules: Vec<String> = result.modules.iter().map(ToString::to_string).collect();
        let prop = result.mwd_velocity.or(result.ab_velocity);
        writeln!(
            out,
            "{:>6}  {:<28} {:>7.1} {:>8.1} {:>7.2} {:>8.1} {:>8.2} {:>8} {:>8.2}",
            result.id,
            modules.join(" "),
            result.total_cpu,
            result.total_pg,
            result.dps_increase,
            result.cap_bonus,
            result.drain_resistance,
            optional(prop),
            result.total_gj,
        )?;
    }
    if results.len() > top {
        writeln!(out, "... {} more", results.len() - top)?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Find {
            catalog,
            cpu,
            pg,
            counts,
            sort_keys,
            unique,
            top,
            progress_every,
            output,
        } => {
            let request = FindRequest {
                cpu_budget: cpu,
                pg_budget: pg,
                modules_by_category: load_catalog(&catalog)?,
                num_modules: counts
                    .into_iter()
                    .map(|(category, count)| (category, i64::from(count)))
                    .collect::<NumModules>(),
                sort_keys,
                make_unique: unique,
            };
            find(
                request,
                WorkerConfig { progress_every },
                top,
                output.as_deref(),
            )?;
        }
        Commands::Sort {
            results,
            sort_keys,
            unique,
            top,
            output,
        } => {
            let request = SortRequest {
                results: load_results(&results)?,
                sort_keys,
                make_unique: unique,
            };
            sort(request, top, output.as_deref())?;
        }
        Commands::Roll {
            templates,
            seed,
            counts,
            output,
        } => roll(&templates, seed, &counts, &output)?,
        Commands::Decode {
            category,
            items,
            output,
        } => decode_items(category, &items, &output)?,
        Commands::Links { input } => links(&input)?,
    }
    Ok(())
}
