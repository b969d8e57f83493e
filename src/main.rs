//! Badman Nodes CLI
//!
//! Inspect the node collection, plan WAN outpaint stages and resolve prompt
//! templates from the command line.

use anyhow::{bail, Context, Result};
use badman_nodes::prelude::*;
use std::path::PathBuf;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        return;
    }

    let result = match args[1].as_str() {
        "list" => list_nodes(&args[2..]),
        "search" => match args.get(2) {
            Some(query) => search_nodes(query),
            None => Err(anyhow::anyhow!("Please specify a search query")),
        },
        "info" => match args.get(2) {
            Some(id) => node_info(id),
            None => Err(anyhow::anyhow!("Please specify a node ID")),
        },
        "run" => match args.get(2) {
            Some(id) => run_node(id, &args[3..]),
            None => Err(anyhow::anyhow!("Please specify a node ID")),
        },
        "export" => export_metadata(),
        "plan" => plan_frames(&args[2..]),
        "resolve" => resolve_prompt(&args[2..]),
        "strip" => match args.get(2) {
            Some(text) => {
                println!("{}", strip_syntax(text));
                Ok(())
            }
            None => Err(anyhow::anyhow!("Please specify the text to strip")),
        },
        "wildcards" => list_wildcards(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage(&args[0]);
            Ok(())
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage(&args[0]);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("🦇 Badman Nodes v{}", badman_nodes::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list [--category <name>]  List all available nodes");
    println!("  search <query>            Search nodes by id, name or tag");
    println!("  info <node>               Show detailed info about a node");
    println!("  run <node> [name=value]   Run a node once with the given inputs/parameters");
    println!("  export                    Print every node's metadata as JSON");
    println!("  plan <frames> [extra]     Plan WAN outpaint sampler stages");
    println!("  resolve <prompt> [options] Resolve a prompt template");
    println!("  strip <prompt>            Remove template syntax from a prompt");
    println!("  wildcards [options]       List available wildcard files");
    println!("  help                      Show this help message");
    println!();
    println!("Plan options:");
    println!("  [extra] or --extra <list>  Extra context per sampler, e.g. 0,0,4");
    println!();
    println!("Resolve / wildcards options:");
    println!("  --seed <n>           Random seed (default: config default_seed)");
    println!("  --config <file>      TOML config file");
    println!("  --wildcards <dir>    Wildcard folder (overrides config and $BADMAN_WILDCARDS_DIR)");
    println!("  --metadata <file>    Workflow JSON (extra_pnginfo) for %Node.widget% references");
    println!("  --prompt <file>      Prompt JSON for %Node.widget% references");
}

/// Options shared by the template commands.
#[derive(Debug, Default)]
struct TemplateOptions {
    seed: Option<u64>,
    config: Option<PathBuf>,
    wildcards: Option<PathBuf>,
    metadata: Option<PathBuf>,
    prompt: Option<PathBuf>,
    positional: Vec<String>,
}

impl TemplateOptions {
    fn parse(args: &[String]) -> Result<Self> {
        let mut options = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{} needs a value", flag))
            };
            match arg.as_str() {
                "--seed" => {
                    let raw = value("--seed")?;
                    options.seed = Some(
                        raw.parse()
                            .with_context(|| format!("invalid seed '{}'", raw))?,
                    );
                }
                "--config" => options.config = Some(value("--config")?.into()),
                "--wildcards" => options.wildcards = Some(value("--wildcards")?.into()),
                "--metadata" => options.metadata = Some(value("--metadata")?.into()),
                "--prompt" => options.prompt = Some(value("--prompt")?.into()),
                flag if flag.starts_with("--") => bail!("Unknown option: {}", flag),
                _ => options.positional.push(arg.clone()),
            }
        }
        Ok(options)
    }

    fn config(&self) -> Result<NodesConfig> {
        let config = match &self.config {
            Some(path) => NodesConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?
                .with_env_overrides(),
            None => NodesConfig::from_env(),
        };
        Ok(match &self.wildcards {
            Some(dir) => config.with_wildcards_dir(dir),
            None => config,
        })
    }

    fn metadata(&self) -> Result<Option<WorkflowMetadata>> {
        let (workflow, prompt) = match (&self.metadata, &self.prompt) {
            (None, None) => return Ok(None),
            (Some(workflow), Some(prompt)) => (workflow, prompt),
            _ => bail!("--metadata and --prompt must be given together"),
        };

        let workflow_text = std::fs::read_to_string(workflow)
            .with_context(|| format!("reading {}", workflow.display()))?;
        let prompt_text = std::fs::read_to_string(prompt)
            .with_context(|| format!("reading {}", prompt.display()))?;
        let metadata = WorkflowMetadata::from_json_str(&workflow_text, &prompt_text)
            .context("parsing workflow metadata")?;
        Ok(Some(metadata))
    }
}

fn list_nodes(args: &[String]) -> Result<()> {
    let registry = NodeRegistry::with_builtins();

    match args {
        [] => {}
        [flag, name] if flag == "--category" => {
            let Some(category) = Category::all()
                .iter()
                .find(|c| c.display_name().eq_ignore_ascii_case(name))
            else {
                bail!("Unknown category: {}", name);
            };
            println!("📁 {:?}", category);
            for id in registry.nodes_by_category(*category) {
                println!("  • {}", id);
            }
            return Ok(());
        }
        _ => bail!("Usage: list [--category <name>]"),
    }

    let grouped = registry.grouped_by_category();

    println!("Available nodes ({} total):", registry.len());
    println!();

    for (category, nodes) in grouped {
        println!("  📁 {:?}", category);
        for metadata in nodes {
            println!("      • {} - {}", metadata.id, metadata.description);
        }
        println!();
    }
    Ok(())
}

fn node_info(node_id: &str) -> Result<()> {
    let registry = NodeRegistry::with_builtins();
    let Some(metadata) = registry.get_metadata(node_id) else {
        bail!("Node not found: {} (use 'list' to see available nodes)", node_id);
    };

    println!("Node: {}", metadata.name);
    println!("ID: {}", metadata.id);
    println!("Category: {:?}", metadata.category);
    println!("Version: {}", metadata.version);
    if metadata.output_node {
        println!("Output node: yes");
    }
    println!();
    println!("Description:");
    println!("  {}", metadata.description);
    println!();

    if !metadata.inputs.is_empty() {
        println!("Inputs:");
        for port in &metadata.inputs {
            let optional = match (port.hidden, port.optional) {
                (true, _) => " (hidden)",
                (false, true) => " (optional)",
                _ => "",
            };
            println!("  • {} [{:?}]{}", port.name, port.port_type, optional);
            if !port.description.is_empty() {
                println!("    {}", port.description);
            }
        }
        println!();
    }

    if !metadata.outputs.is_empty() {
        println!("Outputs:");
        for port in &metadata.outputs {
            println!("  • {} [{:?}]", port.name, port.port_type);
            if !port.description.is_empty() {
                println!("    {}", port.description);
            }
        }
        println!();
    }

    if !metadata.parameters.is_empty() {
        println!("Parameters:");
        for param in &metadata.parameters {
            println!("  • {} [{:?}] = {}", param.name, param.param_type, param.default_value);
            if !param.description.is_empty() {
                println!("    {}", param.description);
            }
            for constraint in &param.constraints {
                println!("    - {}", constraint.description());
            }
        }
    }
    Ok(())
}

fn search_nodes(query: &str) -> Result<()> {
    let registry = NodeRegistry::with_builtins();
    let found = registry.search(query);

    println!("🔍 {} node(s) matching '{}'", found.len(), query);
    for id in found {
        if let Some(metadata) = registry.get_metadata(id) {
            println!("  • {} - {}", id, metadata.name);
        }
    }
    Ok(())
}

fn export_metadata() -> Result<()> {
    let registry = NodeRegistry::with_builtins();
    let json = serde_json::to_string_pretty(&registry.export_metadata())
        .context("serializing node metadata")?;
    println!("{}", json);
    Ok(())
}

/// `name=value` pairs; values are read as JSON, anything else is a string.
fn run_node(node_id: &str, args: &[String]) -> Result<()> {
    let registry = NodeRegistry::with_builtins();
    let Some(metadata) = registry.get_metadata(node_id) else {
        bail!("Node not found: {} (use 'list' to see available nodes)", node_id);
    };

    let mut ctx = ExecutionContext::new(NodeId::new());
    for arg in args {
        let Some((name, raw)) = arg.split_once('=') else {
            bail!("Expected name=value, got '{}'", arg);
        };
        let value = serde_json::from_str(raw)
            .map(|json| Value::from_json(&json))
            .unwrap_or_else(|_| Value::String(raw.to_string()));
        if metadata.get_input(name).is_some() {
            ctx.add_input(name, value);
        } else {
            ctx.add_parameter(name, value);
        }
    }

    let outputs = registry.run(node_id, ctx)?;
    println!("✅ {}", metadata.name);
    for port in &metadata.outputs {
        if let Some(value) = outputs.get(&port.name) {
            println!("  {} = {}", port.name, value.to_json());
        }
    }
    Ok(())
}

fn plan_frames(args: &[String]) -> Result<()> {
    let mut positional: Vec<&str> = Vec::new();
    let mut extra_arg: Option<&str> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--extra" if i + 1 < args.len() => {
                extra_arg = Some(args[i + 1].as_str());
                i += 2;
            }
            arg => {
                positional.push(arg);
                i += 1;
            }
        }
    }

    let total: Option<i64> = positional
        .first()
        .map(|raw| {
            raw.parse()
                .with_context(|| format!("invalid frame count '{}'", raw))
        })
        .transpose()?;
    let extra_arg = extra_arg.or(positional.get(1).copied());
    let extra = ExtraContext::parse(extra_arg.unwrap_or(""));
    if extra.is_malformed() {
        eprintln!("⚠️  Ignoring malformed extra context '{}'", extra_arg.unwrap_or(""));
    }

    let total = total.context("Please specify the total frame count")?;
    let plan = plan(total, extra.values())?;

    println!("🎬 {} frames in {} sampler(s)", plan.total_frames(), plan.num_stages());
    println!();
    for (i, stage) in plan.stages().iter().enumerate() {
        println!(
            "  #{:<2} start {:>5}  generate {:>3}  context {:>3}",
            i + 1,
            stage.start_position,
            stage.generation_length,
            stage.context_length
        );
    }
    if plan.overshoot() > 0 {
        println!();
        println!("  (last window overshoots by {} frames)", plan.overshoot());
    }
    Ok(())
}

fn resolve_prompt(args: &[String]) -> Result<()> {
    let options = TemplateOptions::parse(args)?;
    if options.positional.is_empty() {
        bail!("Please specify a prompt template");
    }
    let template = options.positional.join(" ");

    let config = options.config()?;
    let seed = options.seed.unwrap_or(config.default_seed);
    let metadata = options.metadata()?;

    let resolver = PromptResolver::from_config(&config);
    println!("{}", resolver.resolve(&template, seed, metadata.as_ref()));
    Ok(())
}

fn list_wildcards(args: &[String]) -> Result<()> {
    let options = TemplateOptions::parse(args)?;
    let config = options.config()?;
    let store = FsWildcardStore::new(&config.wildcards_dir);

    let names = store.list_names();
    println!(
        "📂 {} wildcard file(s) in {}",
        names.len(),
        config.wildcards_dir.display()
    );
    for name in names {
        println!("  __{}__", name);
    }
    Ok(())
}
