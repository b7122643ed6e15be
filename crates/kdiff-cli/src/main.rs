use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use kdiff_io::prelude::*;
use tabwriter::TabWriter;
use tracing_subscriber::EnvFilter;

mod ui;

use ui::{Style, Ui};

/// Exit status when rules were ineffective and `--fail-on-ineffective` is set.
const EXIT_INEFFECTIVE: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "kdiff",
    version,
    about = "Normalize Kubernetes manifests with declarative rules before diffing them"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply rule files to one or more manifest directories.
    Patch(PatchArgs),
    /// Mark configuration values that equal the reference defaults.
    AnnotateDefaults(AnnotateArgs),
    /// Print the desugared rules as a table.
    ListRules {
        /// Rule file to load; repeatable, merged in order.
        #[arg(long = "rules", env = "KDIFF_RULES")]
        rules: Vec<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct PatchArgs {
    /// Rule file to load; repeatable, merged in order.
    #[arg(long = "rules", env = "KDIFF_RULES")]
    rules: Vec<PathBuf>,

    /// Input directory; repeatable, paired with --output-dir by position.
    #[arg(long = "input-dir")]
    input_dirs: Vec<PathBuf>,

    /// Output directory; replaced on every run.
    #[arg(long = "output-dir")]
    output_dirs: Vec<PathBuf>,

    /// Template for output file names, rendered against each document
    /// (e.g. `{{ kind }}-{{ metadata.name }}.yaml`).
    #[arg(long, env = "KDIFF_OUTPUT_TEMPLATE")]
    output_template: Option<String>,

    /// Print the original values of fields changed by rules marked `todo`.
    #[arg(long)]
    print_todo: bool,

    /// Print, per rule, the documents each step matched or patched.
    #[arg(long)]
    print_debug: bool,

    /// Exit with status 2 when a rule step had no effect.
    #[arg(long)]
    fail_on_ineffective: bool,

    /// Print ineffectiveness findings as JSON on stderr.
    #[arg(long)]
    diagnostics_json: bool,
}

#[derive(Debug, Args)]
struct AnnotateArgs {
    #[arg(long)]
    input_dir: Option<PathBuf>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// YAML file holding the reference defaults.
    #[arg(long, conflicts_with = "image")]
    defaults_file: Option<PathBuf>,

    /// Container image that prints its default configuration.
    #[arg(long)]
    image: Option<String>,

    #[arg(long, default_value = "latest")]
    image_tag: String,

    /// Container runtime used to run --image.
    #[arg(long, default_value = "docker")]
    runtime: String,
}

fn main() {
    // Usage errors exit 1 so that status 2 only ever means "ineffective rules".
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    init_tracing();

    let style = Style::from_env();
    let mut out = Ui::new(style, io::stdout().lock());

    let result = match cli.cmd {
        Command::Patch(args) => patch(args, &mut out),
        Command::AnnotateDefaults(args) => annotate_defaults(args, &mut out).map(|()| 0),
        Command::ListRules { rules } => list_rules(&rules).map(|()| 0),
    };
    let _ = out.flush();

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            let _ = Ui::new(style, io::stderr().lock()).report_error(&format_args!("{err:#}"));
            process::exit(1);
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn patch(args: PatchArgs, out: &mut Ui<impl Write>) -> anyhow::Result<i32> {
    if args.input_dirs.is_empty() || args.output_dirs.is_empty() {
        bail!("--input-dir and --output-dir are required");
    }
    if args.input_dirs.len() != args.output_dirs.len() {
        bail!("--input-dir and --output-dir must be given the same number of times");
    }

    let rules = load_rule_set(&args.rules).context("failed to load rules")?;
    let mut debug = DebugInfo::new(&rules);

    for (input, output) in args.input_dirs.iter().zip(&args.output_dirs) {
        let state = read_state_from_path(input)
            .with_context(|| format!("failed to read state from {}", input.display()))?;
        out.summarize("Skipped files", state.skipped.iter().map(|p| p.display()))?;

        let documents = apply_rule_set(state.documents, &rules, Some(&mut debug))
            .with_context(|| format!("failed to apply rules to {}", input.display()))?;

        write_state_to_directory(&documents, output, args.output_template.as_deref())
            .with_context(|| format!("failed to write state to {}", output.display()))?;
        tracing::info!(input = %input.display(), output = %output.display(), "patched");
    }

    let mut code = 0;
    if let Err(err) = debug.validate_all_rules_were_effective() {
        out.summarize(
            &format!("Ineffective rules ({})", err.findings.len()),
            &err.findings,
        )?;
        if args.diagnostics_json {
            eprintln!("{}", canonical_json::to_canonical_json_string(&err)?);
        }
        if args.fail_on_ineffective {
            code = EXIT_INEFFECTIVE;
        }
    }

    if args.print_debug {
        for rule in debug.rules() {
            out.print(rule.summary().trim_end())?;
        }
    }
    if args.print_todo {
        print_todo(out, &debug.todo_report())?;
    }
    Ok(code)
}

fn print_todo(out: &mut Ui<impl Write>, report: &TodoReport) -> anyhow::Result<()> {
    for rule in &report.rules {
        out.print(&format!("# {}", rule.name))?;
        for change in &rule.changes {
            out.print(&change.resource.to_string())?;
            out.print("```yaml")?;
            out.print(kdiff_io::core::yaml::encode(&change.patch)?.trim_end())?;
            out.print("```")?;
        }
    }
    Ok(())
}

fn annotate_defaults(args: AnnotateArgs, out: &mut Ui<impl Write>) -> anyhow::Result<()> {
    let (Some(input), Some(output)) = (&args.input_dir, &args.output_dir) else {
        bail!("--input-dir and --output-dir are required");
    };

    let source: Box<dyn DefaultsSource> = match (&args.defaults_file, &args.image) {
        (Some(path), _) => Box::new(FileDefaults::new(path)),
        (None, Some(image)) => {
            let image = if image.contains(':') {
                image.clone()
            } else {
                format!("{image}:{}", args.image_tag)
            };
            Box::new(CommandDefaults::container(&args.runtime, &image))
        }
        (None, None) => bail!("one of --defaults-file or --image is required"),
    };
    let defaults = source.load().context("failed to load defaults")?;

    let state = read_state_from_path(input)
        .with_context(|| format!("failed to read state from {}", input.display()))?;
    out.summarize("Skipped files", state.skipped.iter().map(|p| p.display()))?;

    let documents = annotate_documents(&defaults, state.documents);
    write_state_to_directory(&documents, output, None)
        .with_context(|| format!("failed to write state to {}", output.display()))?;
    Ok(())
}

fn list_rules(paths: &[PathBuf]) -> anyhow::Result<()> {
    let rules = load_rule_set(paths).context("failed to load rules")?;

    let mut tw = TabWriter::new(io::stdout().lock()).padding(2);
    writeln!(tw, "index\tkind\tname\tmatch\tpatch\ttodo")?;
    for (index, rule) in rules.describe()?.iter().enumerate() {
        writeln!(
            tw,
            "{index}\t{}\t{}\t{}\t{}\t{}",
            rule.kind,
            rule.name,
            rule.match_rules.len(),
            rule.patch_rules.len(),
            if rule.todo { "yes" } else { "no" }
        )?;
    }
    tw.flush()?;
    Ok(())
}
