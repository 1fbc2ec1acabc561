use std::fmt::Write;
use std::path::PathBuf;
use std::time::Duration;

use ansi_term::Style;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tr_cfg::{DefaultValue, Schema};
use tr_core::args::CommandLine;
use tr_core::cfgs::target_schema;
use tr_core::defs::PlanSpec;
use tr_core::emit::{DefinitionsEmitter, Emitter, MakefileEmitter, VariablesEmitter};
use tr_core::engine::{BuildPlan, Engine, EngineConfig};
use tr_core::rules::RulesRegistry;
use tr_core::snapshot::Snapshot;
use tr_core::validate::ValidationPolicy;
use tracing_subscriber::EnvFilter;

/// Resolve the configuration of build targets.
#[derive(Debug, Parser)]
#[command(name = "trc", version)]
struct Args {
    /// Threads used to resolve targets.
    #[arg(long, default_value_t = 4)]
    workers: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Resolve every target of a plan.
    Resolve {
        /// Path to the plan, a TOML file.
        plan: PathBuf,
        /// Only resolve these targets.
        #[arg(long = "target")]
        targets: Vec<String>,
        #[arg(long, value_enum, default_value_t = Format::Summary)]
        format: Format,
        /// Engine root written into Makefiles.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Extra arguments for every target, e.g. `-- -StaticCRT`.
        #[arg(last = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// List every option a target can set.
    Options {
        /// Only list options that must agree within a shared build environment.
        #[arg(long)]
        critical: bool,
    },
    /// Show everything about a single option.
    Describe { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Summary,
    Defines,
    Variables,
    Makefile,
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!(?args, "parsed arguments");
    let style = OutputStyle::from_env();
    let schema = target_schema()?;

    match args.command {
        Command::Resolve {
            plan,
            targets,
            format,
            root,
            args: extra_args,
        } => {
            let spec = PlanSpec::from_path(&plan)?;
            let platforms = spec.platforms()?;
            let mut requests = spec.requests(&platforms)?;
            if !targets.is_empty() {
                requests.retain(|request| targets.iter().any(|name| name == request.identity.name()));
                if requests.is_empty() {
                    anyhow::bail!("no target in '{}' matches {targets:?}", plan.display());
                }
            }

            let command_line = spec.command_line().merged(&CommandLine::parse(&extra_args));

            let engine = Engine::new(EngineConfig {
                schema,
                platforms,
                rules: RulesRegistry::builtin(),
                config_files: spec.config_files(),
                modules: spec.modules(),
                command_line,
                workers: args.workers,
            })?;

            let spinner = ProgressBar::new_spinner()
                .with_message(format!("resolving {} target(s)", requests.len()));
            spinner.enable_steady_tick(Duration::from_millis(100));
            spinner.set_style(ProgressStyle::with_template("{spinner:.blue} {msg}")?);
            let plan = engine.resolve_all(requests);
            spinner.finish_and_clear();

            match emitter(format, root) {
                Some(emitter) => {
                    let snapshots = plan.into_result()?;
                    print!("{}", emitter.emit(&snapshots)?);
                }
                None => {
                    print!("{}", summary(&plan, &style)?);
                    if !plan.is_ok() {
                        anyhow::bail!("{} error(s) while resolving targets", plan.errors.len());
                    }
                }
            }
        }
        Command::Options { critical } => print!("{}", options(&schema, critical, &style)),
        Command::Describe { name } => {
            let desc = schema.describe(&name)?;
            let mut out = String::new();
            writeln!(out, "{}", style.bold(desc.name()))?;
            writeln!(out, "  {}", desc.desc())?;
            writeln!(out, "  type: {}", desc.value_type())?;
            match desc.default() {
                DefaultValue::Const(value) => writeln!(out, "  default: {}", value.to_value())?,
                DefaultValue::Derived { deps, .. } => {
                    writeln!(out, "  default: derived from [{}]", deps.join(", "))?
                }
            }
            writeln!(out, "  environment critical: {}", desc.is_environment_critical())?;
            if let Some(key) = desc.config_key().filter(|_| desc.allows_config_file()) {
                writeln!(out, "  config: [{}] {}", key.section, key.key)?;
            }
            if desc.allows_command_line() {
                let flags: Vec<_> = desc.command_line().iter().map(|flag| flag.flag()).collect();
                writeln!(out, "  command line: {}", flags.join(" "))?;
            }
            print!("{out}");
        }
    }

    Ok(())
}

/// Emitter for `format`, `None` for the summary.
fn emitter(format: Format, root: PathBuf) -> Option<Box<dyn Emitter>> {
    let emitter: Box<dyn Emitter> = match format {
        Format::Summary => return None,
        Format::Defines => Box::new(DefinitionsEmitter::default()),
        Format::Variables => Box::new(VariablesEmitter),
        Format::Makefile => Box::new(MakefileEmitter {
            root,
            ..MakefileEmitter::default()
        }),
    };
    Some(emitter)
}

/// Human readable overview of a plan, printed even if the plan has errors.
fn summary(plan: &BuildPlan, style: &OutputStyle) -> Result<String, anyhow::Error> {
    let mut out = String::new();

    for snapshot in &plan.snapshots {
        target_summary(&mut out, snapshot, style)?;
        writeln!(out)?;
    }

    for report in &plan.reports {
        let verdict = match (report.violations.is_empty(), report.policy) {
            (true, _) => "ok",
            (false, ValidationPolicy::Warn) => "conflicts allowed by override",
            (false, ValidationPolicy::Enforce) => "conflicts",
        };
        writeln!(
            out,
            "{} {} target(s): {verdict}",
            style.bold(report.group.key()),
            report.group.members().len()
        )?;
        for violation in &report.violations {
            writeln!(out, "  {violation}")?;
        }
    }

    if !plan.errors.is_empty() {
        writeln!(out)?;
        for err in &plan.errors {
            writeln!(out, "error: {}", tr_core::ErrorChain(err))?;
        }
    }
    Ok(out)
}

fn target_summary(
    out: &mut String,
    snapshot: &Snapshot,
    style: &OutputStyle,
) -> Result<(), std::fmt::Error> {
    writeln!(
        out,
        "{} {}",
        style.bold(snapshot.identity()),
        style.dimmed(snapshot.fingerprint())
    )?;
    for (name, resolved) in snapshot.iter() {
        writeln!(
            out,
            "  {name} = {} {}",
            resolved.value,
            style.dimmed(format_args!("({})", resolved.source))
        )?;
    }
    writeln!(out, "  definitions: {}", snapshot.definitions().join(" "))?;
    for diagnostic in snapshot.diagnostics() {
        writeln!(out, "  {}", style.italic(diagnostic))?;
    }
    Ok(())
}

fn options(schema: &Schema, critical: bool, style: &OutputStyle) -> String {
    let mut out = String::new();
    for desc in schema.iter() {
        if critical && !desc.is_environment_critical() {
            continue;
        }
        // Writing to a `String` can't fail.
        let _ = writeln!(
            out,
            "{} {}\n\t{}",
            style.bold(desc.name()),
            style.dimmed(desc.value_type()),
            desc.desc()
        );
    }
    out
}

/// Whether or not ANSI color codes are supported.
///
/// See: <https://no-color.org/>.
#[derive(Debug)]
struct OutputStyle {
    ansi: bool,
}

impl OutputStyle {
    fn from_env() -> Self {
        let ansi = !tr_ore::env::no_color();
        OutputStyle { ansi }
    }

    fn paint(&self, style: Style, value: impl std::fmt::Display) -> String {
        if self.ansi {
            style.paint(value.to_string()).to_string()
        } else {
            value.to_string()
        }
    }

    fn bold(&self, value: impl std::fmt::Display) -> String {
        self.paint(Style::new().bold(), value)
    }

    fn dimmed(&self, value: impl std::fmt::Display) -> String {
        self.paint(Style::new().dimmed(), value)
    }

    fn italic(&self, value: impl std::fmt::Display) -> String {
        self.paint(Style::new().italic(), value)
    }
}
