use super::CmdError;
use crate::{
    archive,
    config::Config,
    exclude::ExcludeSet,
    packager::{self, PackOptions},
    progress::{NoProgress, Progress, SpinnerProgress},
    template::Template,
    userpath::to_user_path,
    walkdir::Visited,
};
use colored::Colorize;
use serde::Serialize;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    str::FromStr,
};

pub const SOURCE_ARG: &str = "SOURCE";
pub const OUTPUT_ARG: &str = "OUTPUT";
pub const EXCLUDE_ARG: &str = "exclude";
pub const NO_DEFAULT_EXCLUDES_ARG: &str = "no-default-excludes";
pub const CONFIG_ARG: &str = "config";
pub const FORMAT_ARG: &str = "format";
pub const DRY_RUN_ARG: &str = "dry-run";

pub const DEFAULT_SOURCE: &str = "templates";
pub const DEFAULT_OUTPUT: &str = "dist/templates";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            _ => Err(format!("Unknown output format {}", s)),
        }
    }
}

impl Default for Format {
    fn default() -> Self {
        Format::Text
    }
}

/// The command line as given by the user, before configuration is applied.
#[derive(Clone, Debug, Default)]
pub struct PackArgs {
    pub source: Option<String>,
    pub output: Option<String>,
    pub exclude: Vec<String>,
    pub no_default_excludes: bool,
    pub format: Format,
    pub dry_run: bool,
}

/// Merges arguments and configuration: arguments win over the configuration,
/// which wins over the built-in defaults. Exclusions from both are combined.
pub fn resolve_options(args: &PackArgs, config: &Config) -> Result<PackOptions, CmdError> {
    let source = args
        .source
        .as_deref()
        .or_else(|| config.source.as_deref())
        .unwrap_or(DEFAULT_SOURCE);
    let output = args
        .output
        .as_deref()
        .or_else(|| config.output.as_deref())
        .unwrap_or(DEFAULT_OUTPUT);
    let source = to_user_path(source).map_err(CmdError::Path)?;
    let output = to_user_path(output).map_err(CmdError::Path)?;

    let use_defaults = !args.no_default_excludes && config.default_excludes.unwrap_or(true);
    let mut excludes = if use_defaults {
        ExcludeSet::with_defaults()
    } else {
        ExcludeSet::new()
    };
    for pattern in config.exclude.iter().chain(args.exclude.iter()) {
        excludes.exclude_pattern(pattern)?;
    }

    Ok(PackOptions::new(source.path_buf, output.path_buf).with_excludes(excludes))
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'a Path,
    output: &'a Path,
    dry_run: bool,
    archives: Vec<ArchiveReport<'a>>,
}

#[derive(Serialize)]
struct ArchiveReport<'a> {
    template: &'a str,
    archive: &'a Path,
    entries: usize,
}

/// Counts entries per template while forwarding to another [`Progress`].
struct Tally<'p> {
    inner: &'p mut dyn Progress,
    entries: BTreeMap<String, usize>,
}

impl<'p> Progress for Tally<'p> {
    fn on_template(&mut self, template: &Template) {
        self.entries.insert(template.name.clone(), 0);
        self.inner.on_template(template);
    }

    fn on_entry(&mut self, template: &Template, entry: &Visited) {
        *self.entries.entry(template.name.clone()).or_insert(0) += 1;
        self.inner.on_entry(template, entry);
    }

    fn on_archive(&mut self, template: &Template, archive: &Path) {
        self.inner.on_archive(template, archive);
    }
}

pub fn pack(args: &PackArgs, config: &Config) -> Result<(), CmdError> {
    let options = resolve_options(args, config)?;
    log::debug!(
        "Packaging {} into {} (excluding: {})",
        options.source.display(),
        options.output.display(),
        options.excludes.patterns().collect::<Vec<_>>().join(", ")
    );
    if args.dry_run {
        dry_run(&options, args.format)
    } else {
        write(&options, args.format)
    }
}

fn write(options: &PackOptions, format: Format) -> Result<(), CmdError> {
    let mut spinner = SpinnerProgress::new();
    let mut silent = NoProgress;
    // The spinner would corrupt the JSON report on stdout.
    let inner: &mut dyn Progress = match format {
        Format::Text => &mut spinner,
        Format::Json => &mut silent,
    };
    let mut tally = Tally {
        inner,
        entries: BTreeMap::new(),
    };
    let written = packager::package_with_progress(options, &mut tally)?;

    // Archives are named after their template, so the name can be recovered.
    let archives: Vec<(String, PathBuf)> = written
        .into_iter()
        .map(|archive| {
            let name = archive
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();
            (name, archive)
        })
        .collect();

    match format {
        Format::Json => {
            let report = Report {
                source: &options.source,
                output: &options.output,
                dry_run: false,
                archives: archives
                    .iter()
                    .map(|(name, archive)| ArchiveReport {
                        template: name,
                        archive,
                        entries: tally.entries.get(name).copied().unwrap_or(0),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            for (name, archive) in &archives {
                println!(
                    "{} {} {}",
                    "Packaged".green(),
                    name.bold(),
                    format!("-> {}", archive.to_string_lossy()).dimmed()
                );
            }
            if archives.is_empty() {
                println!(
                    "{} {}",
                    "No templates found in".yellow(),
                    options.source.to_string_lossy()
                );
            } else {
                println!(
                    "{} archive(s) written to {}.",
                    archives.len(),
                    options.output.to_string_lossy().bold()
                );
            }
        }
    }
    Ok(())
}

fn dry_run(options: &PackOptions, format: Format) -> Result<(), CmdError> {
    let plans = packager::plan(options)?;
    match format {
        Format::Json => {
            let report = Report {
                source: &options.source,
                output: &options.output,
                dry_run: true,
                archives: plans
                    .iter()
                    .map(|plan| ArchiveReport {
                        template: &plan.template.name,
                        archive: &plan.archive,
                        entries: plan.entries.len(),
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Text => {
            for plan in &plans {
                println!(
                    "{} {} {}",
                    "Would package".yellow(),
                    plan.template.name.bold(),
                    format!("-> {}", plan.archive.to_string_lossy()).dimmed()
                );
                for entry in &plan.entries {
                    println!(
                        "  {}",
                        archive::member_name(&entry.relative, entry.kind).dimmed()
                    );
                }
            }
            println!("{}", "Dry run: nothing was written.".italic());
        }
    }
    Ok(())
}
