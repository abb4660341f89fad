use clap::{App, Arg};
use colored::Colorize;
use log::LevelFilter;
use std::path::PathBuf;
use tpack::{
    cmd::{self, pack},
    config::Config,
    verbosity::Verbosity,
};

fn main() {
    let matches = App::new("tpack")
        .version("0.1")
        .author("Miguel Murça <zvthryzhepn+rot13@gmail.com>")
        .about("Packages each starter template directory into its own zip archive.")
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name(pack::SOURCE_ARG)
                .index(1)
                .help("Directory holding one subdirectory per template")
                .long_help(
                    "Directory holding one subdirectory per template. \
                    Defaults to `templates`, or to the `source` value of \
                    the configuration file.",
                ),
        )
        .arg(
            Arg::with_name(pack::OUTPUT_ARG)
                .index(2)
                .help("Directory where archives are written")
                .long_help(
                    "Directory where archives are written, created if missing. \
                    Defaults to `dist/templates`, or to the `output` value of \
                    the configuration file.",
                ),
        )
        .arg(
            Arg::with_name(pack::EXCLUDE_ARG)
                .short("e")
                .long(pack::EXCLUDE_ARG)
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .value_name("PATTERN")
                .help("Glob pattern of paths to leave out (repeatable)"),
        )
        .arg(
            Arg::with_name(pack::NO_DEFAULT_EXCLUDES_ARG)
                .long(pack::NO_DEFAULT_EXCLUDES_ARG)
                .help("Do not exclude virtual environment directories (.venv, venv)"),
        )
        .arg(
            Arg::with_name(pack::CONFIG_ARG)
                .short("c")
                .long(pack::CONFIG_ARG)
                .takes_value(true)
                .value_name("FILE")
                .help("JSON configuration file")
                .long_help(
                    "JSON configuration file. When not given, `tpack.json` in \
                    the current directory and then the user configuration \
                    directory are tried.",
                ),
        )
        .arg(
            Arg::with_name(pack::FORMAT_ARG)
                .short("f")
                .long(pack::FORMAT_ARG)
                .takes_value(true)
                .possible_values(&["text", "json"])
                .default_value("text")
                .help("Output format of the report"),
        )
        .arg(
            Arg::with_name(pack::DRY_RUN_ARG)
                .short("n")
                .long(pack::DRY_RUN_ARG)
                .help("Lists what would be packaged without writing anything"),
        )
        .get_matches();

    let verbosity = Verbosity::from(matches.occurrences_of("v"));
    env_logger::Builder::new()
        .filter_level(LevelFilter::from(verbosity))
        .init();

    let config_path = matches.value_of(pack::CONFIG_ARG).map(PathBuf::from);
    let config = match Config::discover(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => exit_with(cmd::CmdError::from(err)),
    };

    let args = pack::PackArgs {
        source: matches.value_of(pack::SOURCE_ARG).map(String::from),
        output: matches.value_of(pack::OUTPUT_ARG).map(String::from),
        exclude: matches
            .values_of(pack::EXCLUDE_ARG)
            .map(|values| values.map(String::from).collect())
            .unwrap_or_default(),
        no_default_excludes: matches.is_present(pack::NO_DEFAULT_EXCLUDES_ARG),
        format: matches
            .value_of(pack::FORMAT_ARG)
            .and_then(|f| f.parse().ok())
            .unwrap_or_default(),
        dry_run: matches.is_present(pack::DRY_RUN_ARG),
    };

    if let Err(err) = pack::pack(&args, &config) {
        exit_with(err);
    }
    std::process::exit(exitcode::OK);
}

fn exit_with(err: cmd::CmdError) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err.to_string().red());
    std::process::exit(err.exit_code());
}
