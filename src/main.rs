use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Arg, Command, arg, ArgAction};

use plasticparser_core::logging::parse_level;
use plasticparser_core::{OutputMode, QueryDsl, Translator};

use crate::common::config_utils::{find_config_file, parse_config_file};
use crate::common::{setup_with_level, setup_with_level_location, FilterLevel, debug, error, info, warn};
use crate::config_file::ConfigFile;

mod common;
mod config_file;

const CONFIG_FILE_NAME: &str = "plasticparser.toml";

fn main() -> anyhow::Result<()> {
    // setup the args
    let args = Command::new("plasticparser")
        .about("Translates search queries into filtered-query JSON")
        .arg(Arg::new("debug").long("debug").hide(true).required(false).action(ArgAction::SetTrue))
        .arg(Arg::new("log_file").long("log-file").help("Optional log file location").required(false).value_name("LOG_FILE"))
        .arg(Arg::new("config_file").long("config-file").help("Optional config file location").required(false).value_name("CONFIG_FILE"))
        .arg(Arg::new("mode").long("mode").help("Output shape: rich, flat, or auto").required(false).value_name("MODE"))
        .arg(arg!(--pretty "Pretty-print the JSON").action(ArgAction::SetTrue))
        .arg(arg!(--check "Check the config file, and print it").action(ArgAction::SetTrue))
        .arg(Arg::new("query").help("Query to translate; read one per line from stdin when absent").required(false).value_name("QUERY"))
        .get_matches();

    // see if a config-file was specified on the command line
    let config_file = if let Some(config_file_arg) = args.get_one::<String>("config_file") {
        let config_file_path = PathBuf::from(config_file_arg);

        if !config_file_path.is_file() {
            bail!("The configuration file specified on the command line ({}) was not found", config_file_path.display());
        }

        parse_config_file(&config_file_path)?
    } else {
        match find_config_file(CONFIG_FILE_NAME) {
            Ok(path) => parse_config_file(&path)?,
            Err(_) => ConfigFile::default(),
        }
    };

    // sanity check the config file
    let check_config = args.get_flag("check");

    config_file.sanity_check(check_config).context("Error checking the config file")?;

    if check_config {
        return Ok( () );
    }

    // --debug wins over the configured level
    let log_level = if args.get_flag("debug") {
        FilterLevel::Debug
    } else {
        config_file.globals.log_level.as_deref().and_then(parse_level).unwrap_or(FilterLevel::Info)
    };

    // get the log_file
    let op_log_file = if let Some(log_file_arg) = args.get_one::<String>("log_file") {
        Some(PathBuf::from(log_file_arg))
    } else {
        config_file.globals.log_file.clone()
    };

    // setup the logging
    let _logger = if let Some(ref log_file_path) = op_log_file {
        let log_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file_path)
            .with_context(|| format!("opening log_file: {}", log_file_path.display()))
            ?;

        setup_with_level_location(log_level, log_file)
    } else {
        setup_with_level(log_level)
    };

    debug!("CONFIG: {:#?}", config_file);

    let mut translator_config = config_file.translator;

    if let Some(mode) = args.get_one::<String>("mode") {
        translator_config.output_mode = mode.parse::<OutputMode>()?;
    }

    let translator = Translator::new(translator_config)?;
    let pretty = args.get_flag("pretty");

    if let Some(query) = args.get_one::<String>("query") {
        let dsl = translator.translate(query)?;

        println!("{}", render(&dsl, pretty)?);

        return Ok( () );
    }

    info!("Reading queries from stdin in {} mode", translator.config().output_mode);

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    let mut num_failed = 0usize;
    let mut num_translated = 0usize;
    let start = Instant::now();

    for line in io::stdin().lock().lines() {
        let line = line.context("reading from stdin")?;

        if line.trim().is_empty() {
            continue;
        }

        match translator.translate(&line) {
            Ok(dsl) => {
                writeln!(stdout, "{}", render(&dsl, pretty)?)?;
                num_translated += 1;
            }
            Err(e) => {
                warn!("Failed to translate {}: {}", line, e);
                eprintln!("{}: {}", line, e);
                num_failed += 1;
            }
        }
    }

    info!("Translated {} queries in {}us", num_translated, duration_us!(start));

    if num_failed > 0 {
        error!("{} queries failed to translate", num_failed);
        bail!("{} of {} queries failed to translate", num_failed, num_failed + num_translated);
    }

    Ok( () )
}

fn render(dsl: &QueryDsl, pretty: bool) -> anyhow::Result<String> {
    let json = dsl.to_json()?;

    Ok(if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    })
}
