//! Command-line interface for scenequery
//! This binary is used to inspect how selector queries are tokenized and matched.
//!
//! Usage:
//!   scenequery parse `<query>` [--format `<format>`]  - Match a query and print the trace or the selector
//!   scenequery tokens `<query>`                      - Print the token stream of a query
//!   scenequery grammar                             - Print the selector grammar
//!
//! Global options: `--config <path>` layers a TOML file over the built-in defaults,
//! `--log-level <level>` overrides `RUST_LOG` (default: warn).

use clap::{Arg, ArgMatches, Command};
use scenequery::query::config::{Loader, OutputFormat, QueryConfig};
use scenequery::query::formats::{self, treeviz};
use scenequery::query::lexing;
use scenequery::query::Engine;
use std::str::FromStr;

fn main() {
    let matches = Command::new("scenequery")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A tool for inspecting selector queries")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .help("Configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log level (error, warn, info, debug, trace)"),
        )
        .subcommand(
            Command::new("parse")
                .about("Match a query against the selector grammar")
                .arg(
                    Arg::new("query")
                        .help("The selector query, e.g. 'Node.bar:visible(true)'")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .short('f')
                        .help("Output format (treeviz, json, yaml)"),
                ),
        )
        .subcommand(
            Command::new("tokens")
                .about("Print the token stream of a query")
                .arg(
                    Arg::new("query")
                        .help("The selector query")
                        .required(true)
                        .index(1),
                ),
        )
        .subcommand(Command::new("grammar").about("Print the selector grammar"))
        .get_matches();

    init_logging(matches.get_one::<String>("log-level"));

    match matches.subcommand() {
        Some(("parse", parse_matches)) => {
            let config = load_config(&matches, parse_matches.get_one::<String>("format"));
            let query = parse_matches.get_one::<String>("query").unwrap();
            handle_parse_command(query, &config);
        }
        Some(("tokens", tokens_matches)) => {
            let query = tokens_matches.get_one::<String>("query").unwrap();
            handle_tokens_command(query);
        }
        Some(("grammar", _)) => {
            let config = load_config(&matches, None);
            handle_grammar_command(&config);
        }
        _ => unreachable!(),
    }
}

fn init_logging(flag: Option<&String>) {
    let level = flag
        .cloned()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "warn".to_owned());
    let level = log::LevelFilter::from_str(&level).unwrap_or_else(|_| {
        eprintln!("Unknown log level `{}`, using warn", level);
        log::LevelFilter::Warn
    });

    if let Err(e) = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    ) {
        eprintln!("Could not initialise logging: {}", e);
    }
}

fn load_config(matches: &ArgMatches, format: Option<&String>) -> QueryConfig {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if let Some(format) = format {
        if OutputFormat::parse(format).is_none() {
            eprintln!("Unknown format `{}` (expected treeviz, json or yaml)", format);
            std::process::exit(1);
        }
        loader = loader
            .set_override("output.format", format.as_str())
            .unwrap_or_else(|e| {
                eprintln!("Configuration error: {}", e);
                std::process::exit(1);
            });
    }
    loader.build().unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    })
}

fn engine(config: &QueryConfig) -> Engine {
    Engine::with_config(config.engine).unwrap_or_else(|e| {
        eprintln!("Grammar error: {}", e);
        std::process::exit(1);
    })
}

/// Handle the parse command
fn handle_parse_command(query: &str, config: &QueryConfig) {
    let engine = engine(config);

    match config.output.format {
        OutputFormat::Treeviz => {
            let parse = engine.parse(query);
            print!(
                "{}",
                treeviz::to_treeviz_str_with_params(parse.record(), config.output.show_positions)
            );
            if !parse.is_complete() {
                match parse.next_token() {
                    _ if parse.depth_exceeded() => eprintln!(
                        "Rejected: query nests deeper than the depth limit of {}",
                        config.engine.max_depth
                    ),
                    Some(next) if parse.matched() => eprintln!(
                        "Rejected: unexpected `{}` after {} of {} tokens",
                        next,
                        parse.consumed(),
                        parse.token_count()
                    ),
                    _ => eprintln!("Rejected: query does not match the selector grammar"),
                }
                std::process::exit(1);
            }
        }
        format => {
            let selector = engine.parse_selector(query).unwrap_or_else(|e| {
                eprintln!("Rejected: {}", e);
                std::process::exit(1);
            });
            let output = match format {
                OutputFormat::Json => formats::to_json(&selector),
                _ => formats::to_yaml(&selector),
            };
            match output {
                Ok(text) => println!("{}", text.trim_end()),
                Err(e) => {
                    eprintln!("Output error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Handle the tokens command
fn handle_tokens_command(query: &str) {
    for token in lexing::lex(query) {
        println!(
            "{:<14} {:<12} {}..{}",
            format!("{:?}", token.kind),
            token.to_string(),
            token.span.start,
            token.span.end
        );
    }
}

/// Handle the grammar command
fn handle_grammar_command(config: &QueryConfig) {
    print!("{}", formats::grammar_table(engine(config).grammar()));
}
