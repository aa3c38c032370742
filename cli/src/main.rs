//! Manage JSON records stored one per line in a file and indexed by identifier in an AVL tree.
//!
//! # Usage
//!
//! ```sh
//! cargo run --release --bin avldb -- --path /tmp/people.jsonl --id-field id --identifiers integer
//! ```
//!
//! Every insert, update, and delete rewrites the whole file. Lookups by identifier are answered
//! from memory; listing and querying read the file.

use avldb_cli::Shell;
use avldb_storage::{
    store::{Config, Store, DEFAULT_ID_FIELD},
    Identifier,
};
use clap::{value_parser, Arg, Command};
use prometheus_client::registry::Registry;
use std::{io, str::FromStr};
use tracing::{info, Level};

fn main() {
    // Parse arguments
    let matches = Command::new("avldb")
        .about("manage JSON records indexed by an AVL tree")
        .arg(
            Arg::new("path")
                .long("path")
                .default_value("data.jsonl")
                .help("File holding one JSON record per line"),
        )
        .arg(
            Arg::new("id-field")
                .long("id-field")
                .default_value(DEFAULT_ID_FIELD)
                .help("Name of the field holding each record's identifier"),
        )
        .arg(
            Arg::new("identifiers")
                .long("identifiers")
                .default_value("integer")
                .value_parser(["integer", "string"])
                .help("Type of the identifiers"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .default_value("info")
                .value_parser(value_parser!(Level)),
        )
        .get_matches();

    // Create logger
    let level = *matches
        .get_one::<Level>("log-level")
        .expect("Please provide log level");
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    // Configure store
    let path = matches
        .get_one::<String>("path")
        .expect("Please provide path");
    let id_field = matches
        .get_one::<String>("id-field")
        .expect("Please provide id field");
    let cfg = Config::new(path).with_id_field(id_field);
    info!(%path, %id_field, "loaded config");

    match matches
        .get_one::<String>("identifiers")
        .map(String::as_str)
    {
        Some("string") => run::<String>(cfg),
        _ => run::<i64>(cfg),
    }
}

fn run<K: Identifier + FromStr>(cfg: Config) {
    let mut registry = Registry::default();
    let store = Store::<K>::init(&mut registry, cfg).expect("Failed to open store");
    info!(keys = store.len(), "opened store");

    let stdin = io::stdin();
    let mut shell = Shell::new(store, stdin.lock(), io::stdout());
    shell.run().expect("Failed to run shell");
}
