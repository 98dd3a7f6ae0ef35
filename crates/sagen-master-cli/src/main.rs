// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! sagen-master - inspect and exercise the mudlib reference monitor.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod world;

use commands::{CheckCommand, Output};
use world::WorldArgs;

/// Evaluate gates and validate policy files for the sagen mudlib.
#[derive(Parser, Debug)]
#[command(name = "sagen-master", about = "sagen mudlib reference monitor", version)]
struct Args {
	/// Configuration file (defaults to /etc/sagen/master.toml)
	#[arg(long, short = 'c', env = "SAGEN_MASTER_CONFIG")]
	config: Option<PathBuf>,

	/// Print results as JSON
	#[arg(long, global = true)]
	json: bool,

	#[command(flatten)]
	world: WorldArgs,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decide a read, write or link request
	#[command(subcommand)]
	Check(CheckCommand),
	/// Show ownership and include path derived for a path
	Owner {
		path: String,
	},
	/// Show the privileges granted to a program
	Privs {
		path: String,
	},
	/// Load every policy table and report problems
	Validate,
	/// List the programs the preload file expands to
	Preloads,
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => sagen_master_config::load_config_with_file(path)?,
		None => sagen_master_config::load_config()?,
	};

	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| config.logging.level.clone().into());
	let registry = tracing_subscriber::registry().with(filter);
	if config.logging.json {
		registry
			.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
			.init();
	} else {
		registry
			.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
			.init();
	}

	let output = Output::new(args.json);
	let (master, report) = world::build_master(&config, &args.world)?;

	match args.command {
		Command::Check(check) => commands::check(&master, check, &output),
		Command::Owner { path } => commands::owner(&master, &path, &output),
		Command::Privs { path } => commands::privs(&master, &path, &output),
		Command::Validate => commands::validate(&report, &output),
		Command::Preloads => commands::preloads(&config, &output),
	}
}
