/*
 *
 *    Copyright (c) 2020-2022 Project CHIP Authors
 *
 *    Licensed under the Apache License, Version 2.0 (the "License");
 *    you may not use this file except in compliance with the License.
 *    You may obtain a copy of the License at
 *
 *        http://www.apache.org/licenses/LICENSE-2.0
 *
 *    Unless required by applicable law or agreed to in writing, software
 *    distributed under the License is distributed on an "AS IS" BASIS,
 *    WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *    See the License for the specific language governing permissions and
 *    limitations under the License.
 */

//! `xtask` - A utility for managing development tasks in the `rs-matter` project.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::fmt::style;
use log::{Level, LevelFilter};

use crate::device_types::DeviceTypes;

mod device_types;

/// The main command-line interface for `xtask`.
#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "`rs-matter` development tasks")]
struct Cli {
    /// Task verbosity
    #[arg(short = 'v', long, default_value = "normal")]
    verbosity: Verbosity,

    #[command(subcommand)]
    command: Command,
}

/// Available commands for `xtask`.
#[derive(Subcommand)]
enum Command {
    /// Generate the Matter device type definitions from `matter-devices.xml`
    GenDeviceTypes(GenDeviceTypesArgs),
}

/// Arguments for the `gen-device-types` command
#[derive(Parser, Debug, Clone)]
struct GenDeviceTypesArgs {
    /// URL to download `matter-devices.xml` from
    #[arg(long, default_value = rs_matter_device_types_gen::DEVICE_TYPES_XML_URL)]
    url: String,
    /// Local `matter-devices.xml` file to use instead of downloading it
    #[arg(long)]
    input: Option<PathBuf>,
    /// The generated file, relative to the workspace directory
    #[arg(long, default_value = device_types::DEFAULT_OUTPUT)]
    output: PathBuf,
    /// Do not write anything; fail if the generated file is not up to date
    #[arg(long)]
    check: bool,
}

impl Command {
    fn run(&self) -> anyhow::Result<()> {
        match self {
            Command::GenDeviceTypes(args) => {
                let device_types = DeviceTypes::new(workspace_dir()?);

                let xml = match &args.input {
                    Some(input) => device_types.read(input)?,
                    None => device_types.download(&args.url)?,
                };

                if args.check {
                    device_types.check(&xml, &args.output)
                } else {
                    device_types.generate(&xml, &args.output)
                }
            }
        }
    }
}

/// Verbosity
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Verbosity {
    /// Silent - print only errors
    #[clap(alias = "s")]
    Silent,
    /// Reduced - print only warnings
    #[clap(alias = "r")]
    Reduced,
    /// Normal
    #[default]
    #[clap(alias = "n")]
    Normal,
    /// Verbose - print every generated device type
    #[clap(alias = "v")]
    Verbose,
    /// Chatty - print every cluster of every device type as well
    #[clap(alias = "c")]
    Chatty,
}

impl Verbosity {
    fn log_level(&self) -> LevelFilter {
        match self {
            Self::Silent => LevelFilter::Error,
            Self::Reduced => LevelFilter::Warn,
            Self::Normal => LevelFilter::Info,
            Self::Verbose => LevelFilter::Debug,
            Self::Chatty => LevelFilter::Trace,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::builder()
        .format(|buf, record| {
            let style = match record.level() {
                Level::Trace => style::AnsiColor::Cyan.on_default(),
                Level::Debug => style::AnsiColor::Blue.on_default(),
                Level::Info => style::AnsiColor::Green.on_default(),
                Level::Warn => style::AnsiColor::Green
                    .on_default()
                    .effects(style::Effects::BOLD),
                Level::Error => style::AnsiColor::Red
                    .on_default()
                    .effects(style::Effects::BOLD),
            };

            let prefix = match record.level() {
                Level::Trace => "      >",
                Level::Debug => "    >",
                Level::Info => "  >",
                Level::Warn => ">",
                Level::Error => "!",
            };

            writeln!(buf, "{prefix} {style}{}{style:#}", record.args())
        })
        .filter_level(cli.verbosity.log_level())
        .init();

    cli.command.run()
}

fn workspace_dir() -> anyhow::Result<PathBuf> {
    std::env::current_dir().context("Failed to determine the workspace directory")
}
