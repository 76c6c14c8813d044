/*
 * main.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::env;

use anyhow::anyhow;
use anyhow::Context;
use replkernel::connection_file::ConnectionFile;
use replkernel::kernel::Kernel;
use replkernel::kernel::KernelEvent;
use replkernel::kernel_spec::KernelSpec;
use replkernel::repl::ReplConfig;

/// Overrides the REPL command, e.g. `ISWIFT_REPL="/usr/bin/swift repl"`
const REPL_ENV_VAR: &str = "ISWIFT_REPL";

const USAGE: &str = "Usage: iswift --connection_file /path/to/file [--repl <command>] [--prompt <regex>] [--continuation-prompt <regex>]
       iswift --install
       iswift --version";

#[derive(Debug, Default, PartialEq)]
struct Options {
    connection_file: Option<String>,
    repl: Option<String>,
    prompt: Option<String>,
    continuation_prompt: Option<String>,
    install: bool,
    version: bool,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> anyhow::Result<Options> {
    let mut options = Options::default();

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--connection_file" | "--file" | "-f" => {
                options.connection_file = Some(value(&arg, argv.next())?);
            },
            "--repl" => options.repl = Some(value(&arg, argv.next())?),
            "--prompt" => options.prompt = Some(value(&arg, argv.next())?),
            "--continuation-prompt" => {
                options.continuation_prompt = Some(value(&arg, argv.next())?);
            },
            "--install" => options.install = true,
            "--version" => options.version = true,
            other => return Err(anyhow!("Argument '{other}' unknown")),
        }
    }

    Ok(options)
}

fn value(arg: &str, value: Option<String>) -> anyhow::Result<String> {
    value.ok_or_else(|| anyhow!("A value must be specified with the {arg} argument."))
}

fn repl_config(options: &Options) -> anyhow::Result<ReplConfig> {
    let mut config = ReplConfig::swift()?;

    let command = options.repl.clone().or_else(|| env::var(REPL_ENV_VAR).ok());
    if let Some(command) = command {
        let mut words = command.split_whitespace().map(String::from);
        let program = words
            .next()
            .ok_or_else(|| anyhow!("The REPL command is empty"))?;
        config = config.with_command(&program, words.collect());
    }
    if let Some(prompt) = &options.prompt {
        config = config.with_prompt(prompt)?;
    }
    if let Some(prompt) = &options.continuation_prompt {
        config = config.with_continuation_prompt(prompt)?;
    }

    Ok(config)
}

fn start_kernel(path: &str, config: ReplConfig) -> anyhow::Result<()> {
    let connection_file = ConnectionFile::from_file(path)?;
    let kernel = Kernel::connect(connection_file, config).context("Couldn't bind kernel sockets")?;

    let event = kernel.wait_for_event();
    kernel.shutdown();

    match event {
        KernelEvent::Shutdown { restart } => {
            log::info!("Shutdown requested (restart: {restart})");
            Ok(())
        },
        KernelEvent::PipelineStopped(panicked) if panicked.is_empty() => {
            Err(anyhow!("The shell pipeline stopped unexpectedly"))
        },
        KernelEvent::PipelineStopped(panicked) => Err(anyhow!(
            "The shell pipeline stopped; panicked: {}",
            panicked.join(", ")
        )),
    }
}

fn install_kernel_spec() -> anyhow::Result<()> {
    let exe_path = env::current_exe().context("Failed to determine path to iswift")?;
    let spec = KernelSpec::for_executable(&exe_path, "Swift", "swift");
    let dest = spec
        .install("iswift")
        .context("Failed to install Jupyter kernelspec")?;
    println!("Successfully installed Jupyter kernelspec to {}", dest.display());
    Ok(())
}

fn run(options: Options) -> anyhow::Result<()> {
    if options.version {
        println!("iswift {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    if options.install {
        return install_kernel_spec();
    }

    let Some(path) = options.connection_file.as_deref() else {
        return Err(anyhow!(
            "A connection file must be specified with the --connection_file argument.\n{USAGE}"
        ));
    };
    let config = repl_config(&options)?;
    start_kernel(path, config)
}

fn main() {
    // Initialize logging system; the env_logger lets you configure logging with
    // the RUST_LOG env var
    env_logger::init();

    // Skip the first "argument" as it's the path/name to this executable
    let options = match parse_args(env::args().skip(1)) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{err}");
            eprintln!("{USAGE}");
            std::process::exit(2);
        },
    };

    if let Err(err) = run(options) {
        log::error!("{err:?}");
        eprintln!("iswift: {err:#}");
        std::process::exit(1);
    }
}
