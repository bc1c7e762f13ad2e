//! streampy operator driver entry point.

mod cli;

use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::Parser;
use cli::{Cli, Operation};
use streampy::host::{Blob, RString, Value};
use streampy::{BridgeConfig, Callable};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();

    let mut config = BridgeConfig::from_env();
    if let Some(library) = &cli.python_library {
        config.python_library = Some(library.clone());
    }
    init_tracing(&config);

    if let Err(e) = run(&cli, &config) {
        eprintln!("streampy: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &BridgeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: &Cli, config: &BridgeConfig) -> Result<(), Box<dyn Error>> {
    streampy::bootstrap_with(config, &cli.setup)?;
    let callable = streampy::load(&cli.module, &cli.function)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut processed = 0usize;
    for line in io::stdin().lock().split(b'\n') {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let input = if cli.blob {
            Value::Blob(Blob::from(line))
        } else {
            Value::RString(RString::from_bytes(line))
        };
        apply(&callable, cli.operation, &input, &mut out)?;
        processed += 1;
    }
    out.flush()?;
    tracing::info!(processed, "Input exhausted");
    Ok(())
}

fn apply(
    callable: &Callable,
    operation: Operation,
    input: &Value,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    match operation {
        Operation::Sink => streampy::sink(callable, input)?,
        Operation::Filter => {
            if streampy::filter(callable, input)? {
                out.write_all(input.as_bytes())?;
                out.write_all(b"\n")?;
            }
        }
        Operation::Transform => {
            let mut output = input.empty_like();
            if streampy::transform(callable, input, &mut output)? {
                out.write_all(output.as_bytes())?;
                out.write_all(b"\n")?;
            }
        }
        Operation::Hash => {
            let code = streampy::hash(callable, input)?;
            write!(out, "{code}\t")?;
            out.write_all(input.as_bytes())?;
            out.write_all(b"\n")?;
        }
    }
    Ok(())
}
