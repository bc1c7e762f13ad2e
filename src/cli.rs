//! Command-line interface for the streampy operator driver.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "streampy")]
#[command(about = "Apply a Python callable to each line of stdin", long_about = None)]
pub struct Cli {
    /// How the callable's result is used
    #[arg(value_enum)]
    pub operation: Operation,

    /// Setup script run once after the interpreter starts
    #[arg(long)]
    pub setup: PathBuf,

    /// Module holding the callable
    #[arg(long)]
    pub module: String,

    /// Name of the callable inside the module
    #[arg(long)]
    pub function: String,

    /// Pass lines as `bytes` instead of `str`
    #[arg(long)]
    pub blob: bool,

    /// Interpreter library to preload with global symbol visibility
    #[arg(long)]
    pub python_library: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// Call for every line, print nothing
    Sink,
    /// Print lines for which the callable returns a truthy value
    Filter,
    /// Print the callable's result, skipping lines where it returns None
    Transform,
    /// Print the 32-bit hash followed by the line
    Hash,
}
