use std::{
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use regex::Regex;
use structopt::StructOpt;
use thiserror::Error;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use wsdlstub_codegen::{self as codegen, Options, Sections, Target};

#[derive(Debug, Error)]
enum Error {
    #[error("Error generating code")]
    Codegen(#[from] codegen::Error),

    #[error("Unable to write output")]
    Io(#[from] io::Error),
}

/// Generates data models and service stubs from a WSDL document.
#[derive(StructOpt)]
#[structopt(name = "wsdlstub")]
struct Args {
    /// WSDL file path or URL
    input: String,

    /// Only emit the service block
    #[structopt(long, conflicts_with = "models")]
    operations: bool,

    /// Only emit the data models
    #[structopt(long)]
    models: bool,

    /// Only emit models and operations whose name matches this regular expression
    #[structopt(short, long)]
    filter: Option<Regex>,

    /// Output language: spyne or rust
    #[structopt(short, long, default_value = "spyne")]
    target: Target,

    /// Namespace to declare instead of the document's targetNamespace
    #[structopt(long)]
    namespace: Option<String>,

    /// Write to this file instead of stdout
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Log build progress to stderr
    #[structopt(short, long)]
    verbose: bool,
}

impl Args {
    fn options(&self) -> Options {
        let sections = if self.operations {
            Sections::operations_only()
        } else if self.models {
            Sections::models_only()
        } else {
            Sections::all()
        };

        Options {
            target: self.target,
            sections,
            filter: self.filter.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[paw::main]
fn main(args: Args) -> Result<(), Error> {
    init_logging(args.verbose);

    let output = codegen::from_url(&args.input, &args.options())?;

    if !output.dropped.is_empty() {
        warn!("omitted models: {}", output.dropped.join(", "));
    }
    debug!("{} diagnostics", output.diagnostics.len());

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(output.code.as_bytes())?;
        }
        None => io::stdout().lock().write_all(output.code.as_bytes())?,
    }

    Ok(())
}
