//! This crate defines the command line interface for the While analyzer.
//! General documentation about the analyzer is contained in the [`while_lib`] crate.

use std::io::Read as _;

use anyhow::{anyhow, Context, Error};
use clap::Parser;
use while_lib::analysis::concrete;
use while_lib::utils::graphviz;
use while_lib::utils::log::{print_all_messages, LogMessage};
use while_lib::DomainModule;

#[derive(Debug, Parser)]
#[command(version, about)]
/// Analyze While programs by abstract interpretation
struct CmdlineArgs {
    /// Path to the program source. Use `-` or no path to read from standard input.
    file: Option<String>,

    /// Export the abstract syntax tree of the program to FILE in Graphviz DOT format.
    #[arg(long, short)]
    ast: Option<String>,

    /// Specify a specific set of domains to be run as a comma separated list,
    /// e.g. 'sign,interval'.
    ///
    /// By default every known domain is run.
    #[arg(long, short)]
    domains: Option<String>,

    /// Also execute the program with the concrete interpreter.
    ///
    /// The program may read from standard input and may diverge.
    #[arg(long, short)]
    concrete: bool,

    /// Write the analysis results to a file instead of stdout.
    /// Log messages are still printed to stdout.
    #[arg(long, short)]
    out: Option<String>,

    /// Generate JSON output.
    #[arg(long, short)]
    json: bool,

    /// Do not print log messages. This prevents polluting stdout for json output.
    #[arg(long, short)]
    quiet: bool,
}

fn main() -> Result<(), Error> {
    let cmdline_args = CmdlineArgs::parse();

    run_analysis(&cmdline_args)
}

/// Parse the program and run all requested interpretations on it.
fn run_analysis(args: &CmdlineArgs) -> Result<(), Error> {
    let source = read_source(args.file.as_deref())?;
    let program =
        while_lib::frontend::parse(&source).context("Parsing of the program failed")?;
    let mut logs = Vec::new();

    if let Some(path) = &args.ast {
        graphviz::export_ast(&program, path)?;
        logs.push(LogMessage::new_info(format!("AST exported to {path}")).source("Graphviz"));
    }

    let mut modules = while_lib::get_domain_modules();
    if let Some(domain_list) = &args.domains {
        filter_modules_for_partial_run(&mut modules, domain_list)?;
    }
    let results = modules
        .iter()
        .map(|module| module.analyze(&program))
        .collect();

    if args.quiet {
        logs.clear();
    }
    print_all_messages(logs, results, args.out.as_deref(), args.json);

    if args.concrete {
        let final_state = concrete::execute_program(&program)?;
        println!("Concrete interpretation: {final_state}");
    }
    Ok(())
}

/// Read the program source from the given path, or from standard input if the
/// path is absent or `-`.
fn read_source(file: Option<&str>) -> Result<String, Error> {
    match file {
        None | Some("-") => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Reading the program from standard input failed")?;
            Ok(source)
        }
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Reading the program from {path} failed")),
    }
}

/// Only keep the modules specified by the `--domains` parameter in the
/// `modules` list. The parameter is a comma-separated list of domain names,
/// e.g. 'sign,interval,modulo-3'.
fn filter_modules_for_partial_run(
    modules: &mut Vec<DomainModule>,
    domain_list: &str,
) -> Result<(), Error> {
    let requested: Vec<String> = domain_list
        .split(',')
        .filter(|name| !name.is_empty())
        .map(|name| name.trim().to_lowercase())
        .collect();
    for name in &requested {
        if !modules
            .iter()
            .any(|module| module.name.to_lowercase() == *name)
        {
            return Err(anyhow!("'{name}' is not a valid domain name"));
        }
    }
    modules.retain(|module| requested.contains(&module.name.to_lowercase()));
    Ok(())
}
