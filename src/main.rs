use clap::{Parser as ClapParser, Subcommand};
use graphnav_lang::cli::{self, CliError, EvalOptions, EvalOutcome};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "graphnav")]
#[command(about = "Graphnav - evaluate object-graph navigation expressions against JSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        /// The expression to evaluate
        expression: String,

        /// JSON root document (reads from stdin if piped)
        #[arg(short, long)]
        input: Option<String>,

        /// Bind a variable: --var name=json
        #[arg(long = "var", value_name = "NAME=JSON")]
        vars: Vec<String>,

        /// Print the evaluation tree to stderr
        #[arg(long)]
        trace: bool,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Fail on ambiguous overloads instead of picking one
        #[arg(long)]
        strict_overloads: bool,
    },

    /// Print the normalized expression and its tree
    Parse {
        expression: String,
    },

    /// Show documentation (list categories when none is given)
    Docs {
        /// Category name
        category: Option<String>,
    },
}

fn main() {
    use tracing_subscriber::{EnvFilter, fmt};

    // RUST_LOG overrides the default of warn
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Eval {
            expression,
            input,
            vars,
            trace,
            pretty,
            syntax_only,
            strict_overloads,
        } => run_eval(
            EvalOptions {
                expression,
                input,
                vars,
                syntax_only,
                trace,
                strict_overloads,
            },
            pretty,
        ),
        Commands::Parse { expression } => cli::execute_parse(&expression).map(|text| print!("{}", text)),
        Commands::Docs { category: None } => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Docs {
            category: Some(category),
        } => cli::get_doc_category(&category).map(|content| print!("{}", content)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_eval(mut options: EvalOptions, pretty: bool) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        if !buffer.trim().is_empty() {
            options.input = Some(buffer);
        }
    }

    match cli::execute_eval(&options)? {
        EvalOutcome::SyntaxValid => println!("Syntax is valid"),
        EvalOutcome::Success { output, trace } => {
            if let Some(trace) = trace {
                eprint!("{}", trace);
            }
            let json = if pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
