use clap::{Parser as ClapParser, Subcommand};
use jmes_lang::cli::{self, CliError, SearchOptions, SearchResult};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "jmes")]
#[command(about = "jmes - query JSON documents with JMESPath-style expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression against a JSON document
    Search {
        /// The expression to evaluate
        expression: String,

        /// JSON input (reads from stdin if neither --input nor --file is given)
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Read the JSON input from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Return null instead of failing on function arity and type errors
        #[arg(long)]
        disable_errors: bool,

        /// Parse without the expression cache
        #[arg(long)]
        no_cache: bool,
    },

    /// List built-in functions and their signatures
    Functions,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Search {
            expression,
            input,
            file,
            pretty,
            syntax_only,
            disable_errors,
            no_cache,
        } => read_input(input, file).and_then(|input| {
            let options = SearchOptions {
                expression,
                input,
                syntax_only,
                disable_errors,
                no_cache,
            };
            run_search(&options, pretty)
        }),
        Commands::Functions => {
            print!("{}", cli::function_listing());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_input(input: Option<String>, file: Option<PathBuf>) -> Result<Option<String>, CliError> {
    match (input, file) {
        (Some(s), _) => Ok(Some(s)),
        (None, Some(path)) => Ok(Some(std::fs::read_to_string(path)?)),
        (None, None) if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        (None, None) => Ok(None),
    }
}

fn run_search(options: &SearchOptions, pretty: bool) -> Result<(), CliError> {
    match cli::execute_search(options)? {
        SearchResult::SyntaxValid => println!("Syntax is valid"),
        SearchResult::Success(output) => {
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
