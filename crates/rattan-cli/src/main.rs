mod commands;

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rattan")]
#[command(about = "A convention-driven static site generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    New {
        name: String,
    },
    Build {
        #[arg(long, short)]
        input: Option<PathBuf>,

        #[arg(long, short)]
        output: Option<PathBuf>,

        #[arg(long)]
        base_url: Option<String>,
    },
    Serve {
        #[arg(long, short)]
        input: Option<PathBuf>,

        #[arg(long, default_value = "8000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::New { name } => commands::new_site(&name),
        Commands::Build {
            input,
            output,
            base_url,
        } => commands::build_site(input.as_deref(), output.as_deref(), base_url.as_deref())
            .map(|_| ()),
        Commands::Serve { input, port } => commands::serve_site(input.as_deref(), port).await,
    };

    if let Err(error) = result {
        eprintln!("{} {error}", "Error:".red().bold());
        std::process::exit(1);
    }
}
