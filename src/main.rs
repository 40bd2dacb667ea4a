use chains_provenance::{
    cli::{self, commands::TaskRunCommands},
    error::Result,
};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = cli::CLI_NAME, version = cli::CLI_VERSION, author, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task run provenance commands
    #[command(name = "taskrun")]
    TaskRun {
        #[command(subcommand)]
        command: TaskRunCommands,
    },
}

fn main() -> Result<()> {
    chains_provenance::init_logging()?;

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::TaskRun { command } => cli::handlers::handle_taskrun_command(command),
    };

    if let Err(ref e) = result {
        eprintln!("{}", cli::format_error(e));
    }

    result
}
