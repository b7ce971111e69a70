//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};

use docconv_cli::{Cli, Commands, handlers, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before parsing so DOCCONV_* fallbacks apply
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Serve(args) => handlers::serve::execute(args).await?,
        Commands::Convert {
            input,
            output,
            soffice,
        } => handlers::convert::execute(&input, output.as_deref(), &soffice).await?,
        Commands::CheckDeps { soffice } => handlers::check_deps::execute(&soffice).await?,
    }

    Ok(())
}
