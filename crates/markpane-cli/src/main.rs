use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use markpane_cli::{
    cli::{Cli, Commands},
    commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging on stderr so rendered HTML stays alone on stdout
    let env_filter = EnvFilter::builder()
        .with_default_directive(cli.level_filter().into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            input,
            preset,
            config,
        } => {
            let preset = commands::resolve_preset(preset.map(Into::into), config.as_ref())?;
            let source = commands::read_input(&input)?;
            print!("{}", commands::render(&source, preset));
        }
        Commands::Lines { input } => {
            let source = commands::read_input(&input)?;
            for line in commands::lines(&source) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
