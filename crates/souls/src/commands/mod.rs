pub mod bnd;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle binder archives
    Bnd {
        #[command(subcommand)]
        command: bnd::BndCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Bnd { command } => command.handle(),
        }
    }
}
