use clap::Args;
use miette::{miette, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::info;

use super::{read_container, write_container};

#[derive(Args)]
pub struct ReplaceArgs {
    /// A binder to patch in place
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Name of the entry to replace, compared case-insensitively
    #[arg(long)]
    entry: String,

    /// Extension the entry is expected to carry
    #[arg(long, default_value = "")]
    extension: String,

    /// File holding the replacement payload
    #[arg(long, value_name = "FILE")]
    with: PathBuf,

    /// Copy the original file to a .bak sibling before writing
    #[arg(long, default_value_t = true)]
    backup: bool,
}

impl ReplaceArgs {
    pub fn handle(&self) -> Result<()> {
        let (mut binder, params) = read_container(&self.file)?;

        let predicate = souls_bnd::patch::name_equals_ignore_case(&self.entry, &self.extension);
        let outcome = souls_bnd::replace_bytes(&mut binder, predicate, |entry| {
            info!("replacing {} with {}", entry.name, self.with.display());
            std::fs::read(&self.with)
        });

        for failure in &outcome.failures {
            eprintln!(
                "{} entry {} ({}): {}",
                "failed".red(),
                failure.name,
                failure.id,
                failure.error
            );
        }

        if outcome.replaced == 0 {
            if outcome.is_clean() {
                return Err(miette!("no entry named {:?}", self.entry));
            }
            return Err(miette!("every matched entry failed"));
        }

        write_container(&self.file, &binder, &params, self.backup)?;
        println!(
            "{} {} entries in {}",
            "replaced".green(),
            outcome.replaced,
            self.file.display()
        );

        Ok(())
    }
}
