use clap::Args;
use miette::Result;
use std::path::PathBuf;

use super::read_container;

#[derive(Args)]
pub struct ListArgs {
    /// An input binder, optionally compression-wrapped
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        let (binder, params) = read_container(&self.file)?;

        println!(
            "{}: {} entries, {:?} frame",
            self.file.display(),
            binder.len(),
            params.algorithm
        );
        for entry in binder.entries() {
            println!(
                "{:>8}  {:#04x}  {:>10}  {}",
                entry.id,
                entry.flags,
                entry.bytes.len(),
                entry.name
            );
        }

        Ok(())
    }
}
