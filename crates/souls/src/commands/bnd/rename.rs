use clap::Args;
use miette::Result;
use souls_bnd::CaseMode;
use std::path::PathBuf;
use tracing::info;

use super::{read_container, write_container};

#[derive(Args)]
pub struct RenameArgs {
    /// A binder to patch in place
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Substring to search entry names for
    #[arg(long)]
    from: String,

    /// Replacement substring
    #[arg(long)]
    to: String,

    /// Match case-insensitively
    #[arg(long, default_value_t = false)]
    ignore_case: bool,

    /// Copy the original file to a .bak sibling before writing
    #[arg(long, default_value_t = true)]
    backup: bool,
}

impl RenameArgs {
    pub fn handle(&self) -> Result<()> {
        let (mut binder, params) = read_container(&self.file)?;

        let case = if self.ignore_case {
            CaseMode::IgnoreCase
        } else {
            CaseMode::Exact
        };
        let changed = souls_bnd::rename_matching(&mut binder, &self.from, &self.to, case);

        if changed == 0 {
            info!("no entries matched {:?}", self.from);
            return Ok(());
        }

        write_container(&self.file, &binder, &params, self.backup)?;
        info!("renamed {changed} entries in {}", self.file.display());

        Ok(())
    }
}
