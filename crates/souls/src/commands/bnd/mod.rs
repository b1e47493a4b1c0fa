use std::ffi::OsString;
use std::path::{Path, PathBuf};

use miette::{Context, IntoDiagnostic, Result};
use souls_bnd::Binder;
use souls_dcx::DcxParams;
use tracing::info;

pub mod diff;
pub mod extract;
pub mod list;
pub mod pack;
pub mod rename;
pub mod replace;

#[derive(clap::Subcommand)]
pub enum BndCommands {
    /// Compare the entries of two binders
    Diff(diff::DiffArgs),
    /// Extract a binder into a directory
    Extract(extract::ExtractArgs),
    /// List the entries of a binder
    List(list::ListArgs),
    /// Pack a directory into a new binder
    Pack(pack::PackArgs),
    /// Rename entries by substring
    Rename(rename::RenameArgs),
    /// Replace the payload of an entry
    Replace(replace::ReplaceArgs),
}

impl BndCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            BndCommands::Diff(diff) => diff.handle(),
            BndCommands::Extract(extract) => extract.handle(),
            BndCommands::List(list) => list.handle(),
            BndCommands::Pack(pack) => pack.handle(),
            BndCommands::Rename(rename) => rename.handle(),
            BndCommands::Replace(replace) => replace.handle(),
        }
    }
}

/// Read a binder from disk, transparently unwrapping a compression frame.
///
/// The frame parameters are returned so the binder can be rewritten under the exact
/// same wrapper.
pub fn read_container(path: &Path) -> Result<(Binder, DcxParams)> {
    let bytes = std::fs::read(path)
        .into_diagnostic()
        .context(format!("path: {}", path.display()))?;

    let (payload, params) = souls_dcx::decode(&bytes)?;
    let binder = Binder::parse(&payload)?;
    Ok((binder, params))
}

/// Serialize a binder, re-apply its frame, and write it to `path`.
///
/// With `backup` set, existing bytes at `path` are first copied to a `.bak` sibling so
/// a bad patch never destroys the only copy.
pub fn write_container(path: &Path, binder: &Binder, params: &DcxParams, backup: bool) -> Result<()> {
    let payload = binder.serialize()?;
    let bytes = souls_dcx::encode(&payload, params)?;

    if backup && path.exists() {
        let target = backup_path(path);
        info!("backing up {} to {}", path.display(), target.display());
        std::fs::copy(path, &target)
            .into_diagnostic()
            .context(format!("backing up to {}", target.display()))?;
    }

    std::fs::write(path, bytes)
        .into_diagnostic()
        .context(format!("writing {}", path.display()))?;
    Ok(())
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map_or_else(OsString::new, OsString::from);
    name.push(".bak");
    path.with_file_name(name)
}
