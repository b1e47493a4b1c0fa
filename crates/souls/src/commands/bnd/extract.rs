use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

use super::read_container;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input binder, optionally compression-wrapped
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let (binder, _) = read_container(&self.file)?;

        for entry in binder.entries() {
            let Some(relative) = sanitized(&entry.name, entry.id) else {
                warn!("skipping entry {} with unusable name", entry.id);
                continue;
            };

            let path = self.directory.join(relative);
            info!("writing {}", path.display());

            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let mut out = if !self.overwrite {
                File::create_new(&path)
                    .into_diagnostic()
                    .context(format!("creating {}", path.display()))?
            } else {
                File::create(&path)
                    .into_diagnostic()
                    .context(format!("creating {}", path.display()))?
            };

            out.write_all(&entry.bytes).into_diagnostic()?;
        }

        Ok(())
    }
}

/// Map an entry name to a safe relative path.
///
/// Binder names may carry drive prefixes, absolute separators, or `..` segments; an
/// archive must not be able to write outside the target directory. Entries whose name
/// reduces to nothing fall back to their id.
fn sanitized(name: &str, id: i32) -> Option<PathBuf> {
    let name = name.replace('\\', "/");
    let name = match name.split_once(':') {
        Some((drive, rest)) if drive.len() <= 2 => rest,
        _ => &name,
    };

    let mut path = PathBuf::new();
    for component in name.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            continue;
        }
        path.push(component);
    }

    if path.as_os_str().is_empty() {
        if id < 0 {
            return None;
        }
        return Some(PathBuf::from(id.to_string()));
    }
    Some(path)
}
