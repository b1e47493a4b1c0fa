use clap::{Args, ValueEnum};
use miette::{miette, Context, IntoDiagnostic, Result};
use souls_bnd::{Binder, BinderEntry, BinderMeta, Bnd3Meta, Bnd4Meta};
use souls_dcx::DcxParams;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use walkdir::WalkDir;

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum BinderVersion {
    Bnd3,
    Bnd4,
}

/// Compression scheme applied to the finished archive.
///
/// Which tag a game accepts is the operator's call; nothing here guesses it.
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Compression {
    None,
    Deflate,
    Block,
    BlockMax,
}

impl Compression {
    fn params(self) -> DcxParams {
        match self {
            Compression::None => DcxParams::none(),
            Compression::Deflate => DcxParams::deflate(),
            Compression::Block => DcxParams::block(),
            Compression::BlockMax => DcxParams::block_max(),
        }
    }
}

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target binder file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Binder variant to produce
    #[arg(long, value_enum, default_value_t = BinderVersion::Bnd4)]
    version: BinderVersion,

    /// Compression frame to wrap the archive in
    #[arg(long, value_enum, default_value_t = Compression::None)]
    compression: Compression,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", self.file.display());

        let files = WalkDir::new(&self.directory)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .collect::<Vec<_>>();

        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let meta = match self.version {
            BinderVersion::Bnd3 => BinderMeta::Bnd3(Bnd3Meta::default()),
            BinderVersion::Bnd4 => BinderMeta::Bnd4(Bnd4Meta::default()),
        };
        let mut binder = Binder::new(meta);

        for (id, file) in files.iter().enumerate() {
            let relative = file
                .path()
                .strip_prefix(&self.directory)
                .into_diagnostic()?
                .to_string_lossy()
                .into_owned();
            info!("inserting {relative}");

            let bytes = std::fs::read(file.path())
                .into_diagnostic()
                .context(format!("reading {}", file.path().display()))?;
            binder.push(BinderEntry::new(id as i32, relative, bytes));
        }

        let payload = binder.serialize()?;
        let bytes = souls_dcx::encode(&payload, &self.compression.params())?;

        let mut out = if !self.overwrite {
            File::create_new(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", self.file.display()))?
        } else {
            File::create(&self.file)
                .into_diagnostic()
                .context(format!("creating {}", self.file.display()))?
        };
        out.write_all(&bytes).into_diagnostic()?;

        Ok(())
    }
}
