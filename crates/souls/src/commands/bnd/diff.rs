use clap::Args;
use crc::{Crc, CRC_32_ISO_HDLC};
use miette::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use super::read_container;

const CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

#[derive(Args)]
pub struct DiffArgs {
    /// The original binder
    #[arg(short, long, value_name = "FILE")]
    original: PathBuf,

    /// The binder to compare against it
    #[arg(short, long, value_name = "FILE")]
    modified: PathBuf,
}

impl DiffArgs {
    pub fn handle(&self) -> Result<()> {
        let (original, _) = read_container(&self.original)?;
        let (modified, _) = read_container(&self.modified)?;

        for entry in original.entries() {
            match modified.by_name(&entry.name) {
                None => println!("{} {}", "-".red(), entry.name),
                Some(other) => {
                    if CRC.checksum(&entry.bytes) != CRC.checksum(&other.bytes) {
                        println!("{} {}", "~".yellow(), entry.name);
                    }
                }
            }
        }

        for entry in modified.entries() {
            if original.by_name(&entry.name).is_none() {
                println!("{} {}", "+".green(), entry.name);
            }
        }

        Ok(())
    }
}
