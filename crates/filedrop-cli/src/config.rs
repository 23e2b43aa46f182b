use std::path::PathBuf;

use clap::Parser;
use filedrop_core::{MAX_FILES_PER_BATCH, MAX_FILE_SIZE_BYTES};
use filedrop_ingest::IngestConfig;

#[derive(Debug, Parser)]
#[command(name = "filedrop", about = "Turn files and folders into message attachments")]
pub struct CliConfig {
    /// Files or folders to attach. Folders are attached recursively.
    #[arg(required_unless_present = "list_types")]
    pub paths: Vec<PathBuf>,

    /// Largest accepted file, in bytes
    #[arg(long, env = "FILEDROP_MAX_FILE_SIZE", default_value_t = MAX_FILE_SIZE_BYTES)]
    pub max_file_size: u64,

    /// Most files attached to one message
    #[arg(long, env = "FILEDROP_MAX_FILES", default_value_t = MAX_FILES_PER_BATCH)]
    pub max_files: usize,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print the supported content types and exit
    #[arg(long)]
    pub list_types: bool,
}

impl CliConfig {
    pub fn ingest_config(&self) -> IngestConfig {
        IngestConfig {
            max_file_size: self.max_file_size,
            max_files: self.max_files,
        }
    }
}
