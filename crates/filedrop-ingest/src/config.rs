use filedrop_core::{IngestError, MAX_FILES_PER_BATCH, MAX_FILE_SIZE_BYTES};

/// Limits applied by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Largest accepted file, in bytes before encoding.
    pub max_file_size: u64,
    /// Most attachments the store holds at once.
    pub max_files: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE_BYTES,
            max_files: MAX_FILES_PER_BATCH,
        }
    }
}

impl IngestConfig {
    /// Build from `FILEDROP_MAX_FILE_SIZE` and `FILEDROP_MAX_FILES`.
    /// Unset variables keep the defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, IngestError> {
        let defaults = Self::default();
        let config = Self {
            max_file_size: env_or("FILEDROP_MAX_FILE_SIZE", defaults.max_file_size)?,
            max_files: env_or("FILEDROP_MAX_FILES", defaults.max_files)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IngestError> {
        if self.max_file_size == 0 {
            return Err(IngestError::InvalidConfig(
                "max_file_size must be greater than zero".into(),
            ));
        }
        // Attachments above the contract limit cannot be represented.
        if self.max_file_size > MAX_FILE_SIZE_BYTES {
            return Err(IngestError::InvalidConfig(format!(
                "max_file_size {} exceeds the {MAX_FILE_SIZE_BYTES} byte limit",
                self.max_file_size
            )));
        }
        if self.max_files == 0 {
            return Err(IngestError::InvalidConfig(
                "max_files must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> Result<T, IngestError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| IngestError::InvalidConfig(format!("{var}={raw} is not a valid number"))),
        Err(_) => Ok(default),
    }
}
