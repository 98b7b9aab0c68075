use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".dalal"))
            .unwrap_or_else(|| PathBuf::from(".dalal"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Optional override for the embedded crew definition.
    pub fn crew_file(&self) -> PathBuf {
        self.base.join("crew.yaml")
    }

    /// Default destination of `dalal snapshot`.
    pub fn snapshots_dir(&self) -> PathBuf {
        self.base.join("api_responses")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::create_dir_all(self.snapshots_dir())?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::with_base(PathBuf::from("/tmp/dalal-test"));
        assert_eq!(paths.config_file(), PathBuf::from("/tmp/dalal-test/config.json"));
        assert_eq!(paths.crew_file(), PathBuf::from("/tmp/dalal-test/crew.yaml"));
        assert_eq!(paths.snapshots_dir(), PathBuf::from("/tmp/dalal-test/api_responses"));
    }
}
