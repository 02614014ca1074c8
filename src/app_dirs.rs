use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", "eyekiosk")
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("eyekiosk_config.json"))
    }

    pub fn log_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join("kiosk.log"))
            .unwrap_or_else(|| PathBuf::from("eyekiosk.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_expected_file_names() {
        assert!(AppDirs::config_path().ends_with("config.json")
            || AppDirs::config_path().ends_with("eyekiosk_config.json"));
        let log = AppDirs::log_path();
        assert!(log.extension().is_some_and(|e| e == "log"));
    }
}
