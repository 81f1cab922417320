use dbforge::DriverConfig;
use std::path::Path;

/// Load a driver config, reading `.env` first so `${VAR}` references resolve.
pub fn load(path: &Path, database: Option<String>) -> anyhow::Result<DriverConfig> {
    dotenvy::dotenv().ok();

    if !path.exists() {
        anyhow::bail!(
            "config file {} not found; pass --config <FILE>",
            path.display()
        );
    }

    let mut config = DriverConfig::load(path)?;
    if let Some(database) = database {
        config.database = database;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = load(Path::new("/nonexistent/dbforge.toml"), None).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn database_override_applies() {
        let dir = std::env::temp_dir().join(format!("dbforge-cli-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dbforge.toml");
        std::fs::write(&path, "driver = \"postgres\"\ndatabase = \"app\"\n").unwrap();

        let config = load(&path, Some("scratch".to_string())).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(config.driver, "postgres");
        assert_eq!(config.database, "scratch");
    }
}
