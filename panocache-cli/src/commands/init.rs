//! Init command - write a default configuration file.

use std::path::Path;

use panocache::config::ConfigFile;

use super::common::GlobalArgs;
use crate::error::CliError;

/// Run the init command.
pub fn run(args: &GlobalArgs, force: bool) -> Result<(), CliError> {
    let path = args.config_path();
    write_default_config(&path, force)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to customize panocache settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}

fn write_default_config(path: &Path, force: bool) -> Result<(), CliError> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }
    ConfigFile::default().save_to(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_loadable_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        write_default_config(&path, false).unwrap();

        let loaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(loaded, ConfigFile::default());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        std::fs::write(&path, "[fetch]\nbatch_width = 3\n").unwrap();

        assert!(matches!(
            write_default_config(&path, false),
            Err(CliError::ConfigExists(_))
        ));
        assert!(std::fs::read_to_string(&path).unwrap().contains("batch_width = 3"));

        write_default_config(&path, true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
