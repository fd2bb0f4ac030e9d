//! Optional defaults read from `~/.config/longimg/config.toml`.
//!
//! ```toml
//! width = 1080
//! filter = "catmull-rom"
//! output = "/home/me/Pictures/long.png"
//! confirm = false
//! ```

use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;
use simpleio as sio;

use crate::{
    compositor::Filter,
    error::{Error, Result},
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config{
    /// Target width; the widest input when unset.
    pub width: Option<u32>,
    pub filter: Filter,
    pub output: Option<PathBuf>,
    /// Ask before compositing inputs that exceed the memory estimate.
    pub confirm: bool,
}

impl Default for Config{
    fn default() -> Self{
        Self{
            width: None,
            filter: Filter::default(),
            output: None,
            confirm: true,
        }
    }
}

impl Config{
    pub fn default_path() -> Option<PathBuf>{
        let mut path = sio::get_home().ok()?;
        path.push(".config/longimg/config.toml");
        Some(path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self>{
        toml::from_str(text).map_err(|e| Error::Config{
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self>{
        let path = path.to_path_buf();
        let text = sio::read_file_into_string(&path).map_err(|e| Error::Config{
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&text, &path)
    }

    /// An explicit path must exist; the default location is optional.
    pub fn discover(explicit: Option<&Path>) -> Result<Self>{
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                debug!("config: {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests{
    use super::*;

    #[test]
    fn test_parse_full(){
        let text = r#"
            width = 1080
            filter = "catmull-rom"
            output = "/tmp/long.png"
            confirm = false
        "#;
        let config = Config::parse(text, Path::new("c.toml")).unwrap();
        assert_eq!(
            config,
            Config{
                width: Some(1080),
                filter: Filter::CatmullRom,
                output: Some(PathBuf::from("/tmp/long.png")),
                confirm: false,
            }
        );
    }

    #[test]
    fn test_parse_empty_is_default(){
        assert_eq!(Config::parse("", Path::new("c.toml")).unwrap(), Config::default());
        assert!(Config::default().confirm);
    }

    #[test]
    fn test_parse_rejects_unknown(){
        let err = Config::parse("colour = \"red\"", Path::new("c.toml")).unwrap_err();
        assert!(matches!(err, Error::Config{ .. }));
        assert!(Config::parse("filter = \"bicubic\"", Path::new("c.toml")).is_err());
    }

    #[test]
    fn test_load_and_discover(){
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "width = 720\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().width, Some(720));
        assert_eq!(Config::discover(Some(path.as_path())).unwrap().width, Some(720));

        let missing = dir.path().join("missing.toml");
        assert!(Config::discover(Some(missing.as_path())).is_err());
    }
}
