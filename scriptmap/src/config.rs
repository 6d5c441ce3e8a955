#![allow(dead_code)]
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
pub struct AuditConfig {
    pub root: Option<PathBuf>,
    pub host: Option<String>,
    pub patterns: Option<Vec<String>>,
    pub out_dir: Option<PathBuf>,
    pub spool: Option<PathBuf>,
    pub crontab: Option<PathBuf>,
    pub format: Option<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct StoreConfig {
    pub db: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    pub audit: Option<AuditConfig>,
    pub store: Option<StoreConfig>,
}

pub fn load_config(path: Option<&Path>) -> Option<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => {
            let p = Path::new("scriptmap.yaml");
            if p.exists() { p.to_path_buf() } else { return None; }
        }
    };
    let s = fs::read_to_string(path).ok()?;
    serde_yaml::from_str(&s).ok()
}
