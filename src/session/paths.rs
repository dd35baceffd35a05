use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ParleyPaths {
    pub parley_home: PathBuf,
    pub logs_dir: PathBuf,
    pub directive_file: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

pub fn resolve_paths() -> Result<ParleyPaths> {
    let home = required_home_dir()?;
    let parley_home = env_or_default_path("PARLEY_HOME", home.join(".parley"));

    let logs_dir = env_or_default_path("PARLEY_LOGS_DIR", parley_home.join("logs"));
    let directive_file = env_or_default_path(
        "PARLEY_DIRECTIVE_FILE",
        parley_home.join("PRIME_DIRECTIVE.md"),
    );

    Ok(ParleyPaths {
        parley_home,
        logs_dir,
        directive_file,
    })
}
