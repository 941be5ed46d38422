use confique::{yaml::FormatOptions, Config as _};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Confique(#[from] confique::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not determine config dir parent path")]
    ParentPath,

    #[error(transparent)]
    Xdg(#[from] xdg::BaseDirectoriesError),
}

#[derive(Clone, Debug, Serialize, Deserialize, confique::Config)]
pub struct Config {
    /// Address the HTTP server listens on
    #[config(default = "127.0.0.1:3000")]
    pub bind_address: String,

    /// Base64 encoded session key (at least 64 bytes once decoded)
    #[config(env = "SIGNUP_SESSION_KEY")]
    pub session_key: Option<String>,

    /// Where users are sent after registering
    #[config(default = "/login")]
    pub login_url: String,

    /// Seconds to wait on the success banner before going to the login page
    #[config(default = 2)]
    pub redirect_delay: u64,

    /// Directory served under /static
    #[config(default = "static")]
    pub static_dir: PathBuf,

    /// Registration action
    #[config(nested)]
    pub registrar: RegistrarConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, confique::Config)]
pub struct RegistrarConfig {
    /// URL the registration payload is POSTed to. Registrations are kept in memory when unset.
    #[config(env = "SIGNUP_REGISTRAR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[config(default = 10)]
    pub timeout: u64,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Config> {
        let config_path = get_config_path(config_path)?;
        let config = Config::builder().env().file(config_path).load()?;

        Ok(config)
    }

    pub fn redirect_delay(&self) -> Duration {
        Duration::from_secs(self.redirect_delay)
    }
}

impl RegistrarConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

pub fn init_config(config_path: Option<PathBuf>) -> Result<()> {
    // @TODO this will overwrite an existing config with no warning.
    let config_path = write_config_template(config_path)?;

    println!("Configuration file created: {}", config_path.display());

    Ok(())
}

pub fn get_config_template() -> String {
    confique::yaml::template::<Config>(FormatOptions::default())
}

pub fn print_config_template() {
    println!("{}", get_config_template());
}

pub fn get_config_path(config_path: Option<PathBuf>) -> Result<PathBuf> {
    match config_path {
        Some(path) => Ok(path),
        None => {
            let xdg_dirs = xdg::BaseDirectories::with_prefix("signup")?;
            Ok(xdg_dirs.get_config_file("config.yml"))
        }
    }
}

pub fn write_config_template(config_path: Option<PathBuf>) -> Result<PathBuf> {
    let config_path = get_config_path(config_path)?;
    let config_template = get_config_template();

    let config_path_dir = config_path.parent().ok_or(Error::ParentPath)?;

    std::fs::create_dir_all(config_path_dir)?;
    std::fs::write(config_path.clone(), config_template)?;

    Ok(config_path)
}
