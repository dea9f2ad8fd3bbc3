//! User configuration options.

use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{self, Read, Write};
use std::path::PathBuf;

use dirs::config_dir;
use level::DEFAULT_TESS_LEVEL;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::{BASE_DIR, CLIOptions};

const LOG_TAG: &str = "UserConfig";

fn get_cfg_file() -> io::Result<PathBuf> {
    let mut dir = config_dir().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{}: Couldn't find the user config dir", LOG_TAG),
        )
    })?;
    dir.push(BASE_DIR);
    if !dir.exists() {
        create_dir_all(&dir)?;
    }
    dir.push("user.toml");
    Ok(dir)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    /// Last map loaded
    pub map: String,
    pub texture_dir: Option<String>,
    pub tess_level: u32,
    pub swizzle: bool,
    pub fov: f32,
    pub frames: u32,
    pub verbose: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            map: String::new(),
            texture_dir: None,
            tess_level: DEFAULT_TESS_LEVEL,
            swizzle: true,
            fov: 90.0,
            frames: 100,
            verbose: "info".to_owned(),
        }
    }
}

impl UserConfig {
    /// Read the config, creating it with defaults if it is missing or can't
    /// be parsed
    pub fn load() -> io::Result<Self> {
        let path = get_cfg_file()?;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        let mut buf = String::new();
        if file.read_to_string(&mut buf)? == 0 {
            return UserConfig::create_default(&mut file);
        }
        match toml::from_str(&buf) {
            Ok(data) => {
                info!(target: LOG_TAG, "Loaded user config file");
                Ok(data)
            }
            Err(e) => {
                warn!("Could not deserialise {:?} ({}), recreating config", path, e);
                UserConfig::create_default(&mut File::create(&path)?)
            }
        }
    }

    fn create_default(file: &mut File) -> io::Result<Self> {
        let config = UserConfig::default();
        let data = toml::to_string(&config).map_err(io::Error::other)?;
        file.write_all(data.as_bytes())?;
        info!("Created default user config file");
        Ok(config)
    }

    pub fn write(&self) {
        let result = get_cfg_file().and_then(|path| {
            let data = toml::to_string_pretty(self).map_err(io::Error::other)?;
            File::create(path)?.write_all(data.as_bytes())
        });
        if let Err(err) = result {
            error!("Could not write config: {}", err);
        }
    }

    pub fn log_level(&self) -> log::LevelFilter {
        self.verbose.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Sync the CLI options and UserOptions with each other
    pub fn sync_cli(&mut self, cli: &mut CLIOptions) {
        info!("Checking CLI options");

        if !cli.map.is_empty() && cli.map != self.map {
            cli.map.clone_into(&mut self.map);
            info!("Map changed to: {}", &cli.map);
        } else {
            self.map.clone_into(&mut cli.map);
        }

        if cli.textures.is_some() {
            if cli.textures != self.texture_dir {
                self.texture_dir.clone_from(&cli.textures);
            }
        } else {
            cli.textures.clone_from(&self.texture_dir);
        }

        if let Some(level) = cli.tess_level {
            self.tess_level = level;
        } else {
            cli.tess_level = Some(self.tess_level);
        }

        if let Some(f) = cli.swizzle {
            self.swizzle = f;
        } else {
            cli.swizzle = Some(self.swizzle);
        }

        if let Some(fov) = cli.fov {
            self.fov = fov;
        } else {
            cli.fov = Some(self.fov);
        }

        if let Some(frames) = cli.frames {
            self.frames = frames;
        } else {
            cli.frames = Some(self.frames);
        }

        if let Some(verbose) = cli.verbose {
            self.verbose = verbose.to_string().to_lowercase();
        } else {
            cli.verbose = Some(self.log_level());
        }
    }
}
