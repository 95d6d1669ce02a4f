use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::env::error::EnvError;
use crate::env::parser;
use crate::env::store::Environment;

/// Load a `.env` file into `env`.
///
/// Variables already present in `env` are never overwritten, including by a
/// later duplicate in the same file. A missing file loads nothing. Returns
/// the number of variables set.
pub fn load_file(env: &dyn Environment, path: &Path) -> Result<usize, EnvError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::debug!("No environment file at {}", path.display());
            return Ok(0);
        }
        Err(source) => {
            return Err(EnvError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    Ok(load_str(env, &content))
}

/// Apply `.env` formatted `content` to `env`. See [`load_file`].
pub fn load_str(env: &dyn Environment, content: &str) -> usize {
    let mut set = 0;
    for (key, value) in parser::parse(content) {
        if env.contains(&key) {
            log::trace!("Keeping existing value for {}", key);
            continue;
        }
        env.set(&key, &value);
        set += 1;
    }
    set
}
