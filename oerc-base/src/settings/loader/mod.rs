//! Load a settings object from the config locations.

use std::{
    env,
    error::Error,
    fmt::Debug,
    path::{Path, PathBuf},
};

use config::{Config, Environment, File, Map};
use eyre::{eyre, Context, Result};
use itertools::Itertools;
use serde::de::DeserializeOwned;

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "OERC";
/// Separator between nested key segments in environment variable names.
pub const ENV_SEPARATOR: &str = "__";

/// Deserialize a settings object from, in increasing order of precedence:
/// every `*.json` file in `config_dir` (sorted by name), each file listed in
/// the comma separated `CONFIG_FILES` variable, and `OERC__*` environment
/// variables. A missing `config_dir` is not an error.
pub fn load_settings<T>(config_dir: impl AsRef<Path>) -> Result<T>
where
    T: DeserializeOwned + Debug,
{
    let config_file_paths: Vec<String> = env::var("CONFIG_FILES")
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default();

    load_from_sources(config_dir.as_ref(), &config_file_paths, env_source(None))
}

/// `OERC__CHAIN__RPC_URL` sets `chain.rpc_url`. Keys are lowercased; empty
/// values count as unset. `vars` replaces the process environment when set.
fn env_source(vars: Option<Map<String, String>>) -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .ignore_empty(true)
        .source(vars)
}

fn load_from_sources<T>(
    config_dir: &Path,
    config_file_paths: &[String],
    environment: Environment,
) -> Result<T>
where
    T: DeserializeOwned + Debug,
{
    let mut base_config_sources = vec![];
    let mut builder = Config::builder();

    if config_dir.is_dir() {
        let entries: Vec<PathBuf> = config_dir
            .read_dir()
            .with_context(|| format!("Failed to open config directory {config_dir:?}"))?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .context("Failed to list config directory")?;

        for entry_path in entries.into_iter().sorted() {
            if entry_path.is_file() && entry_path.extension() == Some("json".as_ref()) {
                base_config_sources.push(format!("{entry_path:?}"));
                builder = builder.add_source(File::from(entry_path));
            }
        }
    }

    for path in config_file_paths {
        let p = PathBuf::from(path);
        if p.is_file() {
            if p.extension() == Some("json".as_ref()) {
                builder = builder.add_source(File::from(p));
            } else {
                return Err(eyre!(
                    "Provided config path via CONFIG_FILES is of an unsupported type ({p:?})"
                ));
            }
        } else if !p.exists() {
            return Err(eyre!(
                "Provided config path via CONFIG_FILES does not exist ({p:?})"
            ));
        } else {
            return Err(eyre!(
                "Provided config path via CONFIG_FILES is not a file ({p:?})"
            ));
        }
    }

    let config_deserializer = builder
        .add_source(environment)
        .build()
        .context("Failed to load config sources")?;

    Config::try_deserialize::<T>(config_deserializer).or_else(|err| {
        let mut err = if let Some(source_err) = err.source() {
            let source = format!("Config error source: {source_err}");
            Err(err).context(source)
        } else {
            Err(err.into())
        };

        for cfg_path in base_config_sources.iter().chain(config_file_paths.iter()) {
            err = err.with_context(|| format!("Config loaded: {cfg_path}"));
        }
        err.context("Config deserialization error")
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sample {
        backend: SampleBackend,
        level: String,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct SampleBackend {
        url: String,
        timeout_ms: u64,
    }

    fn env(vars: &[(&str, &str)]) -> Environment {
        env_source(Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ))
    }

    #[test]
    fn later_sources_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("00-base.json"),
            r#"{"backend": {"url": "https://a.example", "timeout_ms": 1}, "level": "info"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("10-local.json"),
            r#"{"backend": {"url": "https://b.example"}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let sample: Sample = load_from_sources(
            dir.path(),
            &[],
            env(&[("OERC__BACKEND__TIMEOUT_MS", "250"), ("OERC__LEVEL", "")]),
        )
        .unwrap();

        assert_eq!(sample.backend.url, "https://b.example");
        assert_eq!(sample.backend.timeout_ms, 250);
        assert_eq!(sample.level, "info");
    }

    #[test]
    fn missing_config_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let sample: Sample =
            load_from_sources(&dir.path().join("absent"), &[], env(&[])).unwrap();
        assert_eq!(sample.backend.timeout_ms, 0);
    }

    #[test]
    fn config_files_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json").display().to_string();
        let result: Result<Sample> = load_from_sources(dir.path(), &[missing], env(&[]));
        assert!(result.is_err());
    }

    #[test]
    fn nested_env_keys_map_to_snake_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let sample: Sample = load_from_sources(
            dir.path(),
            &[],
            env(&[
                ("OERC__BACKEND__URL", "https://env.example"),
                ("OERC__BACKEND__TIMEOUT_MS", "42"),
                ("OTHER__LEVEL", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(sample.backend.url, "https://env.example");
        assert_eq!(sample.backend.timeout_ms, 42);
        assert_eq!(sample.level, "");
    }
}
