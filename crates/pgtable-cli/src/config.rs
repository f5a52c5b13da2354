use crate::cli::{DEFAULT_CONFIG, GlobalArgs};
use pgtable::{ConnectConfig, DangerousDmlPolicy, TableOptions};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Connection settings and options resolved from the config file and command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub connect: ConnectConfig,
    pub options: TableOptions,
}

impl Settings {
    /// Load `global.config`; `--database` overrides the configured URL.
    ///
    /// A missing default config file is not an error when a URL is available
    /// from `--database` or `DATABASE_URL`.
    pub fn resolve(global: &GlobalArgs) -> anyhow::Result<Self> {
        let file = if global.config.exists() {
            Some(ConfigFile::load(&global.config)?)
        } else if global.config != Path::new(DEFAULT_CONFIG) {
            anyhow::bail!("config file not found: {}", global.config.display());
        } else {
            None
        };

        let fallback_url = global
            .database
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok());

        match file {
            Some(file) => Ok(file.into_settings(global.database.clone())),
            None => {
                let Some(url) = fallback_url else {
                    anyhow::bail!(
                        "no {DEFAULT_CONFIG} found; pass --database <URL> or set DATABASE_URL"
                    );
                };
                Ok(Self {
                    connect: ConnectConfig::from_url(url),
                    options: TableOptions::default(),
                })
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub version: String,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub options: OptionsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    pub connect_timeout_secs: Option<u64>,
}

fn default_schema() -> String {
    "public".to_string()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    pub query_timeout_secs: Option<u64>,
    #[serde(default)]
    pub delete_without_where: DangerousDmlPolicy,
    pub max_sql_log_length: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::parse(&raw, |key| std::env::var(key).ok())
            .map_err(|e| anyhow::anyhow!("invalid config file {}: {e:#}", path.display()))
    }

    /// Parse TOML, expanding `${VAR}` references through `lookup`.
    pub fn parse(raw: &str, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.database.url = expand_vars(&file.database.url, &lookup)?;
        file.database.schema = expand_vars(&file.database.schema, &lookup)?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.version != "1" {
            anyhow::bail!("unsupported config version: {} (expected \"1\")", self.version);
        }
        if self.database.url.trim().is_empty() {
            anyhow::bail!("database.url must not be empty");
        }
        if self.database.schema.trim().is_empty() {
            anyhow::bail!("database.schema must not be empty");
        }
        if self.options.query_timeout_secs == Some(0) {
            anyhow::bail!("options.query_timeout_secs must be greater than 0");
        }
        Ok(())
    }

    pub fn into_settings(self, url_override: Option<String>) -> Settings {
        let mut connect = ConnectConfig::from_url(url_override.unwrap_or(self.database.url))
            .schema(self.database.schema);
        if let Some(secs) = self.database.connect_timeout_secs {
            connect = connect.connect_timeout(Duration::from_secs(secs));
        }

        let mut options =
            TableOptions::new().delete_without_where(self.options.delete_without_where);
        if let Some(secs) = self.options.query_timeout_secs {
            options = options.timeout(Duration::from_secs(secs));
        }
        if let Some(len) = self.options.max_sql_log_length {
            options = options.max_sql_log_length(len);
        }

        Settings { connect, options }
    }
}

/// Replace each `${NAME}` in `input` with `lookup(NAME)`.
fn expand_vars(input: &str, lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = lookup(&key)
                .ok_or_else(|| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
