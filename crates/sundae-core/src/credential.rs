//! API key discovery.
//!
//! Sources are consulted in a fixed order and the first non-empty value wins:
//! an explicit value (CLI flag or interactive entry), the configured
//! environment variables, a dotfile entry, then a plaintext key file.

use crate::config::Config;
use crate::error::AnalysisError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a credential was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    /// Passed in directly (flag or prompt)
    Explicit,
    /// Environment variable with this name
    Environment(String),
    /// Entry in a dotfile
    Dotfile(PathBuf),
    /// Plaintext key file
    KeyFile(PathBuf),
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit => write!(f, "explicit value"),
            CredentialSource::Environment(name) => write!(f, "${name}"),
            CredentialSource::Dotfile(path) => write!(f, "{}", path.display()),
            CredentialSource::KeyFile(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An opaque, non-empty API key.
#[derive(Clone)]
pub struct Credential {
    secret: String,
    source: CredentialSource,
}

impl Credential {
    /// Wrap a key. Returns `None` for blank input.
    pub fn new(secret: impl Into<String>, source: CredentialSource) -> Option<Self> {
        let secret = secret.into().trim().to_string();
        if secret.is_empty() {
            None
        } else {
            Some(Self { secret, source })
        }
    }

    /// The key exactly as it is sent to the API.
    pub fn expose(&self) -> &str {
        &self.secret
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("secret", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve the API key from every configured source.
///
/// Fails with `CredentialMissing` listing every location consulted.
pub fn resolve(config: &Config, explicit: Option<&str>) -> Result<Credential, AnalysisError> {
    if let Some(credential) = explicit.and_then(|k| Credential::new(k, CredentialSource::Explicit))
    {
        return Ok(credential);
    }

    let env_vars: Vec<&str> = config
        .credentials
        .env_vars
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    for name in &env_vars {
        if let Ok(value) = std::env::var(name) {
            if let Some(credential) =
                Credential::new(value, CredentialSource::Environment(name.to_string()))
            {
                tracing::debug!("Using API key from ${name}");
                return Ok(credential);
            }
        }
    }

    let dotenv_path = config.dotenv_path();
    if let Some(value) = read_dotenv(&dotenv_path, &env_vars) {
        if let Some(credential) =
            Credential::new(value, CredentialSource::Dotfile(dotenv_path.clone()))
        {
            tracing::debug!("Using API key from {}", dotenv_path.display());
            return Ok(credential);
        }
    }

    let key_path = config.key_file_path();
    if let Some(value) = read_key_file(&key_path) {
        if let Some(credential) = Credential::new(value, CredentialSource::KeyFile(key_path.clone()))
        {
            tracing::debug!("Using API key from {}", key_path.display());
            return Ok(credential);
        }
    }

    let mut searched: Vec<String> = env_vars.iter().map(|v| format!("${v}")).collect();
    searched.push(format!("{} entry", dotenv_path.display()));
    searched.push(key_path.display().to_string());
    Err(AnalysisError::CredentialMissing { searched })
}

/// Persist a key to the plaintext key file, creating parent directories.
pub fn save_key_file(path: &Path, key: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, format!("{}\n", key.trim()))
}

fn read_key_file(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let key = content.trim();
    (!key.is_empty()).then(|| key.to_string())
}

/// Find the first of `names` assigned in a dotfile.
///
/// Understands `NAME=value`, an optional `export ` prefix, `#` comment lines
/// and single or double quotes around the value.
fn read_dotenv(path: &Path, names: &[&str]) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let entries = parse_dotenv(&content);
    names.iter().find_map(|name| {
        entries
            .iter()
            .find(|(key, value)| key == name && !value.is_empty())
            .map(|(_, value)| value.clone())
    })
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let (key, value) = line.split_once('=')?;
            let value = dotenv_value(value.trim());
            Some((key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// The value part of a dotfile entry.
///
/// A quoted value ends at its closing quote; anything after it (usually a
/// `# comment`) is dropped. Unquoted values end at a ` #` comment.
fn dotenv_value(raw: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(rest) = raw.strip_prefix(quote) {
            if let Some(end) = rest.find(quote) {
                return &rest[..end];
            }
        }
    }
    raw.split(" #").next().unwrap_or(raw).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Config whose sources all live in `dir` and whose env var is unset.
    fn isolated_config(dir: &Path, env_var: &str) -> Config {
        let mut config = Config::default();
        config.credentials.env_vars = vec![env_var.to_string()];
        config.credentials.dotenv_file = dir.join(".env").to_string_lossy().into_owned();
        config.credentials.key_file = dir
            .join("config")
            .join("gemini_api_key.txt")
            .to_string_lossy()
            .into_owned();
        config
    }

    #[test]
    fn test_missing_everywhere() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path(), "SUNDAE_TEST_UNSET_KEY_A1");

        let err = resolve(&config, None).unwrap_err();
        match err {
            AnalysisError::CredentialMissing { searched } => {
                assert_eq!(searched.len(), 3);
                assert_eq!(searched[0], "$SUNDAE_TEST_UNSET_KEY_A1");
                assert!(searched[2].ends_with("gemini_api_key.txt"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path(), "SUNDAE_TEST_UNSET_KEY_A2");
        save_key_file(&config.key_file_path(), "from-file").unwrap();

        let credential = resolve(&config, Some("  typed-key ")).unwrap();
        assert_eq!(credential.expose(), "typed-key");
        assert_eq!(credential.source(), &CredentialSource::Explicit);
    }

    #[test]
    fn test_blank_explicit_falls_through() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path(), "SUNDAE_TEST_UNSET_KEY_A3");
        save_key_file(&config.key_file_path(), "from-file").unwrap();

        let credential = resolve(&config, Some("   ")).unwrap();
        assert_eq!(credential.expose(), "from-file");
    }

    #[test]
    fn test_environment_before_files() {
        let dir = tempfile::tempdir().unwrap();
        let var = "SUNDAE_TEST_SET_KEY_B1";
        let config = isolated_config(dir.path(), var);
        std::fs::write(config.dotenv_path(), format!("{var}=from-dotenv\n")).unwrap();
        std::env::set_var(var, "from-env");

        let credential = resolve(&config, None).unwrap();
        std::env::remove_var(var);
        assert_eq!(credential.expose(), "from-env");
        assert_eq!(
            credential.source(),
            &CredentialSource::Environment(var.to_string())
        );
    }

    #[test]
    fn test_dotenv_before_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let var = "SUNDAE_TEST_UNSET_KEY_C1";
        let config = isolated_config(dir.path(), var);
        std::fs::write(
            config.dotenv_path(),
            format!("# local secrets\nOTHER=1\nexport {var}=\"from-dotenv\"\n"),
        )
        .unwrap();
        save_key_file(&config.key_file_path(), "from-file").unwrap();

        let credential = resolve(&config, None).unwrap();
        assert_eq!(credential.expose(), "from-dotenv");
        assert!(matches!(credential.source(), CredentialSource::Dotfile(_)));
    }

    #[test]
    fn test_key_file_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path(), "SUNDAE_TEST_UNSET_KEY_D1");
        save_key_file(&config.key_file_path(), "  from-file  \n").unwrap();

        let credential = resolve(&config, None).unwrap();
        assert_eq!(credential.expose(), "from-file");
        assert!(matches!(credential.source(), CredentialSource::KeyFile(_)));
    }

    #[test]
    fn test_empty_key_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = isolated_config(dir.path(), "SUNDAE_TEST_UNSET_KEY_D2");
        save_key_file(&config.key_file_path(), "   ").unwrap();
        assert!(matches!(
            resolve(&config, None),
            Err(AnalysisError::CredentialMissing { .. })
        ));
    }

    #[test]
    fn test_parse_dotenv_quotes_and_comments() {
        let entries = parse_dotenv("A='one'\nB=two # note\n#C=3\n\nD\nE = \"five\"\n");
        assert_eq!(
            entries,
            vec![
                ("A".to_string(), "one".to_string()),
                ("B".to_string(), "two".to_string()),
                ("E".to_string(), "five".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_value_with_trailing_comment() {
        let entries = parse_dotenv(
            "GEMINI_API_KEY=\"abc123\" # my key\nOTHER='x y' #note\nBARE=\"unterminated\n",
        );
        assert_eq!(entries[0], ("GEMINI_API_KEY".to_string(), "abc123".to_string()));
        assert_eq!(entries[1], ("OTHER".to_string(), "x y".to_string()));
        assert_eq!(entries[2], ("BARE".to_string(), "\"unterminated".to_string()));
    }

    #[test]
    fn test_dotenv_key_with_comment_resolves_clean() {
        let dir = tempfile::tempdir().unwrap();
        let var = "SUNDAE_TEST_UNSET_KEY_C2";
        let config = isolated_config(dir.path(), var);
        std::fs::write(config.dotenv_path(), format!("{var}=\"abc123\" # my key\n")).unwrap();

        let credential = resolve(&config, None).unwrap();
        assert_eq!(credential.expose(), "abc123");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let credential = Credential::new("super-secret", CredentialSource::Explicit).unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("redacted"));
    }
}
