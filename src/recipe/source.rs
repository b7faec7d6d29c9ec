//! Recipe retrieval from a local directory or the remote index.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::Recipe;

/// How long a remote index or recipe fetch may take before it is abandoned.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default recipe index, a static file tree served over HTTPS.
pub const DEFAULT_INDEX_URL: &str = "https://raw.githubusercontent.com/kit-tools/recipes/main";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no recipe found for '{0}'")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid recipe for '{name}': {message}")]
    Parse { name: String, message: String },

    #[error("recipe index unavailable: {0}")]
    Index(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of the recipe index, used by search.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug)]
enum SourceKind {
    /// Directory of `<name>.toml` files.
    Local(PathBuf),
    /// Remote base URL serving `index.json` and `recipes/<name>.toml`.
    Remote(String),
}

/// Where recipes come from.
///
/// The index is fetched at most once per run and reused by every search.
#[derive(Debug)]
pub struct RecipeSource {
    kind: SourceKind,
    index: Option<Vec<IndexEntry>>,
}

impl RecipeSource {
    pub fn local(dir: PathBuf) -> Self {
        Self {
            kind: SourceKind::Local(dir),
            index: None,
        }
    }

    pub fn remote(base_url: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Remote(base_url.into()),
            index: None,
        }
    }

    pub fn default_remote() -> Self {
        Self::remote(DEFAULT_INDEX_URL)
    }

    /// Fetch and parse the recipe for `name`.
    pub fn fetch(&self, name: &str) -> Result<Recipe, SourceError> {
        let text = match &self.kind {
            SourceKind::Local(dir) => {
                let path = dir.join(format!("{name}.toml"));
                if !path.exists() {
                    return Err(SourceError::NotFound(name.to_string()));
                }
                fs::read_to_string(&path)?
            }
            SourceKind::Remote(base) => {
                let url = format!("{base}/recipes/{name}.toml");
                let response = client()?
                    .get(&url)
                    .send()
                    .map_err(|e| SourceError::Network(e.to_string()))?;
                if response.status() == reqwest::StatusCode::NOT_FOUND {
                    return Err(SourceError::NotFound(name.to_string()));
                }
                if !response.status().is_success() {
                    return Err(SourceError::Network(format!(
                        "{url} returned {}",
                        response.status()
                    )));
                }
                response
                    .text()
                    .map_err(|e| SourceError::Network(e.to_string()))?
            }
        };

        Recipe::from_toml(&text).map_err(|e| SourceError::Parse {
            name: name.to_string(),
            message: format!("{e:#}"),
        })
    }

    /// Case-insensitive substring search over the index.
    pub fn search(&mut self, query: &str) -> Result<Vec<IndexEntry>, SourceError> {
        let query = query.to_lowercase();
        let entries = self.index()?;
        Ok(entries
            .iter()
            .filter(|entry| {
                entry.name.to_lowercase().contains(&query)
                    || entry
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&query))
            })
            .cloned()
            .collect())
    }

    fn index(&mut self) -> Result<&[IndexEntry], SourceError> {
        if self.index.is_none() {
            let loaded = match &self.kind {
                SourceKind::Local(dir) => load_local_index(dir)?,
                SourceKind::Remote(base) => load_remote_index(base)?,
            };
            self.index = Some(loaded);
        }
        Ok(self.index.as_deref().unwrap_or_default())
    }
}

fn load_local_index(dir: &std::path::Path) -> Result<Vec<IndexEntry>, SourceError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| SourceError::Index(e.to_string()))? {
        let path = entry?.path();
        if path.extension().is_none_or(|ext| ext != "toml") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        // Unparseable files still appear in the index under their file name.
        let description = fs::read_to_string(&path)
            .ok()
            .and_then(|text| Recipe::from_toml(&text).ok())
            .and_then(|recipe| recipe.package.description);
        entries.push(IndexEntry {
            name: name.to_string(),
            description,
        });
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

fn load_remote_index(base: &str) -> Result<Vec<IndexEntry>, SourceError> {
    let url = format!("{base}/index.json");
    let response = client()?
        .get(&url)
        .send()
        .map_err(|e| SourceError::Index(e.to_string()))?;
    if !response.status().is_success() {
        return Err(SourceError::Index(format!(
            "{url} returned {}",
            response.status()
        )));
    }
    let body = response
        .text()
        .map_err(|e| SourceError::Index(e.to_string()))?;
    serde_json::from_str(&body).map_err(|e| SourceError::Index(e.to_string()))
}

fn client() -> Result<reqwest::blocking::Client, SourceError> {
    reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("kit/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SourceError::Network(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_recipe(dir: &std::path::Path, name: &str, body: &str) {
        let mut file = fs::File::create(dir.join(format!("{name}.toml"))).unwrap();
        file.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn test_local_fetch() {
        let dir = tempfile::tempdir().unwrap();
        write_recipe(
            dir.path(),
            "hurl",
            "[package]\nname = \"hurl\"\ndescription = \"HTTP runner\"\n",
        );

        let source = RecipeSource::local(dir.path().to_path_buf());
        let recipe = source.fetch("hurl").unwrap();
        assert_eq!(recipe.name(), "hurl");
    }

    #[test]
    fn test_local_fetch_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = RecipeSource::local(dir.path().to_path_buf());
        assert!(matches!(
            source.fetch("nope"),
            Err(SourceError::NotFound(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_local_fetch_invalid_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_recipe(dir.path(), "broken", "not toml at all [");

        let source = RecipeSource::local(dir.path().to_path_buf());
        assert!(matches!(
            source.fetch("broken"),
            Err(SourceError::Parse { name, .. }) if name == "broken"
        ));
    }

    #[test]
    fn test_local_search_filters_by_name_and_description() {
        let dir = tempfile::tempdir().unwrap();
        write_recipe(
            dir.path(),
            "taplo",
            "[package]\nname = \"taplo\"\ndescription = \"TOML toolkit\"\n",
        );
        write_recipe(
            dir.path(),
            "hurl",
            "[package]\nname = \"hurl\"\ndescription = \"HTTP runner\"\n",
        );

        let mut source = RecipeSource::local(dir.path().to_path_buf());
        let hits = source.search("toml").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "taplo");

        let all = source.search("").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "hurl");
    }
}
