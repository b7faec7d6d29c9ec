//! Requirement spec strings: `name` or `name@version`.

/// A parsed requirement: a tool name and an optional pinned version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Parse a requirement string.
    ///
    /// The version is everything after the last `@`. If that part is empty,
    /// or stripping it would leave an empty name, the whole string is the
    /// name. Only `@` delimits; names containing slashes, dots or colons
    /// pass through untouched.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if let Some((name, version)) = input.rsplit_once('@')
            && !name.is_empty()
            && !version.is_empty()
        {
            return Self {
                name: name.to_string(),
                version: Some(version.to_string()),
            };
        }
        Self {
            name: input.to_string(),
            version: None,
        }
    }
}

impl std::fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}
