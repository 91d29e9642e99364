use std::collections::HashMap;
use std::path::PathBuf;

use figment::providers::{Format, Yaml};
use figment::Figment;

/// Flat `key -> message` translations for one locale.
pub type Messages = HashMap<String, String>;

/// Where a locale's messages come from.
pub trait MessageSource: Send + Sync {
    fn load(&self, code: &str) -> Result<Messages, String>;
}

/// Reads `<directory>/locale_<code>.yaml`.
pub struct DirectorySource {
    directory: PathBuf,
}

impl DirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        DirectorySource {
            directory: directory.into(),
        }
    }

    pub fn path_for(&self, code: &str) -> PathBuf {
        self.directory.join(format!("locale_{}.yaml", code))
    }
}

impl MessageSource for DirectorySource {
    fn load(&self, code: &str) -> Result<Messages, String> {
        let path = self.path_for(code);
        // figment silently yields nothing for a missing file
        if !path.is_file() {
            return Err(format!("message file {} not found", path.display()));
        }
        Figment::new()
            .merge(Yaml::file(&path))
            .extract::<Messages>()
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))
    }
}

/// In-memory messages, keyed by locale code.
#[derive(Default)]
pub struct StaticSource {
    locales: HashMap<String, Messages>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale<I, K, V>(mut self, code: &str, messages: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.locales.insert(
            code.to_string(),
            messages
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }
}

impl MessageSource for StaticSource {
    fn load(&self, code: &str) -> Result<Messages, String> {
        self.locales
            .get(code)
            .cloned()
            .ok_or_else(|| format!("no messages for locale '{}'", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("langproxy-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn reads_yaml_message_file() {
        let dir = temp_dir("source-ok");
        std::fs::write(
            dir.join("locale_pl-PL.yaml"),
            "AuthSessionExpired: \"Sesja wygasła\"\nNoDataFound: Brak danych\n",
        )
        .unwrap();

        let messages = DirectorySource::new(&dir).load("pl-PL").unwrap();
        assert_eq!(messages["AuthSessionExpired"], "Sesja wygasła");
        assert_eq!(messages["NoDataFound"], "Brak danych");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = temp_dir("source-missing");
        assert!(DirectorySource::new(&dir).load("xx-XX").is_err());
    }

    #[test]
    fn nested_values_are_rejected() {
        let dir = temp_dir("source-nested");
        std::fs::write(dir.join("locale_de-DE.yaml"), "Menu:\n  Home: Start\n").unwrap();
        assert!(DirectorySource::new(&dir).load("de-DE").is_err());
    }

    #[test]
    fn static_source_knows_only_its_locales() {
        let source = StaticSource::new().with_locale("en-US", [("Hello", "Hello")]);
        assert_eq!(source.load("en-US").unwrap()["Hello"], "Hello");
        assert!(source.load("fr-FR").is_err());
    }
}
