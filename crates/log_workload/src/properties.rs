use {
    crate::ConfigError,
    core::str::FromStr,
    std::{collections::BTreeMap, path::Path},
};

/// Key under which each task's client receives its identity.
pub const CLIENT_ID_KEY: &str = "dur_log.client_id";

/// String key/value configuration shared by the driver and the log clients.
///
/// Keys the driver does not understand are passed through to every client untouched.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Properties(BTreeMap<String, String>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get_property(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parses the value for `key`, falling back to `default` if the key is absent.
    pub fn parse_or<T: FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match self.get_property(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Sets a property from a `key=value` assignment such as a `-p` command line argument.
    pub fn set_assignment(&mut self, assignment: &str) -> Result<(), ConfigError> {
        let (key, value) = assignment
            .split_once('=')
            .map(|(k, v)| (k.trim(), v.trim()))
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| ConfigError::MalformedProperty(assignment.to_string()))?;
        self.set_property(key, value);
        Ok(())
    }

    /// Merges `key=value` lines. Blank lines and lines starting with `#` are ignored. Later
    /// assignments override earlier ones.
    pub fn merge_str(&mut self, text: &str) -> Result<(), ConfigError> {
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.set_assignment(line)?;
        }
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_str(&text)
    }
}

impl FromStr for Properties {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut properties = Properties::new();
        properties.merge_str(text)?;
        Ok(properties)
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_property_text() {
        let props: Properties = "# workload\n\
                                 count = 20\n\
                                 \n\
                                 ratio=0.5\n\
                                 dur_log.server_uri=127.0.0.1:31850\n\
                                 count=25\n"
            .parse()
            .unwrap();
        assert_eq!(props.get_property("count"), Some("25"));
        assert_eq!(props.get_property("ratio"), Some("0.5"));
        assert_eq!(
            props.get_property("dur_log.server_uri"),
            Some("127.0.0.1:31850")
        );
        assert!(!props.contains_key("threads"));
        let keys: Vec<_> = props.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["count", "dur_log.server_uri", "ratio"]);
    }

    #[test]
    fn rejects_lines_without_key() {
        let mut props = Properties::new();
        assert!(matches!(
            props.set_assignment("no-equals-sign"),
            Err(ConfigError::MalformedProperty(s)) if s == "no-equals-sign"
        ));
        assert!(matches!(
            props.set_assignment("=value"),
            Err(ConfigError::MalformedProperty(_))
        ));
        props.set_assignment("empty=").unwrap();
        assert_eq!(props.get_property("empty"), Some(""));
    }

    #[test]
    fn typed_lookup() {
        let props: Properties = [("count", "12"), ("ratio", "abc")].into_iter().collect();
        assert_eq!(props.parse_or("count", 10usize).unwrap(), 12);
        assert_eq!(props.parse_or("threads", 5usize).unwrap(), 5);
        assert!(matches!(
            props.parse_or("ratio", 0.8f64),
            Err(ConfigError::InvalidValue { key, value }) if key == "ratio" && value == "abc"
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.properties");
        let mut props = Properties::new();
        assert!(matches!(
            props.load(&path),
            Err(ConfigError::Read { path: p, .. }) if p == path
        ));
    }
}
