use {
    crate::error::Error,
    config::{Config, Environment, File, Map},
    serde::de::DeserializeOwned,
    std::path::PathBuf,
};

/// Nested keys are separated by a double underscore in variable names, e.g.
/// `SINK__BUCKET` sets `sink.bucket`.
const SEPARATOR: &str = "__";

pub struct ConfigParser {}

impl ConfigParser {
    /// Read a TOML file, with environment variables taking precedence.
    pub fn parse<D>(path: PathBuf) -> Result<D, Error>
    where
        D: DeserializeOwned,
    {
        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::default().separator(SEPARATOR))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Read the process environment only.
    pub fn from_env<D>() -> Result<D, Error>
    where
        D: DeserializeOwned,
    {
        let config = Config::builder()
            .add_source(Environment::default().separator(SEPARATOR))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Read an explicit set of variables, as if they were the environment.
    pub fn from_vars<D, I, K, V>(vars: I) -> Result<D, Error>
    where
        D: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let source = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<Map<String, String>>();

        let config = Config::builder()
            .add_source(
                Environment::default()
                    .separator(SEPARATOR)
                    .source(Some(source)),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[derive(Debug, serde::Deserialize)]
    struct TestSettings {
        messages_topic: String,
        sink: Sink,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Sink {
        bucket: String,
    }

    #[test]
    fn test_parse_config_file() {
        std::env::set_var("SINK__BUCKET", "from-env");

        let config: TestSettings = ConfigParser::parse(PathBuf::from("fixtures/config_test1.toml"))
            .expect("Failed to parse file");

        assert_that!(config.messages_topic.as_str()).is_equal_to("messages");
        assert_that!(config.sink.bucket.as_str()).is_equal_to("from-env");
    }

    #[test]
    fn test_parse_explicit_vars() {
        let config: TestSettings =
            ConfigParser::from_vars([("MESSAGES_TOPIC", "blocks"), ("SINK__BUCKET", "claims")])
                .expect("Failed to parse vars");

        assert_that!(config.messages_topic.as_str()).is_equal_to("blocks");
        assert_that!(config.sink.bucket.as_str()).is_equal_to("claims");
    }
}
