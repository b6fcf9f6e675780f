use {
    crate::Result,
    config_parser::ConfigParser,
    serde::Deserialize,
    std::path::PathBuf,
};

/// Region of the claim-check bucket.
pub const CLAIM_CHECK_REGION: &str = "ap-southeast-1";

/// Connection settings of the bus and the blob store, read once at boot.
///
/// Each field is filled from the upper-cased environment variable of the same
/// name, e.g. `kafka_bootstrap_server` from `KAFKA_BOOTSTRAP_SERVER`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct EmitterConfig {
    pub kafka_bootstrap_server: String,
    pub messages_topic: String,
    #[serde(default)]
    pub kafka_api_key: String,
    #[serde(default)]
    pub kafka_api_secret: String,
    #[serde(default)]
    pub aws_access_key: String,
    #[serde(default)]
    pub aws_secret_key: String,
    pub claim_check_bucket: String,
}

impl EmitterConfig {
    /// Read the process environment, layered over an optional TOML file.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        Ok(match path {
            Some(path) => ConfigParser::parse(path)?,
            None => ConfigParser::from_env()?,
        })
    }

    /// Read from an explicit set of variables instead of the process
    /// environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Ok(ConfigParser::from_vars(vars)?)
    }

    pub fn region(&self) -> &'static str {
        CLAIM_CHECK_REGION
    }
}

// ----------------------------------- tests -----------------------------------

#[cfg(test)]
mod tests {
    use {super::*, assertor::*};

    #[test]
    fn reads_the_variables() {
        let config = EmitterConfig::from_vars([
            ("KAFKA_BOOTSTRAP_SERVER", "broker:9092"),
            ("MESSAGES_TOPIC", "messages"),
            ("KAFKA_API_KEY", "key"),
            ("KAFKA_API_SECRET", "secret"),
            ("AWS_ACCESS_KEY", "access"),
            ("AWS_SECRET_KEY", "aws-secret"),
            ("CLAIM_CHECK_BUCKET", "bucket"),
        ])
        .unwrap();

        assert_that!(config).is_equal_to(EmitterConfig {
            kafka_bootstrap_server: "broker:9092".to_string(),
            messages_topic: "messages".to_string(),
            kafka_api_key: "key".to_string(),
            kafka_api_secret: "secret".to_string(),
            aws_access_key: "access".to_string(),
            aws_secret_key: "aws-secret".to_string(),
            claim_check_bucket: "bucket".to_string(),
        });
        assert_that!(config.region()).is_equal_to("ap-southeast-1");
    }

    #[test]
    fn missing_topic_is_an_error() {
        let result = EmitterConfig::from_vars([
            ("KAFKA_BOOTSTRAP_SERVER", "broker:9092"),
            ("CLAIM_CHECK_BUCKET", "bucket"),
        ]);

        assert_that!(result.is_err()).is_true();
    }
}
