use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

pub const DEFAULT_LOCATION: &str = "us";
pub const DEFAULT_BATCH_SIZE: usize = 5;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub api_keys: ApiKeys,
    #[serde(default)]
    pub crawl: CrawlSettings,
    pub browser: BrowserSettings,
    pub output: OutputSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiKeys {
    pub scrapeops: String,
}

/// Run parameters for both crawl stages.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct CrawlSettings {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(
        default = "default_batch_size",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub batch_size: usize,
    #[serde(
        default = "default_max_attempts",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub max_attempts: u32,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        CrawlSettings {
            keywords: vec![],
            location: default_location(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Webdriver,
    Http,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BrowserSettings {
    pub kind: BrowserKind,
    pub webdriver_url: String,
    #[serde(default)]
    pub headless: bool,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct OutputSettings {
    pub directory: String,
}

fn default_location() -> String {
    DEFAULT_LOCATION.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("No current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(
            config::File::from(configuration_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    parse_settings(settings)
}

fn parse_settings(settings: config::Config) -> Result<Settings, config::ConfigError> {
    let settings = settings.try_deserialize::<Settings>()?;

    if settings.crawl.batch_size == 0 {
        return Err(config::ConfigError::Message(
            "crawl.batch_size must be at least 1".to_string(),
        ));
    }

    Ok(settings)
}
