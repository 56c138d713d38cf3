use super::environment::AppConfig;

#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
}

impl RedisConfig {
    pub fn from_app(config: &AppConfig) -> Option<Self> {
        let url = config.redis_url.clone()?;
        Some(Self { url })
    }
}
