use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    /// When unset the service runs against the in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,

    pub jwt_secret: String,
    pub jwt_issuer: Option<String>,

    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,

    pub pixabay_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()
                .expect("PORT must be a number"),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),

            jwt_secret: env::var("AUTH_JWT_SECRET").expect("AUTH_JWT_SECRET must be set"),
            jwt_issuer: env::var("AUTH_JWT_ISSUER").ok().filter(|s| !s.is_empty()),

            rate_limit_max_requests: env::var("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|_| "10".into())
                .parse()
                .expect("RATE_LIMIT_MAX_REQUESTS must be a number"),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|_| "60".into())
                .parse()
                .expect("RATE_LIMIT_WINDOW_SECS must be a number"),

            pixabay_api_key: env::var("PIXABAY_API_KEY").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            jwt_issuer: None,
            rate_limit_max_requests: 3,
            rate_limit_window_secs: 60,
            pixabay_api_key: None,
        }
    }
}
