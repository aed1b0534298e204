#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum CargoEnv {
    Development,
    Production,
}

#[derive(clap::Parser, Debug, Clone)]
pub struct AppConfig {
    // production or development
    #[clap(long, env, value_enum)]
    pub cargo_env: CargoEnv,

    // port that the app will bind to
    #[clap(long, env, default_value = "3000")]
    pub port: u16,

    // either * for allowing everything, or a comma seperated list of domains like
    // example.com,something.com
    // only the json routes use this, the streaming proxy always answers with *
    #[clap(long, env, default_value = "*")]
    pub cors_origin: String,

    // the cdn only serves to its own embedding site, so every upstream call pretends to be it
    #[clap(long, env, default_value = "https://moviebox.ng")]
    pub upstream_origin: String,

    #[clap(long, env, default_value = "https://moviebox.ng")]
    pub upstream_referer: String,

    #[clap(
        long,
        env,
        default_value = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
    )]
    pub upstream_user_agent: String,

    // catalog + captions api, no trailing slash
    #[clap(long, env, default_value = "https://movapi.xyz/mbapi")]
    pub content_api_url: String,

    // only the connect phase is bounded, video bodies can stream for hours
    #[clap(long, env, default_value = "10")]
    pub upstream_connect_timeout_secs: u64,

    #[clap(long, env, default_value = "logs")]
    pub log_dir: String,

    // optional sentry integration
    #[clap(long, env)]
    pub sentry_dsn: Option<String>,
}

impl AppConfig {
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origin
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect()
    }
}

impl Default for AppConfig {
    // mostly for tests, the real values come from the env
    fn default() -> Self {
        Self {
            cargo_env: CargoEnv::Development,
            port: 3000,
            cors_origin: "*".to_string(),
            upstream_origin: "https://moviebox.ng".to_string(),
            upstream_referer: "https://moviebox.ng".to_string(),
            upstream_user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            content_api_url: "https://movapi.xyz/mbapi".to_string(),
            upstream_connect_timeout_secs: 10,
            log_dir: "logs".to_string(),
            sentry_dsn: None,
        }
    }
}
