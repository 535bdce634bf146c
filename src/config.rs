// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Dev convenience: bootstrap admin credentials
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
}

impl Config {
    pub fn init() -> Config {
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(8000);

        let seed_admin_email = std::env::var("SEED_ADMIN_EMAIL").ok();
        let seed_admin_password = std::env::var("SEED_ADMIN_PASSWORD").ok();

        Config {
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port,
            seed_admin_email,
            seed_admin_password,
        }
    }
}
