use crate::configuration::Configuration;
use clap::Parser;
use std::path::PathBuf;

fn default_password() -> String {
    std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "123".to_string())
}

#[derive(Parser, Clone, Debug)]
#[command(about = "Salon booking service")]
pub struct ConfigurationHandler {
    #[arg(long, default_value = "Salon Booking")]
    website_title: String,

    /// Admin password; defaults to the ADMIN_PASSWORD environment variable.
    #[arg(long, default_value_t = default_password())]
    password: String,

    #[arg(long, default_value = "frontend/index.html")]
    frontend_path: PathBuf,

    #[arg(long, default_value = "3000")]
    port: String,

    /// Insert an example salon with two staff members on startup.
    #[arg(long, default_value_t = false)]
    seed_example_salon: bool,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn website_title(&self) -> String {
        self.website_title.clone()
    }

    fn password(&self) -> String {
        self.password.clone()
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn port(&self) -> String {
        self.port.clone()
    }

    fn seed_example_salon(&self) -> bool {
        self.seed_example_salon
    }
}
