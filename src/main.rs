use crate::{
    backend::SalonBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, http::create_app, local_salons::LocalSalons,
};
use tracing_subscriber::EnvFilter;

mod availability;
mod backend;
mod configuration;
mod configuration_handler;
mod http;
mod local_salons;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Clone)]
pub struct AppState<T: SalonBackend, C: Configuration> {
    pub backend: T,
    pub configuration: C,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("#################");
    println!("# Salon Booking #");
    println!("#################");

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    println!("Accessable at:\n{}", address.clone());
    let listener = tokio::net::TcpListener::bind(address).await.unwrap();

    let backend = LocalSalons::default();
    if configuration.seed_example_salon() {
        backend.insert_example_salon();
    }
    let app = create_app(backend, configuration);

    axum::serve(listener, app).await.unwrap();
}
