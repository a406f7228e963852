use crate::{config::Config, error, info, server};

pub async fn serve(mut config: Config, address: Option<String>) {
    if let Some(address) = address {
        config.server_address = address;
    }

    info!("Starting server on {}", config.server_address);

    if let Err(e) = server::start_api_server(config).await {
        error!("Server stopped. Err: {}", e);
    }
}
