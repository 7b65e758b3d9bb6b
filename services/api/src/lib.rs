mod cli;
mod infra;
mod routes;
mod seed;
mod server;

use farm_konnect::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
