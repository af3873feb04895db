mod cli;
mod infra;
mod routes;
mod score;
mod server;

use school_hr::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
