use std::process::ExitCode;

use clap::Parser;
use fractic_aws_tools::{config::CollectEnvArgs, env_collect, logging::init_tracing};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = CollectEnvArgs::parse();

    match env_collect::run(args).await {
        Ok(document) => {
            println!("{document}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "environment collection failed");
            ExitCode::FAILURE
        }
    }
}
