use std::process::ExitCode;

use clap::Parser;
use fractic_aws_tools::{config::ReplicateArgs, logging::init_tracing, replicate};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = ReplicateArgs::parse();

    match replicate::run(args).await {
        Ok(report) => {
            info!(
                created_local_table = report.created_local_table,
                scanned = report.items_scanned,
                written = report.import.items_written,
                accepted = report.import.items_accepted(),
                "replication finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = ?e, "replication failed");
            ExitCode::FAILURE
        }
    }
}
