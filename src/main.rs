// src/main.rs

use std::process::ExitCode;

use filterchain::{cli, logging, run};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(cli::usage_exit_code(&err));
        }
    };

    match run_main(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run_main(args: cli::CliArgs) -> anyhow::Result<bool> {
    logging::init_logging(args.log_level)?;
    run(args).await
}
