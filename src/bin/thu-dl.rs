use clap::Parser;

use thu_cloud_dl::cli::{Args, run};

#[tokio::main]
async fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
