use clap::Parser;

mod app;
mod tui;

#[derive(Parser)]
#[command(name = "connect4")]
#[command(about = "Connect to a Connect-Four server", long_about = None)]
struct Cli {
    /// Server base URL
    #[arg(short, long, default_value = "http://127.0.0.1:8000")]
    server: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = app::run(&cli.server).await {
        eprintln!("Error: {}", e);
    }
}
