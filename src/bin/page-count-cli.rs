use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "page-count-cli")]
#[command(about = "Command-line client for the page-counter API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "PAGE_COUNTER_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count pages or slides of a remote DOCX/PPTX file
    Count {
        /// URL of the document
        file_url: String,
    },
    /// Check server liveness
    Health,
    /// Show API usage information
    Info,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Count { file_url } => {
            client
                .post(format!("{}/api/count-pages", base))
                .json(&json!({ "fileUrl": file_url }))
                .send()
                .await?
        }
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Info => client.get(format!("{}/", base)).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Some(message) = json.get("error").and_then(Value::as_str) {
            eprintln!("{}", message);
        }
        std::process::exit(1);
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
