use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tokio_stream::{StreamExt, wrappers::LinesStream};

use foundry_chat::client::FoundryClient;
use foundry_chat::config::AppConfig;
use foundry_chat::core::{ChatError, ChatSession};
use foundry_chat::decoder::RevealSink;
use foundry_chat::logging;

#[derive(Parser, Debug)]
#[command(name = "foundry-chat")]
#[command(author, version, about = "Streaming terminal client for a local Foundry chat endpoint", long_about = None)]
struct Cli {
    /// Model to use (e.g., gpt-oss-20b-cuda-gpu)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Base URL of the chat-completions endpoint
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Max tokens per response
    #[arg(long, global = true)]
    max_tokens: Option<u32>,

    /// Print responses at once instead of typing them out
    #[arg(long, global = true)]
    no_typing: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigSubcommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigSubcommands {
    Init,
    Where,
}

/// Prints each revealed character immediately, like a typewriter.
struct StdoutSink;

impl RevealSink for StdoutSink {
    fn on_reveal(&mut self, ch: char) {
        print!("{ch}");
        let _ = std::io::stdout().flush();
    }

    fn on_turn_complete(&mut self, _text: &str) {
        println!();
    }
}

fn apply_cli_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.max_tokens = max_tokens;
    }
    if cli.no_typing {
        config.reveal_delay_ms = 0;
    }
}

fn run_config_command(command: &ConfigSubcommands) -> std::process::ExitCode {
    match command {
        ConfigSubcommands::Init => match AppConfig::init_default() {
            Ok(path) => {
                println!("Created config at {}", path.display());
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to create config: {e}");
                std::process::ExitCode::FAILURE
            }
        },
        ConfigSubcommands::Where => {
            match AppConfig::get_config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("Could not determine config directory"),
            }
            std::process::ExitCode::SUCCESS
        }
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let _log_guard = logging::init(cli.verbose);

    if let Some(Commands::Config { command }) = &cli.command {
        return run_config_command(command);
    }

    let mut config = AppConfig::load();
    apply_cli_overrides(&mut config, &cli);

    let client = match FoundryClient::new(config.endpoint.as_str()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            return std::process::ExitCode::FAILURE;
        }
    };

    let mut session = ChatSession::new(Arc::new(client), config.generation_params())
        .with_reveal_delay(Duration::from_millis(config.reveal_delay_ms));

    println!(
        "Chatting with {} at {} (ctrl-d or \"exit\" to quit)",
        session.params().model,
        config.endpoint
    );

    let mut stdin = LinesStream::new(tokio::io::BufReader::new(tokio::io::stdin()).lines());
    let mut sink = StdoutSink;

    loop {
        print!("you> ");
        let _ = std::io::stdout().flush();

        let line = match stdin.next().await {
            Some(Ok(line)) => line,
            None => break,
            Some(Err(e)) => {
                eprintln!("Failed to read input: {e}");
                break;
            }
        };

        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        match session.send(input, &mut sink).await {
            Ok(text) if text.is_empty() => println!("(no answer produced)"),
            Ok(_) => {}
            Err(ChatError::InvalidInput) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }

    std::process::ExitCode::SUCCESS
}
