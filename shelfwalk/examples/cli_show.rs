//! CLI example: log in to the 1830 PSS CLI and run show commands.
//!
//! The SSH login always uses the element's `cli` account; `--user` and
//! `--password` answer the CLI's own login questions.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example cli_show -- --host 10.0.0.1 --user admin --password admin
//! cargo run --example cli_show -- --host 10.0.0.1 --user admin --password admin -c "show slot *"
//! ```

use std::env;
use std::io::{self, Write};
use std::time::Duration;

use shelfwalk::{Completion, HostKeyVerification, SessionBuilder, Shell};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to {}:{}...", args.host, args.port);

    let mut cli = SessionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .timeout(Duration::from_secs(args.timeout))
        .host_key_verification(HostKeyVerification::Disabled)
        .build_cli()?;

    cli.open().await?;
    println!("Connected! Prompt: {:?}\n", cli.prompt().unwrap_or_default());

    // Stream one command as it arrives
    let command = args.command.as_deref().unwrap_or("show general detail");
    println!("Streaming: {}", command);
    println!("{}", "-".repeat(50));

    let mut stream = cli.execute(command).await?;
    let mut total_bytes = 0usize;
    while let Some(chunk) = stream.next_chunk().await? {
        total_bytes += chunk.len();
        print!("{}", chunk);
        io::stdout().flush()?;
    }
    let completion = stream.completion();
    drop(stream);

    println!("\n{}", "-".repeat(50));
    println!("Streamed {} bytes ({:?})", total_bytes, completion);
    if completion == Completion::TimedOut {
        println!("The prompt never came back; output may be partial");
    }

    // --- Batch Commands ---
    let commands = ["show version", "show slot *"];
    println!("\nExecuting {} commands...", commands.len());
    let outputs = cli.send_commands(&commands).await?;

    for output in &outputs {
        println!("\n> {} ({:?} in {:?})", output.command, output.completion, output.elapsed);
        println!("{}", "-".repeat(40));
        println!("{}", output.result());
    }

    println!("\nClosing connection...");
    cli.close().await?;
    println!("Done!");

    Ok(())
}

struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
    command: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = "admin".to_string();
        let mut password = "admin".to_string();
        let mut timeout = 30u64;
        let mut command = None;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    i += 1;
                    if i < args.len() {
                        host = args[i].clone();
                    }
                }
                "--port" | "-p" => {
                    i += 1;
                    if i < args.len() {
                        port = args[i].parse().unwrap_or(22);
                    }
                }
                "--user" | "-u" => {
                    i += 1;
                    if i < args.len() {
                        user = args[i].clone();
                    }
                }
                "--password" | "-P" => {
                    i += 1;
                    if i < args.len() {
                        password = args[i].clone();
                    }
                }
                "--timeout" | "-t" => {
                    i += 1;
                    if i < args.len() {
                        timeout = args[i].parse().unwrap_or(30);
                    }
                }
                "--command" | "-c" => {
                    i += 1;
                    if i < args.len() {
                        command = Some(args[i].clone());
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Self {
            host,
            port,
            user,
            password,
            timeout,
            command,
        }
    }
}
