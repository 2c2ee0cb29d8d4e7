//! Root shell example: walk a multi-shelf element with nested logins.
//!
//! Connects to the master shelf's active controller as root, then visits
//! the standby controller, a slave shelf and a card, printing `uptime` at
//! each stop.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example root_hops -- --host 10.0.0.1 --password secret --shelf 2 --slot 3
//! ```

use std::env;
use std::time::Duration;

use shelfwalk::{HostKeyVerification, SessionBuilder, Shell};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to {}:{} as {}...", args.host, args.port, args.user);

    let mut root = SessionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .password(&args.password)
        .timeout(Duration::from_secs(args.timeout))
        .host_key_verification(HostKeyVerification::Disabled)
        .build_root()?;

    root.open().await?;
    match root.identity() {
        Some(identity) => println!("Connected to {}\n", identity),
        None => println!("Connected, prompt {:?}\n", root.prompt()),
    }

    // Standby controller of the master shelf
    root.login_to_standby_controller().await?;
    println!("At {}", root.location());
    println!("{}", root.send_command("uptime").await?.result());
    root.logout_from_standby_controller().await?;

    // Slave shelf, whichever controller is active
    if let Some(shelf) = args.shelf {
        match root.login_to_shelf(shelf, None, true).await {
            Ok(()) => {
                println!("\nAt {}", root.location());
                println!("{}", root.send_command("uptime").await?.result());

                if let Some(slot) = args.slot {
                    visit_slot(&mut root, shelf, slot).await?;
                }
                root.logout_from_shelf().await?;
            }
            Err(e) if e.is_hop_failure() => eprintln!("Skipping shelf {}: {}", shelf, e),
            Err(e) => return Err(e.into()),
        }
    }

    let location = serde_json::to_string(&root.location())?;
    println!("\nBack at {}", location);

    root.close().await?;
    println!("Done!");

    Ok(())
}

async fn visit_slot(
    root: &mut shelfwalk::RootNavigator,
    shelf: u8,
    slot: u8,
) -> Result<(), shelfwalk::Error> {
    root.login_to_slot(shelf, slot).await?;
    println!("\nAt {} (prompt {:?})", root.location(), root.prompt());
    println!("{}", root.send_command("uptime").await?.result());
    root.logout_from_slot().await
}

struct Args {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: u64,
    shelf: Option<u8>,
    slot: Option<u8>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut host = "localhost".to_string();
        let mut port = 22u16;
        let mut user = "root".to_string();
        let mut password = String::new();
        let mut timeout = 30u64;
        let mut shelf = None;
        let mut slot = None;

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
                "--shelf" => {
                    i += 1;
                    if i < args.len() {
                        shelf = args[i].parse().ok();
                    }
                }
                "--slot" => {
                    i += 1;
                    if i < args.len() {
                        slot = args[i].parse().ok();
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
            shelf,
            slot,
        }
    }
}
