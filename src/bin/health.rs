use std::env;
use std::error;
use std::process::exit;

use reqwest::Url;

/// Probes the relay's health route so container orchestrators can restart a
/// wedged instance.
fn main() -> Result<(), Box<dyn error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        panic!("Missing URL argument")
    }

    let url = Url::parse(&args[1])?.join("/health")?;

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        eprintln!("Relay reported status {}", response.status());
        exit(1);
    }

    Ok(())
}
