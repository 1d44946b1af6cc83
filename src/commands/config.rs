use std::path::Path;

use anyhow::Result;
use booking_core::{BookingConfig, ErrorPolicy};
use owo_colors::OwoColorize;

pub fn run(explicit_path: Option<&Path>, config: &BookingConfig) -> Result<()> {
    let config_path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => BookingConfig::config_path()?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:           {}", config_path.display());
    println!();
    println!("{}", "Settings".bold());
    println!("  max_occurrences:  {}", config.max_occurrences);
    println!(
        "  on_error:         {}",
        match config.on_error {
            ErrorPolicy::Skip => "skip",
            ErrorPolicy::Abort => "abort",
        }
    );

    Ok(())
}
