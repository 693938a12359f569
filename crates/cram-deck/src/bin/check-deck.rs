//! Deck validation CLI tool
//!
//! Parses a deck file with the configured limits and reports its groups, or
//! the first error found.

use cram_config::{load_settings_or_default, DeckLimits};
use cram_deck::DeckError;
use cram_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let deck_path = match args.as_slice() {
        [_, path] => PathBuf::from(path),
        _ => {
            eprintln!("Usage: check-deck <deck-file>");
            eprintln!();
            eprintln!("Validates a cram deck file.");
            eprintln!();
            eprintln!(
                "Limits are read from {} when it exists.",
                default_config_path().display()
            );
            eprintln!();
            eprintln!("Example:");
            eprintln!("  check-deck vocabulary.txt");
            return ExitCode::from(2);
        }
    };

    let limits = match load_settings_or_default(default_config_path()) {
        Ok(settings) => settings.limits,
        Err(e) => {
            eprintln!("Warning: ignoring settings file: {}", e);
            DeckLimits::default()
        }
    };

    match cram_deck::load_session(&deck_path, &limits) {
        Ok(session) => {
            println!("✓ Deck is valid");
            println!();
            println!("Summary:");
            println!("  Bytes: {}", session.buffer().len());
            println!("  BLAKE3: {}", session.digest().to_hex());
            println!("  Groups: {}", session.group_count());
            println!("  Prompts: {}", session.item_count());
            println!();
            println!("Groups:");
            for (index, group) in session.groups().iter().enumerate() {
                let name = session.group_label(index).unwrap_or_default();
                println!(
                    "  - {} [{}s]: {} prompts",
                    name,
                    group.seconds(),
                    group.item_count()
                );
            }

            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Deck validation failed");
            eprintln!();
            match &e {
                DeckError::Read { source, .. } => {
                    eprintln!("Failed to read file: {}", source);
                }
                DeckError::Line { .. } => {
                    eprintln!("{}: {}", deck_path.display(), e);
                }
                _ => {
                    eprintln!("{}", e);
                }
            }
            ExitCode::from(1)
        }
    }
}
