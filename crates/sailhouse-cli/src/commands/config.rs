use anyhow::Result;
use colored::Colorize;

use crate::cli::{ConfigCommands, OutputFormat};
use crate::config::ConfigStore;
use crate::output::{print_data, print_success};

pub fn run(
    store: &ConfigStore,
    profile: &str,
    command: &ConfigCommands,
    format: OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let cfg = store.load_profile(profile)?;
            print_data(&cfg, format, |cfg| {
                let show = |v: Option<&str>| v.unwrap_or("(not set)").to_string();
                println!("{}: {}", "Profile".cyan(), profile);
                println!("{}: {}", "Config dir".cyan(), store.dir().display());
                println!("{}: {}", "API URL".cyan(), show(cfg.api_url.as_deref()));
                println!("{}: {}", "Team".cyan(), show(cfg.team.as_deref()));
                println!("{}: {}", "App".cyan(), show(cfg.app.as_deref()));
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    cfg.format
                        .map(|f| format!("{f:?}").to_lowercase())
                        .unwrap_or_else(|| "text".to_string())
                );
            })
        }
        ConfigCommands::Set(args) => {
            let mut cfg = store.load_profile(profile)?;
            cfg.set(&args.key, &args.value)?;
            store.save_profile(profile, &cfg)?;
            print_success(&format!("Set {} = {}", args.key, args.value));
            Ok(())
        }
    }
}
