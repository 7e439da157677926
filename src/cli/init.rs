use colored::Colorize;

use crate::error::Result;
use crate::settings::{expand_home, save_settings, settings_file_exists, settings_path, Settings};

pub fn run(output_dir: Option<String>, force: bool) -> Result<()> {
    if settings_file_exists() && !force {
        println!(
            "{} already exists (use --force to overwrite).",
            settings_path().display()
        );
        return Ok(());
    }

    let mut settings = Settings::default();
    if let Some(dir) = output_dir {
        settings.output_dir = expand_home(&dir);
    }
    std::fs::create_dir_all(&settings.output_dir)?;
    save_settings(&settings)?;

    println!("{} {}", "Wrote".green(), settings_path().display());
    println!("Reports will be saved to {}", settings.output_dir);
    Ok(())
}
