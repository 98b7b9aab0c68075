use dalal_agent::DEFAULT_CREW;
use dalal_core::{Config, Paths};
use std::io::{self, Write};
use std::path::Path;

/// Write the default config and crew files under `paths`.
pub(crate) fn write_defaults(paths: &Paths) -> anyhow::Result<()> {
    paths.ensure_dirs()?;
    Config::default().save(&paths.config_file())?;
    println!("✓ Created config: {}", paths.config_file().display());
    write_if_not_exists(&paths.crew_file(), DEFAULT_CREW)?;
    Ok(())
}

pub async fn run(force: bool) -> anyhow::Result<()> {
    let paths = Paths::new();

    if paths.config_file().exists() && !force {
        print!("Config already exists. Overwrite? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    write_defaults(&paths)?;

    println!();
    println!("Next steps:");
    println!("  1. Put GEMINI_API_KEY, INDIAN_API_KEY and SERPER_API_KEY in .env or {}", paths.config_file().display());
    println!("  2. Run `dalal doctor` to verify configuration");
    println!("  3. Run `dalal ask` to start asking questions");

    Ok(())
}

fn write_if_not_exists(path: &Path, content: &str) -> io::Result<()> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        println!("✓ Created crew: {}", path.display());
    }
    Ok(())
}
