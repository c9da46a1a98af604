//! Project initialization for sapling
//!
//! `sapling init` creates the `.sapling` directory, a default config and the
//! SQLite store, and keeps the local store out of git.

use crate::config::Config;
use crate::store::SqliteStore;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Initialize sapling in `dir`
pub fn init_project(dir: &Path) -> Result<(), String> {
    println!("\n{}", "Initializing Sapling...".cyan().bold());
    println!("   Directory: {}\n", dir.display());

    let sapling_dir = dir.join(".sapling");
    create_dir_if_missing(&sapling_dir)?;

    let config_path = sapling_dir.join("config.toml");
    write_file_if_missing(&config_path, &Config::default_toml(), ".sapling/config.toml")?;

    // Opening runs the table setup
    let db_path = sapling_dir.join("sapling.db");
    if db_path.exists() {
        println!("   {} .sapling/sapling.db (already exists)", "Skipping".yellow());
    } else {
        SqliteStore::open_at(&db_path).map_err(|e| format!("Could not create store: {}", e))?;
        println!("   {} .sapling/sapling.db", "Creating".green());
    }

    add_to_gitignore(dir)?;

    println!("\n{}", "Sapling initialized!".green().bold());
    println!("\nNext steps:");
    println!("  1. Run {} to edit the roadmap", "sapling".cyan());
    println!("  2. Run {} to browse it in a web page", "sapling serve".cyan());
    println!();

    Ok(())
}

fn create_dir_if_missing(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Could not create {}: {}", path.display(), e))?;
        println!("   {} {}", "Creating".green(), path.display());
    }
    Ok(())
}

fn write_file_if_missing(path: &Path, content: &str, display_name: &str) -> Result<(), String> {
    if path.exists() {
        println!("   {} {} (already exists)", "Skipping".yellow(), display_name);
    } else {
        fs::write(path, content)
            .map_err(|e| format!("Could not write {}: {}", display_name, e))?;
        println!("   {} {}", "Creating".green(), display_name);
    }
    Ok(())
}

fn add_to_gitignore(dir: &Path) -> Result<(), String> {
    let gitignore_path = dir.join(".gitignore");
    let entry = ".sapling/sapling.db";

    if gitignore_path.exists() {
        let existing = fs::read_to_string(&gitignore_path)
            .map_err(|e| format!("Could not read .gitignore: {}", e))?;

        if existing
            .lines()
            .any(|line| matches!(line.trim(), ".sapling/sapling.db" | ".sapling/" | ".sapling"))
        {
            return Ok(());
        }

        let new_content = format!("{}\n\n# Sapling store (local)\n{}\n", existing.trim_end(), entry);
        fs::write(&gitignore_path, new_content)
            .map_err(|e| format!("Could not update .gitignore: {}", e))?;
        println!("   {} .gitignore (added {})", "Updated".green(), entry);
    } else {
        let content = format!("# Sapling store (local)\n{}\n", entry);
        fs::write(&gitignore_path, content)
            .map_err(|e| format!("Could not create .gitignore: {}", e))?;
        println!("   {} .gitignore", "Creating".green());
    }

    Ok(())
}
