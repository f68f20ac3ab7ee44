//! Categories command - show an excipient category table.

use std::path::PathBuf;

use colored::Colorize;
use excipient::ExcipientCategories;

use super::CommandResult;

pub fn run(file: PathBuf, json: bool) -> CommandResult {
    let table = ExcipientCategories::load(&file)?;
    let ordered = table.ordered();

    if json {
        println!("{}", serde_json::to_string_pretty(&ordered)?);
        return Ok(());
    }

    for entry in &ordered {
        println!(
            "{} {}",
            entry.name.cyan().bold(),
            format!("({})", entry.ingredients.len()).dimmed()
        );
        for ingredient in &entry.ingredients {
            println!("  - {}", ingredient);
        }
    }

    println!();
    println!(
        "{} categories from {}",
        ordered.len().to_string().white().bold(),
        file.display()
    );
    Ok(())
}
