use anyhow::Result;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &mut App, toggle: bool, format: &OutputFormat) -> Result<()> {
    let theme = if toggle {
        app.flashdeck.flashcards.toggle_theme()
    } else {
        app.flashdeck.flashcards.theme()
    };

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "theme": theme });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain if toggle => println!("Switched to {} theme", theme.as_str()),
        OutputFormat::Plain => println!("{}", theme.as_str()),
    }
    Ok(())
}
