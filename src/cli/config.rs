use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path};

pub fn run(export_dir: Option<String>, sheet: Option<String>, clear_sheet: bool) -> Result<()> {
    let mut settings = load_settings();
    let changed = export_dir.is_some() || sheet.is_some() || clear_sheet;

    if let Some(dir) = export_dir {
        settings.export_dir = dir;
    }
    if let Some(name) = sheet {
        settings.sheet = Some(name);
    }
    if clear_sheet {
        settings.sheet = None;
    }
    if changed {
        save_settings(&settings)?;
        println!("Saved {}", settings_path().display());
    }

    println!("Export dir: {}", settings.export_dir);
    println!(
        "Sheet:      {}",
        settings.sheet.as_deref().unwrap_or("(first sheet)")
    );
    Ok(())
}
