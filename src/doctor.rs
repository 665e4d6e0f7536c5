use anyhow::Result;

use crate::config::Config;

/// List the external collaborators and whether they are usable: the two
/// external binaries the OCR fallback shells out to, and the database.
pub fn run_doctor(config: &Config) -> Result<()> {
    println!("{:<16} {:<40} HEALTHY", "COMPONENT", "STATUS");

    for binary in ["pdftoppm", "tesseract"] {
        match which::which(binary) {
            Ok(path) => {
                println!("{:<16} {:<40} true", binary, path.display().to_string());
            }
            Err(_) => {
                println!("{:<16} {:<40} false", binary, "NOT FOUND on PATH");
            }
        }
    }

    let db_status = if config.db.path.exists() {
        ("present", true)
    } else {
        ("not created yet (run `tmill init`)", false)
    };
    println!("{:<16} {:<40} {}", "database", db_status.0, db_status.1);

    Ok(())
}
