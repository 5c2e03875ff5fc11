//! The `gradesheet init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("gradesheet.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("answer-keys")?;
    write_if_missing(Path::new("answer-keys/example.csv"), EXAMPLE_KEY)?;

    std::fs::create_dir_all("sheets")?;
    write_if_missing(Path::new("sheets/example-student.txt"), EXAMPLE_SHEET)?;

    println!("\nNext steps:");
    println!("  1. Edit gradesheet.toml (OCR command, data directory)");
    println!("  2. Run: gradesheet validate-key --key answer-keys/example.csv");
    println!("  3. Run: gradesheet grade --key answer-keys/example.csv --sheet sheets/example-student.txt");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# gradesheet configuration

data_dir = "./data"
# evaluator = "${USER}"
parallelism = 4
pass_ratio = 0.33

[ocr]
tesseract_cmd = "tesseract"
psm = 6
lang = "eng"
timeout_secs = 60

[scoring]
keyword_match = "substring"
good_ratio = 0.65
"#;

const EXAMPLE_KEY: &str = "QID,Answer,Marks,Type
Q1,Paris,2,O
Q2,Machine Learning is a subset of AI,5,S
Q3,Photosynthesis converts light energy into chemical energy,5,S
";

const EXAMPLE_SHEET: &str = "Q1: Paris
Q2) AI includes Machine Learning and Deep Learning
3. Plants turn light into energy
";
