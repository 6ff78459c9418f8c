use montage_core::{MontageDifficulty, MontageError, limits_summary};

pub fn run(difficulty: &str, heroes: u32) -> Result<(), String> {
    let difficulty: MontageDifficulty = difficulty
        .parse()
        .map_err(|e: MontageError| e.to_string())?;
    println!("  {}", limits_summary(difficulty, heroes));
    Ok(())
}
