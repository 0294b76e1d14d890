// Difficulty Levels Module
// Chart difficulty lanes and their colours, passed to builders as values

pub mod types;
mod table;

/// Get a level by name (case insensitive)
pub fn get_level(name: &str) -> Result<types::DifficultyLevel, types::LevelError> {
    match name.to_lowercase().as_str() {
        "expert" => Ok(table::expert()),
        "hard" => Ok(table::hard()),
        "medium" => Ok(table::medium()),
        "easy" => Ok(table::easy()),
        _ => Err(types::LevelError::UnknownLevel(name.to_string())),
    }
}

/// All built-in levels, hardest first
pub fn list_levels() -> Vec<types::DifficultyLevel> {
    vec![table::expert(), table::hard(), table::medium(), table::easy()]
}

pub fn list_level_names() -> Vec<String> {
    list_levels().into_iter().map(|level| level.name).collect()
}

// Re-export main types
pub use types::{ColourMap, DifficultyLevel, LevelError, Rgb};
