use anyhow::{Context, Result};
use cadenza_etl::{config, Config};
use toml_edit::{value, DocumentMut, Item, Table};

const VALID_KEYS: &str = "data_path, artifact_dir, weights.<feature>";

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  data_path: {}", config.data_path.display());
    println!("  artifact_dir: {}", config.artifact_dir.display());
    for (name, weight) in config.weights.entries() {
        println!("  weights.{name}: {weight}");
    }
    println!("  logging.level: {:?}", config.logging.level());
    println!("  logging.coloured: {}", config.logging.coloured());
    println!("  logging.output: {:?}", config.logging.output());

    println!("\nPriority: CLI args > ENV vars (CADENZA_*) > Config file > Defaults");

    Ok(())
}

/// Get a specific config value.
pub fn get_config(key: Option<String>) -> Result<()> {
    let Some(key) = key else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents =
                std::fs::read_to_string(&config_path).context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'cadenza config init' to create it.");
        }
        return Ok(());
    };

    let config = Config::load()?;
    match key.as_str() {
        "data_path" => println!("{}", config.data_path.display()),
        "artifact_dir" => println!("{}", config.artifact_dir.display()),
        _ => {
            let weight = key
                .strip_prefix("weights.")
                .and_then(|name| {
                    config
                        .weights
                        .entries()
                        .into_iter()
                        .find(|(feature, _)| *feature == name)
                })
                .map(|(_, weight)| weight);
            match weight {
                Some(weight) => println!("{weight}"),
                None => anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS),
            }
        }
    }

    Ok(())
}

/// Set a config value, keeping the rest of the file (comments included) intact.
pub fn set_config(key: &str, new_value: &str) -> Result<()> {
    let config_path = config::config_file_path();

    // Ensure config file exists
    config::ensure_config_file()?;

    let contents = std::fs::read_to_string(&config_path).context("Failed to read config file")?;
    let mut doc: DocumentMut = contents.parse().context("Failed to parse config file")?;

    apply_setting(&mut doc, key, new_value)?;

    std::fs::write(&config_path, doc.to_string()).context("Failed to write config file")?;

    println!("✓ Updated {} = {}", key, new_value);
    println!("  in {}", config_path.display());

    Ok(())
}

fn apply_setting(doc: &mut DocumentMut, key: &str, new_value: &str) -> Result<()> {
    match key {
        "data_path" | "artifact_dir" => {
            doc[key] = value(new_value);
        }
        _ => {
            let Some(name) = key.strip_prefix("weights.") else {
                anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, VALID_KEYS);
            };
            let known = cadenza_core::FeatureWeights::default()
                .entries()
                .iter()
                .any(|(feature, _)| *feature == name);
            if !known {
                anyhow::bail!("Unknown feature weight: {}", name);
            }
            let weight: f64 = new_value
                .parse()
                .with_context(|| format!("Weight must be a number, got '{new_value}'"))?;
            if !weight.is_finite() || weight <= 0.0 {
                anyhow::bail!("Weight must be positive, got {}", weight);
            }

            if !doc.contains_table("weights") {
                doc.insert("weights", Item::Table(Table::new()));
            }
            doc["weights"][name] = value(weight);
        }
    }
    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure cadenza.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_path_preserves_comments() {
        let mut doc: DocumentMut = config::example_config().parse().unwrap();
        apply_setting(&mut doc, "data_path", "/data/tracks.csv").unwrap();

        let text = doc.to_string();
        assert!(text.contains("# Cadenza Configuration File"));
        assert!(text.contains("data_path = \"/data/tracks.csv\""));
    }

    #[test]
    fn test_set_weight() {
        let mut doc: DocumentMut = config::example_config().parse().unwrap();
        apply_setting(&mut doc, "weights.loudness", "3.5").unwrap();
        assert_eq!(doc["weights"]["loudness"].as_float(), Some(3.5));
        assert_eq!(doc["weights"]["energy"].as_float(), Some(1.5));
    }

    #[test]
    fn test_set_weight_creates_table() {
        let mut doc = DocumentMut::new();
        apply_setting(&mut doc, "weights.tempo", "2").unwrap();
        assert_eq!(doc["weights"]["tempo"].as_float(), Some(2.0));
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut doc = DocumentMut::new();
        assert!(apply_setting(&mut doc, "colour", "red").is_err());
        assert!(apply_setting(&mut doc, "weights.bogus", "1.0").is_err());
        assert!(apply_setting(&mut doc, "weights.tempo", "fast").is_err());
        assert!(apply_setting(&mut doc, "weights.tempo", "-1").is_err());
    }
}
