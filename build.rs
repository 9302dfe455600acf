use std::fs;

const CONFIG_PATH: &str = "src/default_config.toml";

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_PATH}");

    let content = fs::read_to_string(CONFIG_PATH).expect("Failed to read default_config.toml");

    let table = match content.parse::<toml::Table>() {
        Ok(table) => table,
        Err(e) => panic!("Invalid default_config.toml: {e}"),
    };

    // Config::compiled_default relies on these being present
    let Some(ratings) = table.get("ratings").and_then(toml::Value::as_table) else {
        panic!("default_config.toml is missing the [ratings] table");
    };
    for key in ["critical", "high", "medium", "default"] {
        if !ratings.get(key).is_some_and(toml::Value::is_str) {
            panic!("default_config.toml: ratings.{key} must be a string");
        }
    }
    if !table.get("blocks").is_some_and(toml::Value::is_table) {
        panic!("default_config.toml is missing the [blocks] table");
    }
}
