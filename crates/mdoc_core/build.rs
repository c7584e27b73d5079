use std::fs;

fn main() {
    // Validate the embedded style sheet at compile time
    let style_path = "src/default_style.toml";
    println!("cargo:rerun-if-changed={}", style_path);

    let content = fs::read_to_string(style_path).expect("Failed to read default_style.toml");

    // Try to parse it as TOML to catch syntax errors
    if let Err(e) = content.parse::<toml::Table>() {
        panic!("Invalid default_style.toml: {}", e);
    }
}
