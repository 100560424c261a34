use std::env;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

fn main() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("templates.rs");

    let templates_dir = Path::new("templates");
    let mut entries: Vec<(String, String)> = Vec::new();

    if templates_dir.exists() {
        for entry in WalkDir::new(templates_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().map_or(false, |ext| ext == "yaml"))
        {
            let path = entry.path();
            let relative_path = path.strip_prefix(templates_dir).unwrap();
            let name = relative_path.to_string_lossy().to_string();

            if let Ok(content) = fs::read_to_string(path) {
                entries.push((name, content));
            }
        }
    }

    let mut code = String::new();
    code.push_str("/// Embedded chord template files\n");
    code.push_str("pub static TEMPLATES: &[(&str, &str)] = &[\n");
    for (name, content) in &entries {
        // Debug formatting yields a valid Rust string literal
        code.push_str(&format!("    ({:?}, {:?}),\n", name, content));
    }
    code.push_str("];\n");

    fs::write(&dest_path, code).unwrap();

    println!("cargo:rerun-if-changed=templates");
}
