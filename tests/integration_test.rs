use std::fs;
use std::path::Path;
use std::process::Command;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_todo-pdf"))
}

fn output_dir() -> &'static Path {
    Path::new("tests/output")
}

fn setup() {
    fs::create_dir_all(output_dir()).expect("Failed to create output directory");
}

fn cleanup_file(name: &str) {
    let path = output_dir().join(name);
    if path.exists() {
        fs::remove_file(&path).ok();
    }
}

fn write_config(name: &str, json: &str) -> String {
    let path = output_dir().join(name);
    fs::write(&path, json).expect("Failed to write config");
    path.display().to_string()
}

fn page_count(path: &Path) -> usize {
    lopdf::Document::load(path).expect("Failed to parse PDF").get_pages().len()
}

#[test]
fn test_generate_from_config_file() {
    setup();
    let output_file = "test-small-planner.pdf";
    cleanup_file(output_file);
    let config = write_config(
        "small-planner.json",
        r#"{
            "page_format": "A5",
            "items_per_col": 6,
            "columns": 2,
            "pages_of_todos": 2,
            "detail_pages_per_todo": 1,
            "title_page_enabled": true,
            "title_text": "Small Planner"
        }"#,
    );

    let output = cargo_bin()
        .args(["generate", "-c", &config, "-o", &format!("tests/output/{}", output_file)])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);

    let path = output_dir().join(output_file);
    assert!(path.exists(), "PDF file was not created");

    let metadata = fs::metadata(&path).expect("Failed to get file metadata");
    assert!(metadata.len() > 1000, "PDF file is too small, likely empty or corrupt");

    // title + index + 2 todo pages + 24 detail pages
    assert_eq!(page_count(&path), 1 + 1 + 2 + 24);
}

#[test]
fn test_generate_guides_and_landscape() {
    setup();
    let output_file = "test-guides-landscape.pdf";
    cleanup_file(output_file);
    let config = write_config(
        "guides-landscape.json",
        r##"{
            "page_format": "Letter",
            "landscape": true,
            "items_per_col": 5,
            "columns": 3,
            "pages_of_todos": 1,
            "detail_pages_per_todo": 2,
            "guide_lines_enabled": true,
            "guide_h_color": "#C0C0C0",
            "num_placement": "inside_right",
            "auto_margins": true
        }"##,
    );

    let output = cargo_bin()
        .args(["generate", "-c", &config, "-o", &format!("tests/output/{}", output_file)])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("✓ Generated"), "Unexpected output: {}", stdout);

    let path = output_dir().join(output_file);
    let metadata = fs::metadata(&path).expect("Failed to get file metadata");
    assert!(metadata.len() > 1000, "PDF file is too small");
    assert_eq!(page_count(&path), 1 + 1 + 15 * 2);
}

#[test]
fn test_preview_is_single_page() {
    setup();
    let output_file = "test-preview.pdf";
    cleanup_file(output_file);

    let output = cargo_bin()
        .args(["preview", "--preset", "Boox Note Max", "-o", &format!("tests/output/{}", output_file)])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    assert_eq!(page_count(&output_dir().join(output_file)), 1);
}

#[test]
fn test_out_of_range_values_warn_but_succeed() {
    setup();
    let output_file = "test-clamped.pdf";
    cleanup_file(output_file);
    let config = write_config(
        "clamped.json",
        r#"{"items_per_col": 5, "columns": 8, "pages_of_todos": 1, "detail_pages_per_todo": 1, "margin_left": 90}"#,
    );

    let output = cargo_bin()
        .args(["generate", "-c", &config, "-o", &format!("tests/output/{}", output_file)])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("columns"), "Missing clamp warning: {}", stdout);
    assert!(stdout.contains("margin_left"), "Missing clamp warning: {}", stdout);

    // columns clamp to 3: index + 1 todo page + 15 detail pages
    assert_eq!(page_count(&output_dir().join(output_file)), 1 + 1 + 15);
}

#[test]
fn test_missing_config_file_fails() {
    setup();

    let output = cargo_bin()
        .args(["generate", "-c", "tests/output/does-not-exist.json", "-o", "tests/output/never.pdf"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Command should fail for a missing config");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error:"), "Unexpected stderr: {}", stderr);
}

#[test]
fn test_unknown_preset_fails() {
    let output = cargo_bin()
        .args(["generate", "--preset", "Nonexistent"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown preset"));
}

#[test]
fn test_configs_save_list_show_delete() {
    setup();
    let dir = output_dir().join("saved_configs");
    fs::remove_dir_all(&dir).ok();
    let dir = dir.display().to_string();

    let output = cargo_bin()
        .args(["configs", "--config-dir", &dir, "save", "weekly plan", "--preset", "Letter Size"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Command failed: {:?}", output);

    let output = cargo_bin()
        .args(["configs", "--config-dir", &dir, "list"])
        .output()
        .expect("Failed to execute command");
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "weekly-plan");

    let output = cargo_bin()
        .args(["configs", "--config-dir", &dir, "show", "weekly-plan"])
        .output()
        .expect("Failed to execute command");
    let shown: serde_json::Value = serde_json::from_slice(&output.stdout).expect("show prints JSON");
    assert_eq!(shown["page_format"], "Letter");

    let output = cargo_bin()
        .args(["configs", "--config-dir", &dir, "delete", "weekly-plan"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success());

    let output = cargo_bin()
        .args(["configs", "--config-dir", &dir, "show", "weekly-plan"])
        .output()
        .expect("Failed to execute command");
    assert!(!output.status.success());
}

#[test]
fn test_share_export_then_import() {
    setup();
    let output = cargo_bin()
        .args(["share", "export", "--preset", "Creative"])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Command failed: {:?}", output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let code = stdout.lines().next().expect("share code line").to_string();
    assert!(stdout.contains("?config="));

    let target = "tests/output/imported.json";
    let output = cargo_bin()
        .args(["share", "import", &code, "-o", target])
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Command failed: {:?}", output);

    let imported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target).expect("imported file")).expect("valid JSON");
    assert_eq!(imported["landscape"], true);
    assert_eq!(imported["columns"], 3);
}

#[test]
fn test_presets_listing() {
    let output = cargo_bin().arg("presets").output().expect("Failed to execute command");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["A4 Standard", "Boox Note Max", "Letter Size", "Academic", "Minimal"] {
        assert!(stdout.contains(name), "Missing preset {}", name);
    }
}
