// tests/common/mod.rs

#![allow(dead_code, unused_imports)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use zonewatch_test_utils::{init_tracing, with_timeout};

/// Poll until `path` exists, for at most `limit`.
pub async fn wait_for_file(path: &Path, limit: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    path.exists()
}

/// Lines of a text file, empty if it doesn't exist.
pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Write a minimal zone description and template into `dir`.
///
/// Returns `(config_path, template_path)`.
pub fn write_zone_inputs(dir: &Path) -> (PathBuf, PathBuf) {
    let config = dir.join("zones.toml");
    fs::write(
        &config,
        r#"
[vars]
directory = "/var/cache/bind"

[[zone]]
name = "example.com"
file = "masterzones/example.com.zone"
allow_transfer = ["192.0.2.2"]
"#,
    )
    .unwrap();

    let template = dir.join("named.conf.tmpl");
    fs::write(
        &template,
        "options { directory \"{{ directory }}\"; listen-on port {{ port }}; };\n\
{{#zones}}zone \"{{ name }}\" { type {{ kind }}; file \"{{ file }}\"; allow-transfer { {{ allow_transfer }}}; };\n{{/zones}}",
    )
    .unwrap();

    (config, template)
}
