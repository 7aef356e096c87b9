use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

pub fn timestamp_prefix() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn debug_log(message: &str) {
    if std::env::var("UVI_DEBUG").ok().as_deref() != Some("1") {
        return;
    }
    let Some(home) = std::env::var_os("HOME") else {
        return;
    };
    let mut path = PathBuf::from(home);
    path.push(".config/uvi");
    let _ = fs::create_dir_all(&path);
    path.push("uvi.log");
    if let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{} {}", timestamp_prefix(), message);
    }
}
