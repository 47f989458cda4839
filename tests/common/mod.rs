use flate2::write::GzEncoder;
use flate2::Compression as GzLevel;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[allow(dead_code)]
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

#[allow(dead_code)]
pub fn create_gzip_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.join(filename);
    let file = fs::File::create(&file_path).unwrap();
    let mut encoder = GzEncoder::new(file, GzLevel::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
    file_path
}

#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
