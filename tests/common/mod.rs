/*!
 * Common test utilities for the questlate test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use questlate::TranslationClient;
use questlate::providers::mock::MockBackend;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content, creating parent directories
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wraps a mock backend in a translation client
pub fn client_for(backend: MockBackend) -> Arc<TranslationClient> {
    Arc::new(TranslationClient::new(Arc::new(backend), 4))
}

/// A quest file with every translatable field and a few control codes
pub fn sample_quest() -> &'static str {
    r#"{
	id: "4F1A2B3C4D5E6F70"
	quests: [
		{
			title: "&6The Nether"
			subtitle: "Hot stuff"
			description: [
				"Build a portal and step through."
				""
				"&cBring fire resistance!"
			]
			id: "0A1B2C3D4E5F6071"
			x: 0.0d
			y: -1.5d
		}
	]
}
"#
}

/// A quest file with no control codes at all
pub fn plain_quest() -> &'static str {
    r#"{
	quests: [
		{
			title: "Getting Started"
			description: [
				"Chop a tree."
			]
			x: 1.0d
		}
	]
}
"#
}
