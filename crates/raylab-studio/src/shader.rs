use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Vertex + fragment shader text, read once at load time.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    /// Reads both stages from disk. Fails on the first unreadable file.
    pub fn load(vertex: &Path, fragment: &Path) -> Result<Self> {
        Ok(Self {
            vertex: read_source(vertex)?,
            fragment: read_source(fragment)?,
        })
    }
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read shader `{}`", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("raylab-shader-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn load_reads_both_stages() {
        let dir = scratch_dir("both");
        fs::write(dir.join("a.vert.wgsl"), "vertex text").unwrap();
        fs::write(dir.join("a.frag.wgsl"), "fragment text").unwrap();

        let sources = ShaderSources::load(&dir.join("a.vert.wgsl"), &dir.join("a.frag.wgsl")).unwrap();
        assert_eq!(sources.vertex, "vertex text");
        assert_eq!(sources.fragment, "fragment text");
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = scratch_dir("missing");
        fs::write(dir.join("ok.vert.wgsl"), "vertex text").unwrap();

        let err = ShaderSources::load(&dir.join("ok.vert.wgsl"), &dir.join("nope.frag.wgsl"))
            .unwrap_err();
        assert!(format!("{err}").contains("nope.frag.wgsl"));
    }
}
