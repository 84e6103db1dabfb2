use std::{
    fs::File,
    io::Read,
    path::Path,
};

use anyhow::{Context, Result};
use memmap2::Mmap;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Read a UTF-8 source file. Large files are memory-mapped and copied
/// out once validated; invalid UTF-8 is an error, not a lossy decode.
pub fn read_source<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read metadata for {}", path.display()))?;

    if metadata.len() > MMAP_THRESHOLD {
        let file =
            File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;

        // Safety: the mapping is read-only and dropped before returning
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Failed to memory-map {}", path.display()))?;

        let text = std::str::from_utf8(&mmap)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

        Ok(text.to_owned())
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file {}", path.display()))
    }
}

/// Read all of stdin as UTF-8.
pub fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read submission from stdin")?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn reads_small_utf8_files() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("a.py");
        std::fs::write(&path, "name = 'é'\n")?;
        assert_eq!(read_source(&path)?, "name = 'é'\n");
        Ok(())
    }

    #[test]
    fn reads_large_files_through_mmap() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("big.py");
        let body = "x = 1\n".repeat(200_000);
        std::fs::write(&path, &body)?;
        assert_eq!(read_source(&path)?.len(), body.len());
        Ok(())
    }

    #[test]
    fn rejects_invalid_utf8() -> Result<()> {
        let tmp = TempDir::new()?;
        let path = tmp.path().join("bad.py");
        std::fs::write(&path, [0x66, 0xff, 0xfe])?;
        assert!(read_source(&path).is_err());
        Ok(())
    }

    #[test]
    fn missing_file_mentions_path() {
        let err = read_source("/no/such/file.py").unwrap_err();
        assert!(format!("{err:#}").contains("/no/such/file.py"));
    }
}
