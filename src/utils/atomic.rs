use crate::error::Result;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Write `path` through a temp file in the same directory and rename it into
/// place, so readers never observe a half-written file.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    {
        let mut buffered = BufWriter::new(tmp.as_file_mut());
        write(&mut buffered)?;
        buffered.flush()?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replaces_existing_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("out.txt");

        write_atomically(&path, |w| Ok(w.write_all(b"first")?))?;
        write_atomically(&path, |w| Ok(w.write_all(b"second")?))?;

        assert_eq!(fs::read_to_string(&path)?, "second");
        let leftovers = fs::read_dir(path.parent().unwrap())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn test_failed_write_leaves_original() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("out.txt");
        fs::write(&path, "original")?;

        let result = write_atomically(&path, |_| {
            Err(crate::error::CollectorError::Config("boom".to_string()))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path)?, "original");
        Ok(())
    }
}
