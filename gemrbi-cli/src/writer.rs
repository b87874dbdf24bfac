use anyhow::{Context, Result};
use gemrbi::InterfaceFile;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Create,
    Update,
    Unchanged,
}

impl fmt::Display for WriteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteStatus::Create => write!(f, "create"),
            WriteStatus::Update => write!(f, "update"),
            WriteStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Writes `file` under `outdir`, leaving the file untouched when its content
/// is already current.
pub fn write_interface(outdir: &Path, file: &InterfaceFile) -> Result<(WriteStatus, PathBuf)> {
    let path = outdir.join(file.relative_path());
    let contents = file.contents();

    let status = match fs::read_to_string(&path) {
        Ok(existing) if existing == contents => return Ok((WriteStatus::Unchanged, path)),
        Ok(_) => WriteStatus::Update,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => WriteStatus::Create,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    fs::create_dir_all(outdir)
        .with_context(|| format!("Failed to create directory {}", outdir.display()))?;
    fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok((status, path))
}

/// `      create  sorbet/rbi/gems/foo@1.0.0.rbi`; nothing for unchanged files.
pub fn status_line(status: WriteStatus, path: &Path) -> Option<String> {
    match status {
        WriteStatus::Unchanged => None,
        status => Some(format!("{:>12}  {}", status.to_string(), path.display())),
    }
}
