use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::GeoError;

pub fn sha256_file(path: &Path) -> Result<String, GeoError> {
    let mut file = fs::File::open(path)
        .map_err(|err| GeoError::Filesystem(format!("open {}: {err}", path.display())))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|err| GeoError::Filesystem(err.to_string()))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

pub fn extract_zip(zip_path: &Path, target_dir: &Path) -> Result<(), GeoError> {
    let file = fs::File::open(zip_path)
        .map_err(|err| GeoError::Filesystem(format!("open zip {}: {err}", zip_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|err| corrupt(zip_path, err))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|err| corrupt(zip_path, err))?;
        let entry_path = match entry.enclosed_name() {
            Some(path) => target_dir.join(path),
            None => {
                return Err(GeoError::CorruptArchive {
                    archive: zip_path.display().to_string(),
                    message: "zip entry path traversal detected".to_string(),
                });
            }
        };

        if entry.is_dir() {
            fs::create_dir_all(&entry_path).map_err(|err| GeoError::Filesystem(err.to_string()))?;
            continue;
        }

        if let Some(parent) = entry_path.parent() {
            fs::create_dir_all(parent).map_err(|err| GeoError::Filesystem(err.to_string()))?;
        }
        let mut outfile =
            fs::File::create(&entry_path).map_err(|err| GeoError::Filesystem(err.to_string()))?;
        io::copy(&mut entry, &mut outfile).map_err(|err| corrupt(zip_path, err))?;
    }
    Ok(())
}

/// Extract a single (possibly nested) member from a zip archive into
/// `target_dir`, preserving the member's internal path.
pub fn extract_zip_member(
    zip_path: &Path,
    member: &str,
    target_dir: &Path,
) -> Result<PathBuf, GeoError> {
    let file = fs::File::open(zip_path)
        .map_err(|err| GeoError::Filesystem(format!("open zip {}: {err}", zip_path.display())))?;
    let mut archive = ZipArchive::new(file).map_err(|err| corrupt(zip_path, err))?;

    let mut entry = match archive.by_name(member) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(GeoError::MemberNotFound {
                archive: zip_path.display().to_string(),
                member: member.to_string(),
            });
        }
        Err(err) => return Err(corrupt(zip_path, err)),
    };
    let relative = entry.enclosed_name().ok_or_else(|| GeoError::CorruptArchive {
        archive: zip_path.display().to_string(),
        message: "zip entry path traversal detected".to_string(),
    })?;
    let out_path = target_dir.join(relative);
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent).map_err(|err| GeoError::Filesystem(err.to_string()))?;
    }
    let mut outfile =
        fs::File::create(&out_path).map_err(|err| GeoError::Filesystem(err.to_string()))?;
    io::copy(&mut entry, &mut outfile).map_err(|err| corrupt(zip_path, err))?;
    Ok(out_path)
}

pub fn unpack_tar(tar_path: &Path, target_dir: &Path, gzipped: bool) -> Result<(), GeoError> {
    let file = fs::File::open(tar_path)
        .map_err(|err| GeoError::Filesystem(format!("open tar {}: {err}", tar_path.display())))?;
    let result = if gzipped {
        let decoder = flate2::read::GzDecoder::new(file);
        tar::Archive::new(decoder).unpack(target_dir)
    } else {
        tar::Archive::new(file).unpack(target_dir)
    };
    result.map_err(|err| corrupt(tar_path, err))
}

/// All regular files under `root`, sorted for deterministic enumeration.
pub fn list_files(root: &Path) -> Result<Vec<PathBuf>, GeoError> {
    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = fs::read_dir(&dir).map_err(|err| GeoError::Filesystem(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| GeoError::Filesystem(err.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    Ok(files)
}

pub fn atomic_rename_dir(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_dir_all(to)?;
    }
    fs::rename(from, to)
}

fn corrupt(path: &Path, err: impl std::fmt::Display) -> GeoError {
    GeoError::CorruptArchive {
        archive: path.display().to_string(),
        message: err.to_string(),
    }
}
