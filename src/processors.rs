//! Post-fetch processors: transformations applied to a freshly fetched raw
//! file before parsing. Each processor is idempotent and cache-aware; when
//! the raw file was already cached and its derived artifact exists, applying
//! the processor again is a no-op.
//!
//! Derived artifacts live next to the raw file under a fixed naming
//! convention: decompression strips the compression extension, archive
//! unpacking uses `<archive>.unpacked/`, and single-member extraction uses a
//! `<archive>.members/` scratch directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::debug;

use crate::error::GeoError;
use crate::fs_util::{atomic_rename_dir, extract_zip, extract_zip_member, list_files, unpack_tar};
use crate::store::FetchAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Gzip,
    Bzip2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processor {
    /// Decompress a single-stream compressed file to the raw path with the
    /// compression extension stripped.
    Decompress(Compression),
    /// Expand every member of an archive into `<archive>.unpacked/` and
    /// return the sorted member file paths.
    Unpack(ArchiveKind),
    /// Extract one named (possibly nested) member of a zip archive into
    /// `<archive>.members/`.
    ExtractMember(String),
}

impl Processor {
    pub fn extract_member(member: impl Into<String>) -> Self {
        Self::ExtractMember(member.into())
    }

    pub fn apply(
        &self,
        raw: &Utf8Path,
        action: FetchAction,
    ) -> Result<Vec<Utf8PathBuf>, GeoError> {
        match self {
            Processor::Decompress(compression) => {
                Ok(vec![decompress(raw, *compression, action)?])
            }
            Processor::Unpack(kind) => unpack(raw, *kind, action),
            Processor::ExtractMember(member) => Ok(vec![extract_one(raw, member, action)?]),
        }
    }
}

fn decompress(
    raw: &Utf8Path,
    compression: Compression,
    action: FetchAction,
) -> Result<Utf8PathBuf, GeoError> {
    let out = raw.with_extension("");
    if action == FetchAction::UpToDate && out.as_std_path().is_file() {
        debug!(raw = %raw, "decompressed artifact up to date");
        return Ok(out);
    }

    let parent = raw
        .parent()
        .ok_or_else(|| GeoError::Filesystem(format!("invalid raw path {raw}")))?;
    let temp = tempfile::Builder::new()
        .prefix(".geodatasets-decomp-")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;

    let file = fs::File::open(raw.as_std_path())
        .map_err(|err| GeoError::Filesystem(format!("open {raw}: {err}")))?;
    let mut writer = io::BufWriter::new(
        fs::File::create(temp.path()).map_err(|err| GeoError::Filesystem(err.to_string()))?,
    );
    let copied = match compression {
        Compression::Gzip => {
            let mut decoder = flate2::read::GzDecoder::new(file);
            io::copy(&mut decoder, &mut writer)
        }
        Compression::Bzip2 => {
            let mut decoder = bzip2::read::BzDecoder::new(file);
            io::copy(&mut decoder, &mut writer)
        }
    };
    copied.map_err(|err| GeoError::CorruptArchive {
        archive: raw.to_string(),
        message: err.to_string(),
    })?;
    drop(writer);

    if out.as_std_path().exists() {
        fs::remove_file(out.as_std_path()).map_err(|err| GeoError::Filesystem(err.to_string()))?;
    }
    temp.persist(out.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;
    Ok(out)
}

fn unpack(
    raw: &Utf8Path,
    kind: ArchiveKind,
    action: FetchAction,
) -> Result<Vec<Utf8PathBuf>, GeoError> {
    let target = Utf8PathBuf::from(format!("{raw}.unpacked"));
    if action == FetchAction::UpToDate && target.as_std_path().is_dir() {
        debug!(raw = %raw, "unpacked artifact up to date");
        return enumerate(&target);
    }

    let parent = raw
        .parent()
        .ok_or_else(|| GeoError::Filesystem(format!("invalid raw path {raw}")))?;
    let temp_dir = tempfile::Builder::new()
        .prefix(".geodatasets-unpack-")
        .tempdir_in(parent.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;

    match kind {
        ArchiveKind::Zip => extract_zip(raw.as_std_path(), temp_dir.path())?,
        ArchiveKind::Tar => unpack_tar(raw.as_std_path(), temp_dir.path(), false)?,
        ArchiveKind::TarGz => unpack_tar(raw.as_std_path(), temp_dir.path(), true)?,
    }

    atomic_rename_dir(temp_dir.path(), target.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;
    // The members now live at `target`; disarm the guard's cleanup.
    let _ = temp_dir.keep();
    enumerate(&target)
}

fn extract_one(raw: &Utf8Path, member: &str, action: FetchAction) -> Result<Utf8PathBuf, GeoError> {
    let scratch = Utf8PathBuf::from(format!("{raw}.members"));
    let out = scratch.join(member);
    if action == FetchAction::UpToDate && out.as_std_path().is_file() {
        debug!(raw = %raw, member, "extracted member up to date");
        return Ok(out);
    }

    let parent = raw
        .parent()
        .ok_or_else(|| GeoError::Filesystem(format!("invalid raw path {raw}")))?;
    let temp_dir = tempfile::Builder::new()
        .prefix(".geodatasets-member-")
        .tempdir_in(parent.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;

    let extracted = extract_zip_member(raw.as_std_path(), member, temp_dir.path())?;

    if let Some(dir) = out.parent() {
        fs::create_dir_all(dir.as_std_path())
            .map_err(|err| GeoError::Filesystem(err.to_string()))?;
    }
    if out.as_std_path().exists() {
        fs::remove_file(out.as_std_path()).map_err(|err| GeoError::Filesystem(err.to_string()))?;
    }
    fs::rename(&extracted, out.as_std_path())
        .map_err(|err| GeoError::Filesystem(err.to_string()))?;
    Ok(out)
}

fn enumerate(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, GeoError> {
    list_files(dir.as_std_path())?
        .into_iter()
        .map(to_utf8)
        .collect()
}

fn to_utf8(path: PathBuf) -> Result<Utf8PathBuf, GeoError> {
    Utf8PathBuf::from_path_buf(path)
        .map_err(|path| GeoError::Filesystem(format!("non-utf8 path {}", Path::display(&path))))
}
