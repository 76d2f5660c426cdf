use std::fs;
use std::io::Write;

use assert_matches::assert_matches;
use camino::{Utf8Path, Utf8PathBuf};
use flate2::write::GzEncoder;
use zip::write::SimpleFileOptions;

use geodatasets::error::GeoError;
use geodatasets::processors::{ArchiveKind, Compression, Processor};
use geodatasets::store::FetchAction;

fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn bzip2(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

fn zip_archive(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, bytes) in members {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(bytes).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn tar_gz(members: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, bytes) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, name, *bytes).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

fn write_raw(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> Utf8PathBuf {
    let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
    fs::write(path.as_std_path(), bytes).unwrap();
    path
}

#[test]
fn gzip_decompression_strips_extension() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "grid.xyz.gz", &gzip(b"1 2 3\n"));

    let outputs = Processor::Decompress(Compression::Gzip)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap();
    assert_eq!(outputs, vec![raw.with_extension("")]);
    assert_eq!(fs::read(outputs[0].as_std_path()).unwrap(), b"1 2 3\n");
}

#[test]
fn bzip2_decompression_strips_extension() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "age.3.6.xyz.bz2", &bzip2(b"0 0 4.5\n"));

    let outputs = Processor::Decompress(Compression::Bzip2)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap();
    assert!(outputs[0].as_str().ends_with("age.3.6.xyz"));
    assert_eq!(fs::read(outputs[0].as_std_path()).unwrap(), b"0 0 4.5\n");
}

#[test]
fn decompression_skips_when_artifact_is_current() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "grid.xyz.gz", &gzip(b"fresh"));
    let processor = Processor::Decompress(Compression::Gzip);

    let out = &processor.apply(&raw, FetchAction::Downloaded).unwrap()[0];
    // Plant a marker: a skipped run must not rewrite the artifact.
    fs::write(out.as_std_path(), b"marker").unwrap();

    processor.apply(&raw, FetchAction::UpToDate).unwrap();
    assert_eq!(fs::read(out.as_std_path()).unwrap(), b"marker");

    // A fresh download regenerates the artifact.
    processor.apply(&raw, FetchAction::Downloaded).unwrap();
    assert_eq!(fs::read(out.as_std_path()).unwrap(), b"fresh");
}

#[test]
fn truncated_gzip_reports_corrupt_archive() {
    let dir = tempfile::tempdir().unwrap();
    let mut bytes = gzip(b"some payload worth compressing");
    bytes.truncate(bytes.len() / 2);
    let raw = write_raw(&dir, "grid.xyz.gz", &bytes);

    let err = Processor::Decompress(Compression::Gzip)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap_err();
    assert_matches!(err, GeoError::CorruptArchive { .. });
}

#[test]
fn zip_unpack_enumerates_members_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(
        &dir,
        "bundle.zip",
        &zip_archive(&[
            ("b/deep.xyz", b"deep".as_slice()),
            ("a.xyz", b"top".as_slice()),
        ]),
    );

    let outputs = Processor::Unpack(ArchiveKind::Zip)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap();
    let target = Utf8PathBuf::from(format!("{raw}.unpacked"));
    assert_eq!(outputs, vec![target.join("a.xyz"), target.join("b/deep.xyz")]);
    assert_eq!(fs::read(outputs[1].as_std_path()).unwrap(), b"deep");
}

#[test]
fn tar_gz_unpack_expands_members() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(
        &dir,
        "litho.tar.gz",
        &tar_gz(&[("litho1.0/node1.model", b"model".as_slice())]),
    );

    let outputs = Processor::Unpack(ArchiveKind::TarGz)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap();
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].as_str().ends_with("litho.tar.gz.unpacked/litho1.0/node1.model"));
}

#[test]
fn unpack_skips_when_directory_is_current() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "bundle.zip", &zip_archive(&[("a.xyz", b"v1".as_slice())]));
    let processor = Processor::Unpack(ArchiveKind::Zip);

    let outputs = processor.apply(&raw, FetchAction::Downloaded).unwrap();
    fs::write(outputs[0].as_std_path(), b"marker").unwrap();

    let again = processor.apply(&raw, FetchAction::UpToDate).unwrap();
    assert_eq!(again, outputs);
    assert_eq!(fs::read(outputs[0].as_std_path()).unwrap(), b"marker");
}

#[test]
fn extract_member_pulls_nested_file() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(
        &dir,
        "facies.zip",
        &zip_archive(&[
            ("readme.txt", b"ignore".as_slice()),
            ("data/facies.csv", b"depth,facies\n1,sand\n".as_slice()),
        ]),
    );

    let outputs = Processor::extract_member("data/facies.csv")
        .apply(&raw, FetchAction::Downloaded)
        .unwrap();
    assert_eq!(
        outputs,
        vec![Utf8Path::new(&format!("{raw}.members")).join("data/facies.csv")]
    );
    assert_eq!(
        fs::read(outputs[0].as_std_path()).unwrap(),
        b"depth,facies\n1,sand\n"
    );
}

#[test]
fn missing_member_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "facies.zip", &zip_archive(&[("other.csv", b"x".as_slice())]));

    let err = Processor::extract_member("facies.csv")
        .apply(&raw, FetchAction::Downloaded)
        .unwrap_err();
    assert_matches!(err, GeoError::MemberNotFound { member, .. } if member == "facies.csv");
}

#[test]
fn failed_unpack_leaves_no_scratch_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "bundle.zip", &zip_archive(&[("a.xyz", b"v1".as_slice())]));
    // Occupy the target path with a plain file so the rename cannot land.
    fs::write(format!("{raw}.unpacked"), b"blocker").unwrap();

    let err = Processor::Unpack(ArchiveKind::Zip)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap_err();
    assert_matches!(err, GeoError::Filesystem(_));

    let leftovers: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(".geodatasets-"))
        .collect();
    assert!(leftovers.is_empty(), "scratch dirs left behind: {leftovers:?}");
}

#[test]
fn garbage_zip_reports_corrupt_archive() {
    let dir = tempfile::tempdir().unwrap();
    let raw = write_raw(&dir, "bundle.zip", b"this is not a zip file");

    let err = Processor::Unpack(ArchiveKind::Zip)
        .apply(&raw, FetchAction::Downloaded)
        .unwrap_err();
    assert_matches!(err, GeoError::CorruptArchive { .. });
}
