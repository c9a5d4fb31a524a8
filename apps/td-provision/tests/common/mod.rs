//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod http_server;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};

/// Setup script that records its first argument next to itself and appends
/// one line per run to `setup-runs.log` in the staging root.
pub const RECORDING_SETUP_SCRIPT: &str = "#!/bin/bash\n\
echo \"$1\" > invoked.txt\n\
echo \"$1\" >> ../setup-runs.log\n";

/// Builds an in-memory tar.gz shaped like the client library bundle.
///
/// `setup_script` is stored as `TeradataToolsAndUtilitiesBase/setup.sh` when
/// given; the archive always contains one library file.
pub fn bundle(setup_script: Option<&str>) -> Vec<u8> {
    let mut builder = Builder::new(GzEncoder::new(Vec::new(), Compression::default()));

    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Directory);
    header.set_size(0);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, "TeradataToolsAndUtilitiesBase/", std::io::empty())
        .expect("Should append dir");

    if let Some(script) = setup_script {
        append_file(
            &mut builder,
            "TeradataToolsAndUtilitiesBase/setup.sh",
            script.as_bytes(),
            0o755,
        );
    }
    append_file(
        &mut builder,
        "TeradataToolsAndUtilitiesBase/Linux/x8664/libcliv2.so",
        b"library content",
        0o644,
    );

    builder
        .into_inner()
        .expect("Should finish tar")
        .finish()
        .expect("Should finish gzip")
}

fn append_file<W: std::io::Write>(builder: &mut Builder<W>, path: &str, body: &[u8], mode: u32) {
    let mut header = Header::new_gnu();
    header.set_size(body.len() as u64);
    header.set_mode(mode);
    header.set_cksum();
    builder
        .append_data(&mut header, path, body)
        .expect("Should append file");
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode(Sha256::digest(bytes))
}
