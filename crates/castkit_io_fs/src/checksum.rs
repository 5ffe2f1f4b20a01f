//! Streaming file digests and `md5sum`-style sidecar files.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::conf::N_CHECKSUM_BUFFER_SIZE;
use crate::spec::{EnumChecksumAlgorithm, FsError, Result};

/// Lowercase hex digest of `data`.
pub fn checksum_bytes(data: &[u8], algorithm: EnumChecksumAlgorithm) -> String {
    match algorithm {
        EnumChecksumAlgorithm::Md5 => hex::encode(Md5::digest(data)),
        EnumChecksumAlgorithm::Sha1 => hex::encode(Sha1::digest(data)),
        EnumChecksumAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    }
}

/// Lowercase hex digest of the file at `path`.
///
/// Reads the file in chunks to avoid loading it into memory.
pub fn checksum_file<P: AsRef<Path>>(path: P, algorithm: EnumChecksumAlgorithm) -> Result<String> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(FsError::io("open", path))?;
    let res_digest = match algorithm {
        EnumChecksumAlgorithm::Md5 => digest_reader::<Md5, _>(file),
        EnumChecksumAlgorithm::Sha1 => digest_reader::<Sha1, _>(file),
        EnumChecksumAlgorithm::Sha256 => digest_reader::<Sha256, _>(file),
    };
    res_digest.map_err(FsError::io("read", path))
}

/// Write `<path>.<ext>` containing `"<hex>  <file name>\n"` and return its
/// path. The extension follows [`EnumChecksumAlgorithm::extension`].
pub fn write_checksum_file<P: AsRef<Path>>(
    path: P,
    algorithm: EnumChecksumAlgorithm,
) -> Result<PathBuf> {
    let path = path.as_ref();
    let c_digest = checksum_file(path, algorithm)?;
    let name_file = path
        .file_name()
        .ok_or_else(|| FsError::InvalidTargetPath(path.to_path_buf()))?
        .to_string_lossy();

    let mut os_sidecar = path.as_os_str().to_owned();
    os_sidecar.push(".");
    os_sidecar.push(algorithm.extension());
    let path_sidecar = PathBuf::from(os_sidecar);

    fs::write(&path_sidecar, format!("{c_digest}  {name_file}\n"))
        .map_err(FsError::io("write", &path_sidecar))?;
    debug!("wrote {} ({c_digest})", path_sidecar.display());
    Ok(path_sidecar)
}

fn digest_reader<D: Digest, R: Read>(mut reader: R) -> io::Result<String> {
    let mut hasher = D::new();
    let mut buffer = vec![0u8; N_CHECKSUM_BUFFER_SIZE];
    loop {
        let n_read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n_read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    const C_HELLO_MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";
    const C_HELLO_SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
    const C_HELLO_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn known_digests_of_bytes() {
        assert_eq!(
            checksum_bytes(b"hello world", EnumChecksumAlgorithm::Md5),
            C_HELLO_MD5
        );
        assert_eq!(
            checksum_bytes(b"hello world", EnumChecksumAlgorithm::Sha1),
            C_HELLO_SHA1
        );
        assert_eq!(
            checksum_bytes(b"hello world", EnumChecksumAlgorithm::Sha256),
            C_HELLO_SHA256
        );
        assert_eq!(
            checksum_bytes(b"", EnumChecksumAlgorithm::Md5),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
    }

    #[test]
    fn file_digest_matches_byte_digest_across_chunks() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file = tmp.path().join("big.bin");
        let payload: Vec<u8> = (0..(N_CHECKSUM_BUFFER_SIZE * 2 + 17))
            .map(|n| (n % 251) as u8)
            .collect();
        fs::write(&path_file, &payload).expect("write");

        for algorithm in [
            EnumChecksumAlgorithm::Md5,
            EnumChecksumAlgorithm::Sha1,
            EnumChecksumAlgorithm::Sha256,
        ] {
            assert_eq!(
                checksum_file(&path_file, algorithm).expect("checksum"),
                checksum_bytes(&payload, algorithm)
            );
        }
    }

    #[test]
    fn sidecar_file_uses_md5sum_layout() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_file = tmp.path().join("cast-0.1.0.tar.gz");
        fs::write(&path_file, "hello world").expect("write");

        let path_sidecar =
            write_checksum_file(&path_file, EnumChecksumAlgorithm::Md5).expect("sidecar");
        assert_eq!(path_sidecar, tmp.path().join("cast-0.1.0.tar.gz.md5"));
        assert_eq!(
            fs::read_to_string(&path_sidecar).expect("read"),
            format!("{C_HELLO_MD5}  cast-0.1.0.tar.gz\n")
        );
    }

    #[test]
    fn missing_file_propagates() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = checksum_file(tmp.path().join("nope"), EnumChecksumAlgorithm::Sha1)
            .expect_err("missing file must fail");
        assert_eq!(err.io_kind(), Some(std::io::ErrorKind::NotFound));
    }
}
