//! Blocking download of a single file.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

use crate::error::{Error, Result};

use super::PART_SUFFIX;

/// Build the HTTP client used for the download.
///
/// The client has no request timeout: a stalled server stalls the run.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialized.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .timeout(None)
        .build()
        .map_err(Error::HttpClient)
}

/// Download `url` to `path` with progress indication.
///
/// Bytes are streamed into `<path>.part` and renamed onto `path` once the
/// body has been read completely. If anything fails the part file is
/// removed and `path` is left untouched.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// Returns an error on transport failure, a non-success status, or any
/// filesystem failure while writing the file.
pub fn download_file(client: &Client, url: &str, path: &Path) -> Result<u64> {
    tracing::info!("Downloading {url}");

    let part_path = part_path(path);

    let fetched = fetch_into(client, url, &part_path).and_then(|written| {
        fs::rename(&part_path, path)?;
        Ok(written)
    });

    match fetched {
        Ok(written) => {
            tracing::debug!("Wrote {written} bytes to {}", path.display());
            Ok(written)
        }
        Err(err) => {
            if part_path.exists() {
                if let Err(remove_err) = fs::remove_file(&part_path) {
                    tracing::warn!(
                        "Could not remove partial download {}: {remove_err}",
                        part_path.display()
                    );
                }
            }
            Err(err)
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn fetch_into(client: &Client, url: &str, part_path: &Path) -> Result<u64> {
    let response = client.get(url).send().map_err(|source| Error::Download {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus {
            url: url.to_string(),
            status,
        });
    }

    if let Some(parent) = part_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let pb = progress_bar(response.content_length());

    let mut file = fs::File::create(part_path)?;
    let mut downloaded = 0u64;
    let mut reader = response;
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
        downloaded += bytes_read as u64;
        pb.set_position(downloaded);
    }

    file.sync_all()?;
    pb.finish_and_clear();

    Ok(downloaded)
}

fn progress_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} {bytes} downloaded")
                    .expect("valid template"),
            );
            pb
        }
    }
}

/// `logo.png` -> `logo.png.part`
fn part_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(PART_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{serve_once, serve_raw};

    #[test]
    fn test_part_path_appends_suffix() {
        assert_eq!(
            part_path(Path::new("/tmp/temp_logo.png")),
            PathBuf::from("/tmp/temp_logo.png.part")
        );
    }

    #[test]
    fn test_download_writes_body() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("temp_logo.png");
        let url = serve_once("200 OK", b"hello image".to_vec());

        let client = build_client().unwrap();
        let written = download_file(&client, &url, &dest).unwrap();

        assert_eq!(written, 11);
        assert_eq!(fs::read(&dest).unwrap(), b"hello image");
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_download_rejects_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_logo.png");
        let url = serve_once("404 Not Found", b"missing".to_vec());

        let client = build_client().unwrap();
        let err = download_file(&client, &url, &dest).unwrap_err();

        match err {
            Error::HttpStatus { status, .. } => assert_eq!(status.as_u16(), 404),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_download_unreachable_host() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_logo.png");

        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = format!("http://127.0.0.1:{port}/logo.png");

        let client = build_client().unwrap();
        let err = download_file(&client, &url, &dest).unwrap_err();

        assert!(matches!(err, Error::Download { .. }));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_download_truncated_body_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_logo.png");
        let url = serve_raw(
            b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\nConnection: close\r\n\r\nonly a few bytes"
                .to_vec(),
        );

        let client = build_client().unwrap();
        let result = download_file(&client, &url, &dest);

        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_download_failed_rename_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the file should go makes the rename fail.
        let dest = dir.path().join("temp_logo.png");
        fs::create_dir_all(dest.join("occupied")).unwrap();
        let url = serve_once("200 OK", b"bytes".to_vec());

        let client = build_client().unwrap();
        let err = download_file(&client, &url, &dest).unwrap_err();

        assert!(matches!(err, Error::Io(_)));
        assert!(dest.is_dir());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_download_overwrites_stale_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("temp_logo.png");
        fs::write(part_path(&dest), b"left over from an interrupted run").unwrap();
        let url = serve_once("200 OK", b"fresh".to_vec());

        let client = build_client().unwrap();
        download_file(&client, &url, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"fresh");
    }
}
