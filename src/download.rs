use crate::platform::{OsTag, PlatformTarget};
use anyhow::{anyhow, Result};
use flate2::read::GzDecoder;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tar::Archive;
use walkdir::WalkDir;

/// Stream a URL to a local file, sending the bearer token when one is
/// configured. The token reduces the chance of being rate limited on
/// shared CI runners; downloads work unauthenticated as well.
pub async fn download_file(url: &str, token: Option<&str>, local_path: &Path) -> Result<()> {
    tracing::info!(
        "Downloading {}...",
        local_path.file_name().unwrap().to_string_lossy()
    );

    let client = reqwest::Client::new();
    let mut request = client.get(url).header("User-Agent", "setup-gotestfmt");
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    if !response.status().is_success() {
        return Err(anyhow!(
            "download of {} failed with status {}",
            url,
            response.status()
        ));
    }

    let total_size = response.content_length().unwrap_or(0);

    let filename = local_path.file_name().unwrap().to_string_lossy().to_string();
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .unwrap()
            .progress_chars("#>-")
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    use futures_util::StreamExt;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    pb.finish_with_message("Download complete");
    Ok(())
}

/// Unpack the downloaded archive into the install directory, creating it if
/// needed. Extraction overwrites whatever a previous install left behind,
/// so re-installing into a populated directory needs no manual cleanup.
pub fn extract_archive(archive_path: &Path, install_dir: &Path, os: OsTag) -> Result<()> {
    tracing::info!(
        "Extracting {} into {}...",
        archive_path.file_name().unwrap().to_string_lossy(),
        install_dir.display()
    );

    fs::create_dir_all(install_dir)?;

    match os {
        OsTag::Windows => extract_zip(archive_path, install_dir),
        _ => extract_tar_gz(archive_path, install_dir),
    }
}

fn extract_tar_gz(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let decoder = GzDecoder::new(file);
    let mut archive = Archive::new(decoder);
    archive.set_overwrite(true);

    archive.unpack(extract_dir)?;

    Ok(())
}

fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        // Entries with absolute or parent-escaping names must not land
        // outside the extract dir.
        let outpath = match file.enclosed_name() {
            Some(path) => extract_dir.join(path),
            None => {
                tracing::warn!("Skipping malicious path in zip: {}", file.name());
                continue;
            }
        };

        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut file, &mut outfile)?;
        }
    }

    Ok(())
}

/// Find the extracted binary, mark it executable and place it on the
/// executable search path. Archives usually carry the binary at the root,
/// but nested layouts are tolerated.
pub fn expose_binary(target: &PlatformTarget) -> Result<PathBuf> {
    let binary_path = locate_binary(&target.install_dir, &target.binary_name).ok_or_else(|| {
        anyhow!(
            "extracted archive does not contain '{}'",
            target.binary_name
        )
    })?;

    if target.os != OsTag::Windows {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&binary_path)?.permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&binary_path, perms)?;
        }

        let link_path = target.bin_dir.join(&target.binary_name);
        fs::create_dir_all(&target.bin_dir)?;
        // A re-install must replace the previous link.
        if link_path.symlink_metadata().is_ok() {
            fs::remove_file(&link_path)?;
        }
        #[cfg(unix)]
        std::os::unix::fs::symlink(&binary_path, &link_path)?;
        #[cfg(not(unix))]
        fs::copy(&binary_path, &link_path)?;

        tracing::info!(
            "Linked {} -> {}",
            link_path.display(),
            binary_path.display()
        );
    }

    Ok(binary_path)
}

fn locate_binary(install_dir: &Path, binary_name: &str) -> Option<PathBuf> {
    WalkDir::new(install_dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .find(|entry| entry.file_type().is_file() && entry.file_name() == binary_name)
        .map(|entry| entry.into_path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;

    fn write_tar_gz(path: &Path, entries: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, content) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder.append_data(&mut header, name, *content).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_extract_tar_gz_and_locate() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("tool.tar.gz");
        write_tar_gz(&archive, &[("gotestfmt", b"#!/bin/sh\n"), ("LICENSE", b"MIT")]);

        let install_dir = dir.path().join("lib");
        extract_archive(&archive, &install_dir, OsTag::Linux).unwrap();

        let found = locate_binary(&install_dir, "gotestfmt").unwrap();
        assert_eq!(found, install_dir.join("gotestfmt"));
    }

    #[test]
    fn test_extract_zip_skips_parent_escaping_entries() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("tool.zip");
        let file = fs::File::create(&archive).unwrap();
        let mut writer = zip::write::ZipWriter::new(file);
        let options = zip::write::FileOptions::default();
        writer.start_file("../evil.txt", options).unwrap();
        writer.write_all(b"nope").unwrap();
        writer.start_file("gotestfmt.exe", options).unwrap();
        writer.write_all(b"bin").unwrap();
        writer.finish().unwrap();

        let install_dir = dir.path().join("install");
        extract_archive(&archive, &install_dir, OsTag::Windows).unwrap();

        assert!(install_dir.join("gotestfmt.exe").exists());
        // The escaping entry must not appear next to the install dir.
        assert!(!dir.path().join("evil.txt").exists());
    }

    #[test]
    fn test_locate_binary_in_nested_layout() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("gotestfmt_2.1.0/bin");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("gotestfmt"), b"bin").unwrap();

        let found = locate_binary(dir.path(), "gotestfmt").unwrap();
        assert_eq!(found, nested.join("gotestfmt"));
    }

    #[test]
    fn test_expose_binary_replaces_existing_link() {
        let dir = tempdir().unwrap();
        let install_dir = dir.path().join("lib");
        let bin_dir = dir.path().join("bin");
        fs::create_dir_all(&install_dir).unwrap();
        fs::write(install_dir.join("gotestfmt"), b"bin").unwrap();

        let target = PlatformTarget::new(OsTag::Linux, "amd64", "gotestfmt")
            .with_install_dir(&install_dir)
            .with_bin_dir(&bin_dir);

        // Twice: the second run must overwrite the first run's link.
        expose_binary(&target).unwrap();
        let binary = expose_binary(&target).unwrap();

        assert_eq!(binary, install_dir.join("gotestfmt"));
        let link = bin_dir.join("gotestfmt");
        assert_eq!(fs::read_link(&link).unwrap(), binary);
    }

    #[test]
    fn test_expose_binary_fails_when_binary_missing() {
        let dir = tempdir().unwrap();
        let install_dir = dir.path().join("lib");
        fs::create_dir_all(&install_dir).unwrap();

        let target = PlatformTarget::new(OsTag::Linux, "amd64", "gotestfmt")
            .with_install_dir(&install_dir)
            .with_bin_dir(dir.path().join("bin"));

        let err = expose_binary(&target).unwrap_err();
        assert!(err.to_string().contains("does not contain"));
    }
}
