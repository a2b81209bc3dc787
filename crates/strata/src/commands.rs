use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use strata_backend::{ObjectStore, Registry, RegistryConfig, ReqwestClient, Service};
use strata_manifest::{EncryptionMeta, FileMeta};
use strata_transfer::{
    DownloadProgress, PartitionTable, TransferOptions, UploadProgress, download_sharded,
    upload_sharded,
};

fn registry(config: RegistryConfig) -> Registry<strata_backend::Backend<ReqwestClient>> {
    Registry::from_config(config, Arc::new(ReqwestClient::new()))
}

fn percent_bar() -> Result<ProgressBar> {
    let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
        .context("building progress bar template")?;
    Ok(ProgressBar::new(100).with_style(style))
}

pub async fn put(
    config: RegistryConfig,
    file: &Path,
    name: Option<String>,
    key: Option<String>,
    iv: Option<String>,
) -> Result<()> {
    let payload = tokio::fs::read(file)
        .await
        .with_context(|| format!("reading {}", file.display()))?;
    let file_name = name.unwrap_or_else(|| {
        file.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "payload".into())
    });

    let registry = registry(config);
    let configured: Vec<Service> = registry.configured().map(|s| s.service()).collect();
    if configured.is_empty() {
        anyhow::bail!(
            "no backends configured; set STRATA_WEB3STORAGE_TOKEN, STRATA_PINATA_TOKEN \
             or STRATA_NFTSTORAGE_TOKEN, or provide tokens in strata.toml"
        );
    }
    // Confine the partition table to backends that can actually accept
    // uploads; ratios among the survivors are preserved.
    let partition = PartitionTable::default().restricted_to(&configured)?;
    let options = TransferOptions::default().partition(partition);

    let bar = percent_bar()?;
    bar.set_message(format!("uploading {file_name}"));
    let progress_bar = bar.clone();

    let original_size = payload.len() as u64;
    let cid = upload_sharded(
        &registry,
        Bytes::from(payload),
        FileMeta {
            file_name,
            original_size,
        },
        EncryptionMeta {
            key: key.unwrap_or_default(),
            iv: iv.unwrap_or_default(),
        },
        &options,
        Some(Arc::new(move |p: &UploadProgress| {
            progress_bar.set_position(p.overall as u64);
        })),
    )
    .await?;
    bar.finish_and_clear();

    println!("{} {cid}", style("manifest cid:").green().bold());
    Ok(())
}

pub async fn get(config: RegistryConfig, cid: &str, output: &Path) -> Result<()> {
    let registry = registry(config);
    let options = TransferOptions::default();

    let bar = percent_bar()?;
    bar.set_message(format!("downloading {cid}"));
    let progress_bar = bar.clone();

    let payload = download_sharded(
        &registry,
        cid,
        &options,
        Some(Arc::new(move |p: &DownloadProgress| {
            progress_bar.set_position(p.overall as u64);
        })),
    )
    .await?;
    bar.finish_and_clear();

    tokio::fs::write(output, &payload)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!(
        "{} {} ({} bytes)",
        style("restored:").green().bold(),
        output.display(),
        payload.len()
    );
    Ok(())
}

pub async fn health(config: RegistryConfig) -> Result<()> {
    let registry = registry(config);
    let report = registry.health_check_all().await;
    for service in Service::ALL {
        let configured = registry
            .by_service(service)
            .map(|s| s.is_configured())
            .unwrap_or(false);
        let reachable = report.get(&service).copied().unwrap_or(false);
        let status = if reachable {
            style("reachable").green()
        } else {
            style("unreachable").red()
        };
        let auth = if configured {
            style("configured").green()
        } else {
            style("no credentials").yellow()
        };
        println!("{:<12} {status:<12} {auth}", service.to_string());
    }
    Ok(())
}
