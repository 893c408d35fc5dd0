//! Mirror a local directory tree into an S3 bucket.
//!
//! Usage: `upload_tree <local-dir> <s3-bucket-name>`
//!
//! Existence checks go through the AWS SDK; the actual transfer shells out to
//! `s3cmd put` per file, smallest files first. Ctrl-C aborts the run between
//! tasks.

use std::error::Error;
use std::process::exit;

use fanout::upload::{S3RemoteStore, TreeUploader, UploadConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let [_, local_dir, bucket] = args.as_slice() else {
        eprintln!("Usage: upload_tree <local-dir> <s3-bucket-name>");
        exit(1)
    };

    let store = S3RemoteStore::connect(bucket.clone()).await;
    let uploader = TreeUploader::new(UploadConfig::new(local_dir, bucket.clone()), store);

    let cancel = uploader.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, aborting upload");
            cancel.cancel();
        }
    });

    let report = uploader.run().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
