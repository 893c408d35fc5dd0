pub mod progress;
pub mod store;
pub mod types;
pub mod uploader;
pub mod walker;

pub use progress::ProgressReporter;
pub use store::RemoteStore;
#[cfg(feature = "s3")]
pub use store::S3RemoteStore;
pub use types::{FileTask, UploadConfig, UploadError, UploadReport, UploadStatus};
pub use uploader::TreeUploader;
