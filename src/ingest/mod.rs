/// Data acquisition: archive discovery, download, CSV parsing and caching.
///
/// Submodules:
/// - `index`:      finds the most complete archive per year on the portal.
/// - `archive`:    decodes the regional CSV files inside an archive.
/// - `cache`:      gzip + JSON record files.
/// - `downloader`: ties the above together (`DataDownloader`).

pub mod archive;
pub mod cache;
pub mod downloader;
pub mod index;

pub use downloader::DataDownloader;
