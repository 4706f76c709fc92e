#![doc = "sharepoint-transfer: date-folder file transfer against a SharePoint document library."]

//! One run authenticates against the identity provider, resolves the target
//! site's default document library, then — once per processing date — either
//! uploads staged local files into the date-named remote folder or downloads
//! that folder's files and writes their output manifests.

pub mod auth;
pub mod cli;
pub mod contract;
pub mod dates;
pub mod error;
pub mod folder_path;
pub mod graph;
pub mod input;
pub mod load_config;
pub mod manifest;
pub mod runner;
pub mod transfer;
