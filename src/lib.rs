// Library root
// -----------
// Small library surface for the dhokla.net command-line client. The
// binary (`main.rs`) wires these modules into an interactive shell.
//
// Module responsibilities:
// - `models`: JSON shapes returned by the API and the `FileIndex` lookup.
// - `error`: typed errors for requests, decoding and downloads.
// - `config`: base URL, endpoint paths and download directory.
// - `api`: blocking HTTP client (directory listing, search, download).
// - `ui`: menu-driven terminal flows on top of `api`.
pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod ui;
