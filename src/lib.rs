pub mod application;
pub mod archive;
pub mod commands;
pub mod download;
pub mod http;
pub mod pack;
pub mod reconcile;
pub mod runtime;
