#![doc(html_root_url = "https://docs.rs/chat-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod body;
pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod fragment;
pub mod host;
pub mod operation;
pub mod reconcile;
pub mod sorted;
pub mod state;
pub mod time;

pub use client::Client;
pub use config::{Config, Conventions};
pub use error::{Error, Result};
pub use operation::Operation;
pub use reconcile::Reconciler;
