//! # qrsnap
//!
//! Type a text, get a scannable QR code.
//!
//! `qrsnap` encodes text into QR Code Model 2 symbols (versions 1 to 40, four
//! error correction levels), renders them to RGB images with exact module
//! blocks, and saves them as PNG. A small [`session::Session`] state machine
//! sits between a user interface and the pipeline, tracking the input, the
//! last generated image and a status line.
//!
//! ## Features
//!
//! - Byte mode encoding of UTF-8 text with automatic or fixed version.
//! - All eight masks evaluated; the lowest penalty wins.
//! - Solid-block rendering with custom colors and quiet zone.
//! - Aspect-preserving preview scaling and a text preview for terminals.
//! - PNG output through the `image` crate.
//!
//! ## Installation
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! qrsnap = "0.1"
//! ```
//!
//! ## Example
//!
//! Encode and render in one go:
//!
//! ```rust
//! use qrsnap::{encode, render, Colors, EncodingConfig};
//!
//! let config = EncodingConfig::default();
//! let matrix = encode("https://example.com", &config).unwrap();
//! assert_eq!(matrix.symbol_size(), 25);
//!
//! let colors = Colors::default();
//! let img = render(&matrix, config.module_size_px, colors.foreground, colors.background).unwrap();
//! assert_eq!(img.dimensions(), (330, 330));
//! ```
//!
//! Drive it the way a UI would:
//!
//! ```rust,no_run
//! use qrsnap::Session;
//!
//! let mut session = Session::default();
//! session.set_input("Hello, World!");
//! session.generate().unwrap();
//! session.save_to("qr_code.png").unwrap();
//! println!("{}", session.status_line().unwrap().text);
//! ```
//!
//! ## Modules
//!
//! - [`qrcode`]: Core QR code encoding.
//! - [`render`]: Rasterizing, preview scaling and PNG output.
//! - [`session`]: Interaction state machine.
//! - [`config`]: Encoding and color settings.
//! - [`logging`]: Subscriber setup for binaries.

pub mod config;
pub mod error;
pub mod logging;
pub mod qrcode;
pub mod render;
pub mod session;

pub use config::{Colors, EncodingConfig};
pub use error::{QrError, Result};
pub use qrcode::{encode, EcLevel, SymbolMatrix, Version, VersionChoice};
pub use render::{render, RasterImage};
pub use session::Session;
