// SPDX-License-Identifier: MPL-2.0

//! Image processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ Photo (JPEG) │
//! │   (RGBA)     │     │  - Filter         │     │  in session  │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │  4 × Photo   │ ──▶ │  Strip Renderer   │ ──▶ │  JPEG File   │
//! │  + template  │     │  - Decode         │     │  (q = 100)   │
//! │              │     │  - Decorate       │     │              │
//! │              │     │  - Composite      │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Filtering and JPEG encoding of single captures
//! - [`strip`]: Template compositing and export of finished strips

pub mod photo;
pub mod strip;
