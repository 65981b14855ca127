//! Stages a conversion form runs through.
//!
//! Each submodule implements one step and is usable on its own; the
//! [`crate::form`] module wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! select ──▶ preview                      (independent of submission)
//!
//! submit ──▶ validate ──▶ request ──▶ (network) ──▶ response ──▶ download
//!            (size)       (multipart)              (outcome)     (sink)
//! ```
//!
//! 1. [`validate`]: reject empty selections and oversized files
//! 2. [`preview`]: render a selection locally, owning at most one
//!    transient URL per slot
//! 3. [`encode`]: base64 data URLs for inline image previews
//! 4. [`request`]: the two-part multipart POST to the category endpoint
//! 5. [`response`]: classify the HTTP outcome and negotiate the filename
//! 6. [`download`]: hand the payload to a sink under a transient URL

pub mod download;
pub mod encode;
pub mod preview;
pub mod request;
pub mod response;
pub mod validate;
