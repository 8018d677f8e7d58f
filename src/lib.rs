//! Purpose: Library crate behind the `dmarcview` CLI and its tests.
//! Exports: `api` (public surface), `core` (decoder, normalizer, model, errors), `notice`.
//! Role: Turns DMARC aggregate report XML into a canonical `Report`.
//! Invariants: The decode-and-normalize pipeline is pure; no hidden global state.
//! Invariants: Prefer `api` over reaching into `core` directly.
pub mod api;
pub mod core;
pub mod notice;
