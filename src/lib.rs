#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded, thread-safe user metadata for crash reports.
//!
//! ## Overview
//!
//! When an application crashes, the report is far more useful if it says
//! *who* was affected and *what* they were doing. This crate holds that
//! information for the lifetime of a crash-reporting session: an optional
//! user id and a set of custom string attributes, written from anywhere in
//! the application and read back by whatever serializes the report.
//!
//! Two limits keep reports small and predictable:
//!
//! - at most [`Limits::MAX_ATTRIBUTES`] (64) custom attributes, and
//! - at most [`Limits::MAX_ATTRIBUTE_SIZE`] (1024) UTF-16 code units per key,
//!   value or user id, after trimming surrounding whitespace.
//!
//! ## Quick Example
//!
//! ```
//! use crashmeta::AttributeStore;
//!
//! let store = AttributeStore::new();
//! store.set_user_id("user-1234");
//! store.set_custom_key("screen", "checkout")?;
//!
//! // Later, when building the crash report:
//! let user = store.user_id();
//! for (key, value) in &store.custom_keys() {
//!     println!("{key} = {value}");
//! }
//! # assert_eq!(user.as_deref(), Some("user-1234"));
//! # Ok::<(), crashmeta::AttributeError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Sanitization.** Every key, value and user id is trimmed and truncated
//!   before it is stored. See [`sanitize`].
//! - **Capacity rejection.** A write that would push the store past its
//!   attribute limit is dropped, not failed. The store reports it to its
//!   [`CapacityHook`](hooks::CapacityHook), which by default logs through
//!   [`tracing`]. Callers only ever see an error for a missing key.
//! - **Batch admission.** [`AttributeStore::set_custom_keys`] always applies
//!   updates to keys that already exist, but admits its new keys all
//!   together or not at all.
//! - **Live views.** [`AttributeStore::custom_keys`] returns a [`CustomKeys`]
//!   view that shares storage with the store, so later writes are visible
//!   through it. The view cannot be written to.
//!
//! ## Features
//!
//! - `std` (default): uses `std::sync::RwLock` for locking and enables the
//!   `std` features of [`tracing`] and `triomphe`. Without it the crate is
//!   `no_std` and only needs `alloc`; locks are spinlocks from `spin`.
//!
//! For implementation details, see the [`crashmeta-internals`] crate.
//!
//! [`crashmeta-internals`]: crashmeta_internals

extern crate alloc;

mod error;
pub mod hooks;
mod limits;
pub mod sanitize;
mod store;
mod view;

pub use self::{
    error::AttributeError,
    limits::Limits,
    store::{AttributeStore, AttributeStoreBuilder},
    view::CustomKeys,
};
