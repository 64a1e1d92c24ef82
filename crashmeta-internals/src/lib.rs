#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_docs_in_private_items,
    unsafe_code,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
//! Internal implementation crate for [`crashmeta`].
//!
//! # Overview
//!
//! This crate contains the concurrent storage that backs the [`crashmeta`]
//! attribute store: [`StripedMap`], a `String -> String` map split into
//! independently locked shards. It knows nothing about sanitization, limits
//! or logging; those live in [`crashmeta`]. The [`RwLock`] used for each
//! shard is exported as well, for other state that sits next to the map.
//!
//! **This crate is an implementation detail.** No semantic versioning guarantees
//! are provided. Users should depend on the [`crashmeta`] crate, not this one.
//!
//! # Locking
//!
//! With the `std` feature each shard is guarded by `std::sync::RwLock` (with
//! poisoning ignored). Without it the crate is `no_std` and uses
//! `spin::RwLock`.
//!
//! [`crashmeta`]: https://docs.rs/crashmeta/latest/crashmeta/

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod lock;
pub mod striped;

pub use self::{lock::RwLock, striped::StripedMap};
