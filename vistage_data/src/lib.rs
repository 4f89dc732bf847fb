// Copyright 2025 the Vistage Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Data plumbing for `vistage` components.
//!
//! Charts and maps accept data in several shapes: an inline array of row objects, a single
//! record object, or a URL pointing at JSON/CSV/TSV. This crate normalizes all of them into a
//! [`Dataset`] of [`Record`]s:
//! - [`DataSource`] and [`DataFormat`] describe the input,
//! - a [`Fetcher`] resolves URLs (filesystem, in-memory, or HTTP behind the `http` feature),
//! - [`DataLoader`] loads each distinct `(source, format)` pair exactly once and runs an
//!   optional after-loaded hook before exposing the data.
//!
//! Row transforms used by the chart layouts ([`sort_records`], [`stack_rows`]) and dot-path
//! lookups used by map feature matching ([`lookup_path`], [`value_key`]) live here too.

mod error;
mod fetch;
mod loader;
mod lookup;
mod parse;
mod record;
mod source;
mod transform;

pub use error::DataError;
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{Fetcher, FileFetcher, StaticFetcher};
pub use loader::{AfterLoaded, DataLoader, LoadEvent, LoadState};
pub use lookup::{lookup_path, value_key};
pub use parse::{parse_dataset, parse_delimited, parse_json};
pub use record::{Dataset, Record};
pub use source::{DataFormat, DataSource};
pub use transform::{
    SortKey, SortOrder, StackOffset, StackSegment, sort_records, stack_rows, stack_totals,
};
