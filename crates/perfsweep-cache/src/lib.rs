//! On-disk execution cache for perfsweep.
//!
//! A workload is measured at most once: repeated requests are answered from
//! the cache directory until the entry is forced out or found to describe a
//! different workload.

pub mod cache;

pub use cache::{read_record, record_files, CacheFile, ExecutionCache, Resolved, Source};
