//! Pipeline stages for folder-watching PDF rasterisation.
//!
//! Each submodule implements exactly one step. Data only flows downstream.
//!
//! ## Data Flow
//!
//! ```text
//! watch ──▶ debounce ──▶ count ──▶ schedule ──▶ pool ──▶ aggregate ──▶ archive
//! (poll)    (settle)    (open)    (fan-out)   (render)   (fan-in)     (rename)
//!                          │                                             ▲
//!                          └──────────── open failed ───────────────────┘
//! ```
//!
//! 1. [`watch`]    : report new files with the watched extension
//! 2. [`debounce`] : hold a file back until it stops growing
//! 3. [`count`]    : open the document once to learn its page count
//! 4. [`schedule`] : build one task per page and submit them together
//! 5. [`pool`]     : render and encode pages in parallel, isolated workers
//! 6. [`aggregate`]: fold ordered page results into a job result
//! 7. [`archive`]  : rename the document into processed/ or error/
//!
//! [`render`] and [`encode`] are the capabilities the pool calls through.

pub mod aggregate;
pub mod archive;
pub mod count;
pub mod debounce;
pub mod encode;
pub mod pool;
pub mod render;
pub mod schedule;
pub mod watch;
