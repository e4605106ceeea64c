//! JGRAB Core - channel recovery for power-logger text exports
//!
//! A JGRAB export is a line-oriented text dump from a power-measurement data
//! logger. After a `JGRAB` sentinel line, five channels of integer samples are
//! written one after another, separated by lines beginning with `%%`.
//! Annotations, timestamps and prompt noise are interleaved freely.
//!
//! - [`channels`] - tolerant parser producing a [`RawChannelSet`]
//! - [`dataset`] - labelled, time-indexed, unit-scaled [`ChannelDataset`]
//!
//! ## Example
//!
//! ```rust
//! use jgrab_core::{ChannelDataset, ParserOptions, SampleTiming, ScaleFactors, parse_str};
//!
//! let text = "JGRAB\n 12\n%% 0\n 1\n%% 1\n 2\n%% 2\n 3\n%% 3\n 4\n%% 4 ok\n";
//! let raw = parse_str(text, &ParserOptions::default());
//! assert_eq!(raw.lengths(), [1, 1, 1, 1, 1]);
//!
//! let dataset = ChannelDataset::from_raw(&raw, &SampleTiming::default(), &ScaleFactors::unity())?;
//! assert_eq!(dataset.len(), 1);
//! # Ok::<(), jgrab_core::DataError>(())
//! ```

pub mod channels;
pub mod dataset;
mod error;

pub use channels::{CHANNEL_COUNT, Channel, ParserOptions, RawChannelSet, parse_str};
pub use dataset::{ChannelDataset, SampleTiming, ScaleFactors, TIME_LABEL};
pub use error::DataError;
