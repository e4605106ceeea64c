//! Tolerant JGRAB channel parser.
//!
//! The logger writes a header, a sentinel line starting with `JGRAB`, and then
//! five blocks of integer samples. A line starting with `%%` closes the current
//! block and moves on to the next channel. Anything that does not begin with an
//! integer token (prompts, comments, timestamps, blank lines) is skipped.
//!
//! ```text
//!  <sp ok
//! JGRAB
//!  -00028   % 2023-10-27   07:47:50
//!  -00036
//! %% 0  -19993
//!  -00017
//! ...
//! %% 4  -19993 ok
//! ```
//!
//! Only the first whitespace-delimited token of each line is consulted, so a
//! trailing annotation after a sample does not affect parsing.

use crate::error::DataError;
use std::fmt;
use std::num::IntErrorKind;

/// Number of channels in every JGRAB capture.
pub const CHANNEL_COUNT: usize = 5;

/// The five logger channels, in the order they appear in a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {
    /// DC bus voltage.
    DcVoltage,
    /// S-phase current, before sensor gain calibration.
    SPhaseCurrent,
    /// R-phase AC voltage.
    RPhaseVoltage,
    /// R-phase current, before sensor gain calibration.
    RPhaseCurrent,
    /// S-phase AC voltage.
    SPhaseVoltage,
}

impl Channel {
    /// All channels in capture order.
    pub const ALL: [Channel; CHANNEL_COUNT] = [
        Channel::DcVoltage,
        Channel::SPhaseCurrent,
        Channel::RPhaseVoltage,
        Channel::RPhaseCurrent,
        Channel::SPhaseVoltage,
    ];

    /// Position of this channel within a capture.
    pub const fn index(self) -> usize {
        match self {
            Channel::DcVoltage => 0,
            Channel::SPhaseCurrent => 1,
            Channel::RPhaseVoltage => 2,
            Channel::RPhaseCurrent => 3,
            Channel::SPhaseVoltage => 4,
        }
    }

    /// Channel at a capture position, if in range.
    pub fn from_index(index: usize) -> Option<Channel> {
        Self::ALL.get(index).copied()
    }

    /// Column label used in datasets and reports.
    pub const fn label(self) -> &'static str {
        match self {
            Channel::DcVoltage => "Dc-V",
            Channel::SPhaseCurrent => "Sph-Unscaled",
            Channel::RPhaseVoltage => "RphV",
            Channel::RPhaseCurrent => "Rphl-Unscaled",
            Channel::SPhaseVoltage => "SphV",
        }
    }

    /// Look up a channel by its column label.
    pub fn from_label(label: &str) -> Option<Channel> {
        Self::ALL.into_iter().find(|c| c.label() == label)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parser configuration.
///
/// The numeric base is an explicit setting; it is never inferred from the
/// tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    radix: u32,
    sentinel: String,
    separator: String,
}

impl ParserOptions {
    /// Default start-of-data sentinel.
    pub const DEFAULT_SENTINEL: &'static str = "JGRAB";
    /// Default channel separator marker.
    pub const DEFAULT_SEPARATOR: &'static str = "%%";

    /// Set the numeric base used for sample tokens (2..=36).
    pub fn with_radix(mut self, radix: u32) -> Result<Self, DataError> {
        if !(2..=36).contains(&radix) {
            return Err(DataError::InvalidRadix(radix));
        }
        self.radix = radix;
        Ok(self)
    }

    /// Set the line prefix that opens the data block.
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    /// Set the line prefix that advances to the next channel.
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Numeric base of sample tokens.
    pub fn radix(&self) -> u32 {
        self.radix
    }

    /// Start-of-data sentinel prefix.
    pub fn sentinel(&self) -> &str {
        &self.sentinel
    }

    /// Channel separator prefix.
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            radix: 10,
            sentinel: Self::DEFAULT_SENTINEL.to_string(),
            separator: Self::DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// The five integer channels recovered from one document.
///
/// Lengths are not checked here; [`ChannelDataset::from_raw`](crate::ChannelDataset::from_raw)
/// rejects mismatched or empty channels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawChannelSet {
    channels: [Vec<i64>; CHANNEL_COUNT],
}

impl RawChannelSet {
    /// Wrap already-separated channels.
    pub fn new(channels: [Vec<i64>; CHANNEL_COUNT]) -> Self {
        Self { channels }
    }

    /// Samples of one channel.
    pub fn channel(&self, channel: Channel) -> &[i64] {
        &self.channels[channel.index()]
    }

    /// Number of samples in each channel, in capture order.
    pub fn lengths(&self) -> [usize; CHANNEL_COUNT] {
        std::array::from_fn(|i| self.channels[i].len())
    }

    /// Shared channel length, or `None` if the channels disagree.
    pub fn common_len(&self) -> Option<usize> {
        let [first, rest @ ..] = self.lengths();
        rest.iter().all(|&len| len == first).then_some(first)
    }

    /// `true` when no channel holds any sample.
    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(Vec::is_empty)
    }

    /// Channels paired with their identity, in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, &[i64])> {
        Channel::ALL
            .into_iter()
            .zip(self.channels.iter().map(Vec::as_slice))
    }

    /// Consume the set and return the raw vectors.
    pub fn into_inner(self) -> [Vec<i64>; CHANNEL_COUNT] {
        self.channels
    }
}

/// Running state threaded through the line fold.
struct ParseState {
    in_data: bool,
    current: usize,
    channels: [Vec<i64>; CHANNEL_COUNT],
}

impl ParseState {
    fn new() -> Self {
        Self {
            in_data: false,
            current: 0,
            channels: Default::default(),
        }
    }

    // Order matters: sentinel, then separator, then the sample append. A
    // separator line carrying a numeric first token lands in the new channel.
    fn step(mut self, line: &str, options: &ParserOptions) -> Self {
        if line.starts_with(options.sentinel.as_str()) {
            self.in_data = true;
        }

        if self.in_data && line.starts_with(options.separator.as_str()) {
            if self.current + 1 < CHANNEL_COUNT {
                self.current += 1;
            } else {
                #[cfg(feature = "tracing")]
                tracing::debug!(line, "separator after last channel; staying on channel 4");
            }
        }

        if let Some(value) = line
            .split_whitespace()
            .next()
            .and_then(|token| parse_token(token, options.radix))
        {
            self.channels[self.current].push(value);
        }

        self
    }
}

/// Parse a JGRAB document into its five raw channels.
///
/// Never fails: lines that do not start with an integer token are skipped.
/// Parsing is pure, so the same text always yields an equal set.
pub fn parse_str(text: &str, options: &ParserOptions) -> RawChannelSet {
    let state = text
        .lines()
        .fold(ParseState::new(), |state, line| state.step(line, options));

    #[cfg(feature = "tracing")]
    tracing::debug!(
        lengths = ?state.channels.each_ref().map(Vec::len),
        separators = state.current,
        "parsed JGRAB document"
    );

    RawChannelSet::new(state.channels)
}

/// Parse one signed integer token in `radix`.
///
/// Accepts a leading sign, leading zeros, and the conventional `0b`/`0o`/`0x`
/// prefix when it matches the radix. Values outside `i64` are skipped like any
/// other non-numeric line.
fn parse_token(token: &str, radix: u32) -> Option<i64> {
    let (negative, unsigned) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };

    let digits = strip_radix_prefix(unsigned, radix);
    if digits.is_empty() || digits.starts_with(['+', '-']) {
        return None;
    }

    let magnitude = match i128::from_str_radix(digits, radix) {
        Ok(magnitude) => magnitude,
        Err(err) => {
            if *err.kind() == IntErrorKind::PosOverflow {
                skip_out_of_range(token);
            }
            return None;
        }
    };
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value)
        .inspect_err(|_| skip_out_of_range(token))
        .ok()
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn skip_out_of_range(token: &str) {
    #[cfg(feature = "tracing")]
    tracing::debug!(token, "integer token out of range; line skipped");
}

fn strip_radix_prefix(digits: &str, radix: u32) -> &str {
    let prefix = match radix {
        2 => ["0b", "0B"],
        8 => ["0o", "0O"],
        16 => ["0x", "0X"],
        _ => return digits,
    };
    prefix
        .iter()
        .find_map(|p| digits.strip_prefix(p))
        .unwrap_or(digits)
}
