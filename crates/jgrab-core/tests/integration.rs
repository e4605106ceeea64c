//! Integration tests for jgrab-core.
//!
//! Builds a full-size logger capture (five channels of 128 samples, as written
//! by the logger for two mains cycles) and checks parsing and dataset
//! construction through the public API.

use std::f64::consts::PI;

use jgrab_core::{
    Channel, ChannelDataset, DataError, ParserOptions, RawChannelSet, SampleTiming, ScaleFactors,
    TIME_LABEL, parse_str,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const SAMPLES: usize = 128;

/// Raw counts for a 50 Hz sine sampled on the default 64-per-cycle grid.
fn sine_counts(peak_counts: f64, phase: f64) -> Vec<i64> {
    (0..SAMPLES)
        .map(|i| {
            let t = 0.02 * i as f64 / 64.0;
            (peak_counts * (2.0 * PI * 50.0 * t + phase).sin()).round() as i64
        })
        .collect()
}

fn capture_channels() -> [Vec<i64>; 5] {
    [
        vec![27_900; SAMPLES],
        sine_counts(1_200.0, -0.3),
        sine_counts(13_356.0, 0.0),
        sine_counts(900.0, -0.2),
        sine_counts(13_356.0, -2.0 * PI / 3.0),
    ]
}

fn render(channels: &[Vec<i64>; 5]) -> String {
    let mut doc = String::from("\n .. \n <sp ok\nJGRAB \n");
    for (index, channel) in channels.iter().enumerate() {
        for (i, value) in channel.iter().enumerate() {
            if i == 0 {
                doc.push_str(&format!(" {value:06}\t% 2023-10-27   07:47:50\n"));
            } else {
                doc.push_str(&format!(" {value:06}\n"));
            }
        }
        doc.push_str(&format!("%% {index}  -19993\n"));
    }
    doc.push_str("%% 4  -19993 ok\n    ");
    doc
}

// ===========================================================================
// Parsing
// ===========================================================================

#[test]
fn full_capture_has_five_equal_channels() {
    let channels = capture_channels();
    let raw = parse_str(&render(&channels), &ParserOptions::default());
    assert_eq!(raw.lengths(), [SAMPLES; 5]);
    assert_eq!(raw, RawChannelSet::new(channels));
}

#[test]
fn repeated_parses_are_identical() {
    let doc = render(&capture_channels());
    let options = ParserOptions::default();
    assert_eq!(parse_str(&doc, &options), parse_str(&doc, &options));
}

#[test]
fn custom_markers() {
    let options = ParserOptions::default()
        .with_sentinel("BEGIN")
        .with_separator("--");
    let raw = parse_str("BEGIN\n1\n--\n2\n--\n3\n--\n4\n--\n5\n", &options);
    assert_eq!(raw.into_inner(), [vec![1], vec![2], vec![3], vec![4], vec![5]]);
}

// ===========================================================================
// Dataset
// ===========================================================================

#[test]
fn dataset_from_capture() {
    let raw = parse_str(&render(&capture_channels()), &ParserOptions::default());
    let ds = ChannelDataset::from_raw(&raw, &SampleTiming::default(), &ScaleFactors::default())
        .expect("capture is well formed");

    assert_eq!(ds.len(), SAMPLES);
    let time = ds.column(TIME_LABEL).unwrap();
    assert_eq!(time[0], 0.0);
    assert!((time[SAMPLES - 1] - 0.02 * 127.0 / 64.0).abs() < 1e-12);

    // 13356 counts * 0.02508 V/count is roughly a 335 V peak.
    let peak = ds
        .channel(Channel::RPhaseVoltage)
        .iter()
        .fold(0.0f64, |acc, v| acc.max(v.abs()));
    assert!((peak - 335.0).abs() < 1.0, "peak {peak}");

    let dc = ds.channel(Channel::DcVoltage)[0];
    assert!((dc - 27_900.0 * ScaleFactors::VOLTAGE).abs() < 1e-9);
}

#[test]
fn truncated_capture_reports_every_length() {
    let mut channels = capture_channels();
    channels[3].pop();
    let raw = parse_str(&render(&channels), &ParserOptions::default());
    let err = ChannelDataset::from_raw(&raw, &SampleTiming::default(), &ScaleFactors::default())
        .unwrap_err();
    assert_eq!(
        err,
        DataError::ShapeMismatch {
            lengths: [128, 128, 128, 127, 128]
        }
    );
    assert!(err.to_string().contains("127"));
}

#[test]
fn header_only_document_is_empty() {
    let raw = parse_str(" ..\n <sp ok\nJGRAB\n%% 0\n", &ParserOptions::default());
    assert!(raw.is_empty());
    let err = ChannelDataset::from_raw(&raw, &SampleTiming::default(), &ScaleFactors::default())
        .unwrap_err();
    assert!(matches!(err, DataError::EmptyData { .. }));
}
