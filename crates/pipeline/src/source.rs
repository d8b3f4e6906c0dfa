//! Recording sources: the text header and the binary sample stream.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use eeg_types::{AnalysisError, AnalysisResult, Header};
use tracing::debug;

/// Header key holding the sampling interval in microseconds.
pub const SAMPLING_INTERVAL_KEY: &str = "SamplingInterval";

const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Recovers the sampling rate from line-oriented `key=value` header text.
#[derive(Debug, Clone, Copy)]
pub struct HeaderParser {
    default_sampling_rate: u32,
}

impl HeaderParser {
    pub fn new(default_sampling_rate: u32) -> Self {
        Self { default_sampling_rate }
    }

    /// Header used when the text does not supply a usable rate.
    pub fn default_header(&self) -> Header {
        Header { sampling_rate: self.default_sampling_rate }
    }

    /// Parse `text`, keeping the default rate when no sampling interval is present.
    ///
    /// The first `SamplingInterval` line wins and scanning stops there. A value
    /// that is not a positive number of microseconds is a `HeaderParse` error.
    pub fn parse(&self, text: &str) -> AnalysisResult<Header> {
        for line in text.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() != SAMPLING_INTERVAL_KEY {
                continue;
            }

            let value = value.trim();
            let interval_us: f64 = value.parse().map_err(|_| {
                AnalysisError::header_parse(format!("{SAMPLING_INTERVAL_KEY} is not a number: '{value}'"))
            })?;
            if !interval_us.is_finite() || interval_us <= 0.0 {
                return Err(AnalysisError::header_parse(format!(
                    "{SAMPLING_INTERVAL_KEY} must be positive, got {interval_us}"
                )));
            }

            let rate = (MICROS_PER_SECOND / interval_us).round();
            if rate < 1.0 || rate > u32::MAX as f64 {
                return Err(AnalysisError::header_parse(format!(
                    "{SAMPLING_INTERVAL_KEY} of {interval_us} us gives an unusable rate of {rate} Hz"
                )));
            }
            debug!("Sampling interval {} us -> {} Hz", interval_us, rate);
            return Ok(Header { sampling_rate: rate as u32 });
        }

        Ok(self.default_header())
    }
}

/// Decodes little-endian signed 16-bit samples of a single channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleLoader {
    max_bytes: Option<usize>,
}

impl SampleLoader {
    pub fn new() -> Self {
        Self { max_bytes: None }
    }

    /// Reject streams longer than `max_bytes`.
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self { max_bytes: Some(max_bytes) }
    }

    /// Decode `bytes` into samples. A trailing odd byte is dropped, so 0 or 1
    /// bytes yield an empty signal.
    pub fn decode(&self, bytes: &[u8]) -> AnalysisResult<Vec<f64>> {
        self.check_size(bytes.len())?;

        let num_samples = bytes.len() / 2;
        let mut raw = vec![0i16; num_samples];
        LittleEndian::read_i16_into(&bytes[..num_samples * 2], &mut raw);

        if bytes.len() % 2 == 1 {
            debug!("Dropping trailing odd byte of {}-byte sample stream", bytes.len());
        }
        Ok(raw.into_iter().map(f64::from).collect())
    }

    /// Read the whole stream from `reader` and decode it.
    pub fn read_from<R: Read>(&self, reader: R) -> AnalysisResult<Vec<f64>> {
        let mut bytes = Vec::new();
        let read = match self.max_bytes {
            // One extra byte is enough to detect an oversized stream.
            Some(limit) => reader.take(limit as u64 + 1).read_to_end(&mut bytes),
            None => {
                let mut reader = reader;
                reader.read_to_end(&mut bytes)
            }
        };
        read.map_err(|e| AnalysisError::decode(format!("failed to read sample stream: {e}")))?;
        self.decode(&bytes)
    }

    fn check_size(&self, len: usize) -> AnalysisResult<()> {
        match self.max_bytes {
            Some(limit) if len > limit => Err(AnalysisError::decode(format!(
                "sample stream exceeds the {limit}-byte limit"
            ))),
            _ => Ok(()),
        }
    }
}
