use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::RawSample;
use super::record::{RECORD_SIZE, decode_record};
use crate::error::{ImuError, Result};

/// Pull-style supplier of raw samples
///
/// `Ok(None)` means the source has ended cleanly. Errors are fatal to whatever
/// accumulation is in progress.
pub trait SampleSource {
    fn next_sample(&mut self) -> Result<Option<RawSample>>;
}

/// Samples held in memory
#[derive(Debug, Clone, Default)]
pub struct VecSource {
    samples: VecDeque<RawSample>,
}

impl VecSource {
    pub fn new(samples: Vec<RawSample>) -> Self {
        Self {
            samples: samples.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len()
    }
}

impl SampleSource for VecSource {
    fn next_sample(&mut self) -> Result<Option<RawSample>> {
        Ok(self.samples.pop_front())
    }
}

/// Ticks in one period of the 32-bit device counter
const COUNTER_PERIOD: u64 = 1 << 32;

/// Samples decoded from a binary log (see [`super::record`])
///
/// The log stores the low 32 bits of the device counter. Timestamps are
/// extended to `u64`: a drop of more than half the counter range is a wrap,
/// a smaller one is passed through as a rollback.
pub struct LogFileSource<R: Read = BufReader<File>> {
    reader: R,
    records_read: usize,
    last_timestamp: Option<u64>,
}

impl LogFileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: Read> LogFileSource<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader,
            records_read: 0,
            last_timestamp: None,
        }
    }

    /// Place a raw 32-bit counter value in the counter period closest to the
    /// previous timestamp.
    fn extend_timestamp(&mut self, raw: u64) -> u64 {
        let extended = match self.last_timestamp {
            None => raw,
            Some(last) => {
                let base = last - last % COUNTER_PERIOD;
                [base.checked_sub(COUNTER_PERIOD), Some(base), Some(base + COUNTER_PERIOD)]
                    .into_iter()
                    .flatten()
                    .map(|period_start| period_start + raw)
                    .min_by_key(|candidate| candidate.abs_diff(last))
                    .unwrap_or(raw)
            }
        };
        if let Some(last) = self.last_timestamp
            && extended / COUNTER_PERIOD > last / COUNTER_PERIOD
        {
            log::debug!(
                "Timestamp counter wrapped after record {} ({} -> {})",
                self.records_read,
                last,
                extended
            );
        }
        self.last_timestamp = Some(extended);
        extended
    }

    pub fn records_read(&self) -> usize {
        self.records_read
    }
}

impl<R: Read> SampleSource for LogFileSource<R> {
    fn next_sample(&mut self) -> Result<Option<RawSample>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;

        while filled < RECORD_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match filled {
            0 => Ok(None),
            RECORD_SIZE => {
                let mut sample = decode_record(&buf)?;
                sample.timestamp = self.extend_timestamp(sample.timestamp);
                self.records_read += 1;
                Ok(Some(sample))
            }
            n => Err(ImuError::SourceUnavailable(format!(
                "short read after record {}: got {} of {} bytes",
                self.records_read, n, RECORD_SIZE
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::Vector3;
    use crate::sensor::record::encode_record;
    use std::io::Cursor;

    fn sample(ts: u64) -> RawSample {
        RawSample::new(ts, 20.0, Vector3::new(0.5, 0.0, 0.0), Vector3::ZERO)
    }

    #[test]
    fn test_vec_source_drains_in_order() {
        let mut source = VecSource::new(vec![sample(1), sample(2)]);
        assert_eq!(source.next_sample().unwrap().unwrap().timestamp, 1);
        assert_eq!(source.next_sample().unwrap().unwrap().timestamp, 2);
        assert!(source.next_sample().unwrap().is_none());
    }

    #[test]
    fn test_log_source_reads_records_then_ends() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&encode_record(&sample(10)));
        bytes.extend_from_slice(&encode_record(&sample(20)));

        let mut source = LogFileSource::from_reader(Cursor::new(bytes));
        assert_eq!(source.next_sample().unwrap().unwrap().timestamp, 10);
        assert_eq!(source.next_sample().unwrap().unwrap().timestamp, 20);
        assert!(source.next_sample().unwrap().is_none());
        assert_eq!(source.records_read(), 2);
    }

    #[test]
    fn test_log_source_extends_wrapped_counter() {
        let near_end = COUNTER_PERIOD - 100;
        let mut bytes = Vec::new();
        for ts in [near_end, near_end + 60, COUNTER_PERIOD + 20, COUNTER_PERIOD + 80] {
            bytes.extend_from_slice(&encode_record(&sample(ts)));
        }

        let mut source = LogFileSource::from_reader(Cursor::new(bytes));
        let mut timestamps = Vec::new();
        while let Some(s) = source.next_sample().unwrap() {
            timestamps.push(s.timestamp);
        }
        assert_eq!(
            timestamps,
            vec![near_end, near_end + 60, COUNTER_PERIOD + 20, COUNTER_PERIOD + 80]
        );
    }

    #[test]
    fn test_log_source_keeps_small_rollback() {
        let mut bytes = Vec::new();
        for ts in [5000, 5000, 4000, 6000] {
            bytes.extend_from_slice(&encode_record(&sample(ts)));
        }

        let mut source = LogFileSource::from_reader(Cursor::new(bytes));
        let mut timestamps = Vec::new();
        while let Some(s) = source.next_sample().unwrap() {
            timestamps.push(s.timestamp);
        }
        assert_eq!(timestamps, vec![5000, 5000, 4000, 6000]);
    }

    #[test]
    fn test_log_source_rollback_across_wrap() {
        let mut bytes = Vec::new();
        for ts in [COUNTER_PERIOD - 10, COUNTER_PERIOD + 5, COUNTER_PERIOD - 3, COUNTER_PERIOD + 40] {
            bytes.extend_from_slice(&encode_record(&sample(ts)));
        }

        let mut source = LogFileSource::from_reader(Cursor::new(bytes));
        let mut timestamps = Vec::new();
        while let Some(s) = source.next_sample().unwrap() {
            timestamps.push(s.timestamp);
        }
        assert_eq!(
            timestamps,
            vec![
                COUNTER_PERIOD - 10,
                COUNTER_PERIOD + 5,
                COUNTER_PERIOD - 3,
                COUNTER_PERIOD + 40
            ]
        );
    }

    #[test]
    fn test_log_source_trailing_partial_record_fails() {
        let mut bytes = encode_record(&sample(10)).to_vec();
        bytes.extend_from_slice(&[0u8; 7]);

        let mut source = LogFileSource::from_reader(Cursor::new(bytes));
        assert!(source.next_sample().unwrap().is_some());
        assert!(matches!(
            source.next_sample(),
            Err(ImuError::SourceUnavailable(_))
        ));
    }
}
