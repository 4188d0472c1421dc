pub mod record;
pub mod sample;
pub mod source;

pub use record::{RECORD_SIZE, decode_record, encode_record, write_records};
pub use sample::{AveragedSample, GyroVector2D, RawSample, SampleStamp, Vector3};
pub use source::{LogFileSource, SampleSource, VecSource};
