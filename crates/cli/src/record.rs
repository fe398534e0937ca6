/// Measurement records: one `key=value` line on stdout, one JSON line in the record log.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::driver::Measurement;
use crate::error::BenchError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    pub arm_count: usize,
    pub elapsed_ms: u64,
    pub elapsed_us: u64,
    pub success: bool,
    pub errors: usize,
    pub warnings: usize,
    pub timestamp_ms: u64,
    pub build: String,
    pub backend: String,
    pub assembly: String,
}

fn saturate(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

impl MeasurementRecord {
    pub fn from_measurement(
        measurement: &Measurement,
        build: &str,
        backend: &str,
        assembly: &str,
    ) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| saturate(elapsed.as_millis()))
            .unwrap_or_default();
        Self {
            arm_count: measurement.arm_count,
            elapsed_ms: saturate(measurement.elapsed.as_millis()),
            elapsed_us: saturate(measurement.elapsed.as_micros()),
            success: measurement.result.success,
            errors: measurement.result.error_count(),
            warnings: measurement.result.warning_count(),
            timestamp_ms,
            build: build.to_string(),
            backend: backend.to_string(),
            assembly: assembly.to_string(),
        }
    }
}

impl fmt::Display for MeasurementRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "switchbench arms={} elapsed_ms={} elapsed_us={} success={} errors={} warnings={} backend={}",
            self.arm_count,
            self.elapsed_ms,
            self.elapsed_us,
            self.success,
            self.errors,
            self.warnings,
            self.backend
        )
    }
}

/// Append `record` as one JSON line, creating the log if needed.
pub fn append(path: &Path, record: &MeasurementRecord) -> Result<(), BenchError> {
    let mut line = serde_json::to_string(record)?;
    line.push('\n');
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| BenchError::io(path, e))?;
    file.write_all(line.as_bytes()).map_err(|e| BenchError::io(path, e))
}

#[cfg(test)]
pub(crate) fn read_records(path: &Path) -> Vec<MeasurementRecord> {
    std::fs::read_to_string(path)
        .expect("record log should be readable")
        .lines()
        .map(|line| serde_json::from_str(line).expect("record line should parse"))
        .collect()
}
