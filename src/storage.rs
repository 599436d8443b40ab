use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use chrono::Utc;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::error::{TrajResult, TrajectoryError};
use crate::pipeline::Trajectory;
use crate::types::{Sample, Series, Vec3};

/// Header written at the top of every recording
pub const CSV_HEADER: &str = "t,w,x,y,z,ax,ay,az";

const RECORD_FIELDS: usize = 8;
const MS_PER_SECOND: f64 = 1000.0;

/// Parse recording text. Time column is milliseconds; a non-numeric first line is a header.
pub fn parse_recording(text: &str) -> TrajResult<Series> {
    let mut samples = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if idx == 0 && !line.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < RECORD_FIELDS {
            return Err(TrajectoryError::Parse {
                line: line_no,
                reason: format!("expected {} fields, found {}", RECORD_FIELDS, fields.len()),
            });
        }

        let mut values = [0.0; RECORD_FIELDS];
        for (slot, field) in values.iter_mut().zip(fields.iter()) {
            *slot = field.parse().map_err(|_| TrajectoryError::Parse {
                line: line_no,
                reason: format!("invalid number {:?}", field),
            })?;
        }

        samples.push(Sample::from_components(
            values[0] / MS_PER_SECOND,
            [values[1], values[2], values[3], values[4]],
            [values[5], values[6], values[7]],
        ));
    }

    log::debug!("Parsed {} samples", samples.len());
    Series::new(samples)
}

/// Read a recording from disk; `.gz` files are decompressed on the fly
pub fn read_recording(path: &Path) -> TrajResult<Series> {
    let file = File::open(path)?;
    let mut text = String::new();
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        BufReader::new(GzDecoder::new(file)).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    parse_recording(&text)
}

/// Write a series in the recording layout (time in milliseconds)
pub fn write_recording<W: Write>(series: &Series, mut writer: W) -> TrajResult<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for s in series {
        let q = &s.orientation;
        let a = &s.acceleration;
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            s.timestamp * MS_PER_SECOND,
            q.w,
            q.i,
            q.j,
            q.k,
            a.x,
            a.y,
            a.z
        )?;
    }
    writer.flush()?;
    Ok(())
}

/// Summary numbers for a reconstructed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryStats {
    pub sample_count: usize,
    pub duration_seconds: f64,
    pub mean_rate_hz: f64,
    pub normalized_cutoff: f64,
    pub peak_speed_ms: f64,
    pub path_length_m: f64,
    pub final_displacement: Vec3,
}

impl TrajectoryStats {
    pub fn from_run(series: &Series, trajectory: &Trajectory) -> Self {
        let duration = series.duration();
        let mean_rate_hz = if series.len() > 1 && duration > 0.0 {
            (series.len() - 1) as f64 / duration
        } else {
            0.0
        };
        let path_length_m = trajectory
            .position
            .as_slice()
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();

        TrajectoryStats {
            sample_count: series.len(),
            duration_seconds: duration,
            mean_rate_hz,
            normalized_cutoff: trajectory.normalized_cutoff,
            peak_speed_ms: trajectory.velocity.max_norm(),
            path_length_m,
            final_displacement: trajectory.position.last().copied().unwrap_or_else(Vec3::zeros),
        }
    }
}

/// Complete run export (JSON-serializable)
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryExport<'a> {
    pub generated_at: String,
    pub source: String,
    pub stats: TrajectoryStats,
    pub timestamps: Vec<f64>,
    pub trajectory: &'a Trajectory,
}

impl<'a> TrajectoryExport<'a> {
    pub fn new(source: &str, series: &Series, trajectory: &'a Trajectory) -> Self {
        TrajectoryExport {
            generated_at: Utc::now().to_rfc3339(),
            source: source.to_string(),
            stats: TrajectoryStats::from_run(series, trajectory),
            timestamps: series.timestamps(),
            trajectory,
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serialize to JSON bytes
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{compute_trajectory, PipelineConfig};
    use flate2::write::GzEncoder;
    use flate2::Compression;

    const RECORDING: &str = "t,w,x,y,z,ax,ay,az
1000,1,0,0,0,0,0,1
1010,1,0,0,0,0.02,0,1
1020,0.99,0.01,0,0,0.01,0,0.99
";

    #[test]
    fn test_parse_with_header() {
        let series = parse_recording(RECORDING).unwrap();
        assert_eq!(series.len(), 3);
        assert!((series.samples()[1].timestamp - 1.01).abs() < 1e-12);
        assert_eq!(series.samples()[2].orientation.w, 0.99);
        assert_eq!(series.samples()[1].acceleration.x, 0.02);
    }

    #[test]
    fn test_parse_without_header() {
        let body = RECORDING.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_eq!(parse_recording(&body).unwrap().len(), 3);
    }

    #[test]
    fn test_parse_errors_report_line() {
        let bad = "t,w,x,y,z,ax,ay,az\n0,1,0,0,0,0,0,1\n10,1,0,0,0,0,0\n";
        match parse_recording(bad).unwrap_err() {
            TrajectoryError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error {:?}", other),
        }

        let garbled = "0,1,0,0,0,0,0,1\n10,1,0,zz,0,0,0,1\n";
        assert!(matches!(
            parse_recording(garbled).unwrap_err(),
            TrajectoryError::Parse { line: 2, .. }
        ));
    }

    #[test]
    fn test_write_then_parse() {
        let series = parse_recording(RECORDING).unwrap();
        let mut buf = Vec::new();
        write_recording(&series, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(CSV_HEADER));
        let back = parse_recording(&text).unwrap();
        assert_eq!(back.len(), series.len());
        for (a, b) in back.iter().zip(series.iter()) {
            assert!((a.timestamp - b.timestamp).abs() < 1e-9);
            assert_eq!(a.acceleration, b.acceleration);
        }
    }

    #[test]
    fn test_read_gzipped_recording() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("imu_trajectory_test_{}.csv.gz", std::process::id()));
        {
            let file = File::create(&path).unwrap();
            let mut enc = GzEncoder::new(file, Compression::default());
            enc.write_all(RECORDING.as_bytes()).unwrap();
            enc.finish().unwrap();
        }
        let series = read_recording(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_recording(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, TrajectoryError::Io(_)));
    }

    #[test]
    fn test_export_json() {
        let series = parse_recording(RECORDING).unwrap();
        let trajectory = compute_trajectory(&series, &PipelineConfig::default()).unwrap();
        let export = TrajectoryExport::new("test.csv", &series, &trajectory);
        assert_eq!(export.stats.sample_count, 3);
        assert!((export.stats.mean_rate_hz - 100.0).abs() < 1e-6);

        let json = export.to_json().unwrap();
        assert!(json.contains("test.csv"));
        assert!(json.contains("linear_acceleration"));
        assert!(json.contains("position"));
    }
}
