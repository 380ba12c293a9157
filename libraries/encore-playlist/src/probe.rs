//! Duration probing
//!
//! Reads the container header of an uploaded file to find its playing time.
//! Probing never fails a save; an unrecognised format just leaves the
//! duration unknown.

use lofty::{AudioFile, Probe};
use std::io::Cursor;

/// Finds the playing time of encoded audio
pub trait DurationProbe: Send + Sync {
    /// Duration in seconds, or `None` when it cannot be determined
    fn probe(&self, bytes: &[u8]) -> Option<f64>;
}

impl<F> DurationProbe for F
where
    F: Fn(&[u8]) -> Option<f64> + Send + Sync,
{
    fn probe(&self, bytes: &[u8]) -> Option<f64> {
        self(bytes)
    }
}

/// Probe backed by lofty's format detection
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyProbe;

impl DurationProbe for LoftyProbe {
    fn probe(&self, bytes: &[u8]) -> Option<f64> {
        let probe = match Probe::new(Cursor::new(bytes)).guess_file_type() {
            Ok(probe) => probe,
            Err(e) => {
                tracing::debug!("Could not guess audio format: {}", e);
                return None;
            }
        };

        let tagged_file = match probe.read() {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("Could not read audio properties: {}", e);
                return None;
            }
        };

        let seconds = tagged_file.properties().duration().as_secs_f64();
        (seconds > 0.0).then_some(seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_has_no_duration() {
        assert_eq!(LoftyProbe.probe(b"definitely not audio"), None);
        assert_eq!(LoftyProbe.probe(&[]), None);
    }

    #[test]
    fn closures_are_probes() {
        let fixed = |_: &[u8]| Some(12.5);
        assert_eq!(fixed.probe(b"anything"), Some(12.5));
    }
}
