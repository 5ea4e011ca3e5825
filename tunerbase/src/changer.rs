//! External channel changer (cable box, IR blaster, serial control).
//!
//! When an input declares an external changer, the capture hardware stays
//! parked on the input's `tune_to_channel` and channel changes are sent
//! out-of-band through a [`ChangerTransport`].

use std::process::Command;

use log::{debug, warn};
use tunerbase_types::{ChangerError, ChangerRef, InputRecord, TuningError};

/// Send primitive keyed by a changer reference.
pub trait ChangerTransport {
    /// Ask the changer to switch to `channum`. One attempt, no retry.
    fn send(&mut self, changer: &ChangerRef, channum: &str) -> Result<(), ChangerError>;
}

impl<T: ChangerTransport + ?Sized> ChangerTransport for Box<T> {
    fn send(&mut self, changer: &ChangerRef, channum: &str) -> Result<(), ChangerError> {
        (**self).send(changer, channum)
    }
}

/// Runs the changer reference as a command line with the channel number
/// appended as the final argument. A zero exit status means success.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandTransport;

impl ChangerTransport for CommandTransport {
    fn send(&mut self, changer: &ChangerRef, channum: &str) -> Result<(), ChangerError> {
        let mut parts = changer.as_str().split_whitespace();
        let program = parts.next().ok_or_else(|| ChangerError::Unreachable {
            changer: changer.to_string(),
            reason: "empty changer command".to_string(),
        })?;

        debug!("Running external changer: {} {}", changer, channum);
        let status = Command::new(program)
            .args(parts)
            .arg(channum)
            .status()
            .map_err(|e| ChangerError::Unreachable {
                changer: changer.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ChangerError::Rejected {
                changer: changer.to_string(),
                channum: channum.to_string(),
                status: status.code(),
            })
        }
    }
}

/// Drives an input's external changer through a transport.
pub struct ExternalChangerBridge {
    transport: Box<dyn ChangerTransport + Send>,
}

impl ExternalChangerBridge {
    pub fn new<T>(transport: T) -> Self
    where
        T: ChangerTransport + Send + 'static,
    {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Send one change request for `input`.
    ///
    /// Fails with [`TuningError::Unsupported`] if the input has no changer
    /// and with [`TuningError::ChangerUnresponsive`] if the transport fails.
    pub fn change_channel(&mut self, input: &InputRecord, channum: &str) -> Result<(), TuningError> {
        let changer = input
            .external_changer
            .as_ref()
            .ok_or(TuningError::Unsupported("input has no external channel changer"))?;

        self.transport.send(changer, channum).map_err(|e| {
            warn!("External changer for input '{}' failed: {}", input.name, e);
            TuningError::from(e)
        })
    }
}

impl Default for ExternalChangerBridge {
    fn default() -> Self {
        Self::new(CommandTransport)
    }
}

impl std::fmt::Debug for ExternalChangerBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalChangerBridge").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingTransport {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl ChangerTransport for RecordingTransport {
        fn send(&mut self, changer: &ChangerRef, channum: &str) -> Result<(), ChangerError> {
            self.sent
                .lock()
                .unwrap()
                .push((changer.to_string(), channum.to_string()));
            if self.fail {
                Err(ChangerError::Busy(changer.to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn changer_input() -> InputRecord {
        InputRecord::new(1, "Composite1", 1, 1)
            .with_external_changer(ChangerRef::new("/usr/local/bin/irsend"), "3")
    }

    #[test]
    fn test_change_channel_sends_once() {
        let transport = RecordingTransport::default();
        let sent = Arc::clone(&transport.sent);
        let mut bridge = ExternalChangerBridge::new(transport);

        bridge.change_channel(&changer_input(), "612").unwrap();
        assert_eq!(
            *sent.lock().unwrap(),
            vec![("/usr/local/bin/irsend".to_string(), "612".to_string())]
        );
    }

    #[test]
    fn test_failure_is_reported_without_retry() {
        let transport = RecordingTransport {
            fail: true,
            ..Default::default()
        };
        let sent = Arc::clone(&transport.sent);
        let mut bridge = ExternalChangerBridge::new(transport);

        let err = bridge.change_channel(&changer_input(), "612").unwrap_err();
        assert!(matches!(err, TuningError::ChangerUnresponsive(_)));
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_input_without_changer() {
        let mut bridge = ExternalChangerBridge::new(RecordingTransport::default());
        let input = InputRecord::new(1, "Tuner", 1, 1);
        assert!(matches!(
            bridge.change_channel(&input, "2"),
            Err(TuningError::Unsupported(_))
        ));
    }

    #[test]
    fn test_empty_command_is_unreachable() {
        let err = CommandTransport.send(&ChangerRef::new("   "), "5").unwrap_err();
        assert!(matches!(err, ChangerError::Unreachable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exit_status() {
        assert!(CommandTransport.send(&ChangerRef::new("true"), "5").is_ok());

        let err = CommandTransport.send(&ChangerRef::new("false"), "5").unwrap_err();
        assert_eq!(
            err,
            ChangerError::Rejected {
                changer: "false".to_string(),
                channum: "5".to_string(),
                status: Some(1),
            }
        );
    }
}
