use std::io::Write;

use pomoflow_core::error::Result;
use pomoflow_core::{Notification, Notifier};

/// Shows alerts on stderr so stdout stays machine-readable.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        let mut err = std::io::stderr().lock();
        writeln!(err, "{}  {}", notification.title, notification.body)?;
        Ok(())
    }

    fn chime(&self) -> Result<()> {
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")?;
        err.flush()?;
        Ok(())
    }
}
