use crate::process::ProcessError;

/// Keeps Ctrl-C from killing the shell itself. Foreground children share the
/// terminal's process group and still receive the interrupt.
pub fn setup_signal_handlers(quiet: bool) -> Result<(), ProcessError> {
    ctrlc::set_handler(move || {
        if !quiet {
            println!("\nUse 'exit' to exit the shell");
        }
    })
    .map_err(|e| ProcessError::SignalError(e.to_string()))
}
