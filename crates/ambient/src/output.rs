//! Send frames to the host, as one JSON message per line on STDOUT.

use ambient_protocol::OutputMessages;
use color_eyre::eyre::Result;

/// Send output to the host
pub(crate) struct Output;

impl Output {
    /// Start a thread that writes every message from the runner to STDOUT.
    ///
    /// The thread ends when the runner closes its output, or when STDOUT goes away.
    pub fn start(
        output_rx: tokio::sync::mpsc::Receiver<OutputMessages>,
    ) -> std::thread::JoinHandle<Result<()>> {
        std::thread::spawn(move || -> Result<()> {
            let stdout = std::io::stdout();
            Self::forward(output_rx, stdout.lock())
        })
    }

    /// Write messages until the channel closes.
    fn forward<W: std::io::Write>(
        mut output_rx: tokio::sync::mpsc::Receiver<OutputMessages>,
        mut writer: W,
    ) -> Result<()> {
        while let Some(message) = output_rx.blocking_recv() {
            let json = serde_json::to_string(&message)?;
            let result = writeln!(writer, "{json}").and_then(|()| writer.flush());
            if let Err(error) = result {
                tracing::error!("Error sending json to the host: {error:?}");
                break;
            }
        }

        tracing::debug!("Output closed");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn one_message_per_line() {
        let (tx, rx) = tokio::sync::mpsc::channel(16);
        tx.blocking_send(OutputMessages::OutputDrawCalls(Vec::new()))
            .unwrap();
        tx.blocking_send(OutputMessages::OutputPixels(Vec::new()))
            .unwrap();
        drop(tx);

        let mut buffer = Vec::new();
        Output::forward(rx, &mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec![r#"{"output_draw_calls":[]}"#, r#"{"output_pixels":[]}"#]);
    }
}
