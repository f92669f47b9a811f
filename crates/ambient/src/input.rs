//! Handle input from the host, arriving as one JSON message per line on STDIN.

use ambient_protocol::InputMessages;
use color_eyre::eyre::Result;

/// Handle input from the host
pub(crate) struct Input {
    /// Where parsed messages are sent.
    inputs_tx: tokio::sync::mpsc::Sender<InputMessages>,
}

impl Input {
    /// Start a thread to listen to STDIN and forward every message to the runner.
    ///
    /// The thread ends when STDIN closes, or when the runner stops listening. Dropping the sender
    /// is what tells the runner that its input has closed.
    pub fn start(
        inputs_tx: tokio::sync::mpsc::Sender<InputMessages>,
    ) -> std::thread::JoinHandle<Result<()>> {
        // The Tokio docs actually suggest using `std::thread` to listen on STDIN for interactive
        // applications.
        std::thread::spawn(move || -> Result<()> {
            let input = Self { inputs_tx };
            let stdin = std::io::stdin();
            input.consume(stdin.lock())
        })
    }

    /// Read lines until the reader is exhausted.
    fn consume<R: std::io::BufRead>(&self, reader: R) -> Result<()> {
        tracing::debug!("Starting to listen for input");

        for line in reader.lines() {
            let line = line?;
            let Some(message) = Self::parse(&line) else {
                continue;
            };

            if self.inputs_tx.blocking_send(message).is_err() {
                tracing::debug!("Runner isn't listening anymore, leaving input loop");
                break;
            }
        }

        tracing::debug!("Input closed");
        Ok(())
    }

    /// Parse a single line. Blank lines and invalid messages are skipped.
    fn parse(line: &str) -> Option<InputMessages> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        match serde_json::from_str::<InputMessages>(trimmed) {
            Ok(message) => Some(message),
            Err(error) => {
                tracing::warn!("Skipping invalid input '{trimmed}': {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_messages_and_skips_rubbish() {
        let (tx, mut rx) = tokio::sync::mpsc::channel(16);
        let input = Input { inputs_tx: tx };
        let lines = "\
            {\"pointer_move\":{\"x\":1.0,\"y\":2.0}}\n\
            \n\
            not json\n\
            {\"resize\":{\"width\":80,\"height\":24}}\n\
            \"stop\"\n";

        input.consume(std::io::Cursor::new(lines)).unwrap();
        drop(input);

        assert_eq!(
            rx.blocking_recv(),
            Some(InputMessages::PointerMove { x: 1.0, y: 2.0 })
        );
        assert_eq!(
            rx.blocking_recv(),
            Some(InputMessages::Resize {
                width: 80,
                height: 24
            })
        );
        assert_eq!(rx.blocking_recv(), Some(InputMessages::Stop));
        assert_eq!(rx.blocking_recv(), None);
    }

    #[test]
    fn stops_when_nobody_listens() {
        let (tx, rx) = tokio::sync::mpsc::channel(1);
        drop(rx);
        let input = Input { inputs_tx: tx };
        let lines = "\"stop\"\n\"stop\"\n";
        input.consume(std::io::Cursor::new(lines)).unwrap();
    }
}
