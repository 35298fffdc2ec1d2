use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;

/// Drains a child process stream line-by-line into the log.
///
/// Subprocess pipes must be consumed; a chatty child with a full pipe buffer
/// blocks on write and never exits.
pub fn drain_lines<R>(stream: R, label: &'static str) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(stream = label, "{}", line);
        }
    })
}
