//! Multipart upload bodies with byte-level progress reporting.

use reqwest::multipart::Part;
use reqwest::Body;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::ReaderStream;

use super::error::ApiError;

/// Callback fed the upload percentage (0-100) as body bytes go out.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Determine MIME type from extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("wav") => "audio/wav",
        Some("mp3") => "audio/mpeg",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Build a streamed multipart file part that reports progress as it is read.
pub async fn streamed_file_part(
    path: &Path,
    progress: Option<ProgressFn>,
) -> Result<Part, ApiError> {
    let metadata = tokio::fs::metadata(path).await?;
    let total = metadata.len();

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("recording")
        .to_string();

    let file = tokio::fs::File::open(path).await?;
    let reader = ProgressReader::new(file, total, progress);
    let body = Body::wrap_stream(ReaderStream::new(reader));

    let part = Part::stream_with_length(body, total)
        .file_name(filename)
        .mime_str(mime_for_path(path))?;

    Ok(part)
}

/// `AsyncRead` wrapper that counts bytes and invokes the progress callback
/// whenever the integer percentage advances.
struct ProgressReader<R> {
    inner: R,
    sent: u64,
    total: u64,
    last_pct: u8,
    progress: Option<ProgressFn>,
}

impl<R> ProgressReader<R> {
    fn new(inner: R, total: u64, progress: Option<ProgressFn>) -> Self {
        Self {
            inner,
            sent: 0,
            total,
            last_pct: 0,
            progress,
        }
    }

    fn report(&mut self) {
        let pct = if self.total == 0 {
            100
        } else {
            ((self.sent * 100) / self.total).min(100) as u8
        };
        if pct != self.last_pct {
            self.last_pct = pct;
            if let Some(progress) = &self.progress {
                progress(pct);
            }
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                this.sent += (buf.filled().len() - before) as u64;
                this.report();
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncReadExt;

    #[test]
    fn test_mime_for_known_extensions() {
        assert_eq!(mime_for_path(Path::new("call.mp3")), "audio/mpeg");
        assert_eq!(mime_for_path(Path::new("standup.mov")), "video/quicktime");
        assert_eq!(
            mime_for_path(Path::new("mystery.bin")),
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_progress_reader_reports_monotonic_percentages() {
        let data = vec![0u8; 1000];
        let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Arc::new(move |pct| sink.lock().unwrap().push(pct));

        let mut reader = ProgressReader::new(&data[..], 1000, Some(progress));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen.last().unwrap(), 100);
        assert!(seen.windows(2).all(|w| w[0] < w[1]), "percentages must advance");
    }

    #[tokio::test]
    async fn test_progress_reader_empty_file_jumps_to_100() {
        let data: Vec<u8> = Vec::new();
        let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let progress: ProgressFn = Arc::new(move |pct| sink.lock().unwrap().push(pct));

        let mut reader = ProgressReader::new(&data[..], 0, Some(progress));
        let mut out = Vec::new();
        reader.read_to_end(&mut out).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![100]);
    }
}
