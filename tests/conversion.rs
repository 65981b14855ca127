//! Integration tests for media-convert-client.
//!
//! Each test runs a mock conversion service (mockito) or a bare TCP listener
//! and drives the public form API end to end: select, submit, download.
//! Downloads land in a temporary directory.
//!
//! Run with:
//!   cargo test --test conversion -- --nocapture

use bytes::Bytes;
use media_convert_client::{
    ClientConfig, ConversionCategory, ConversionForms, ConversionObserver, ConversionOutcome,
    ConvertError, DirectorySink, Download, DownloadSink, ObjectUrlStore, PreviewElement,
    SelectedFile, ValidationError,
};
use mockito::{Matcher, Server};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::net::TcpListener;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Records every observer hook as a short line.
#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix("alert:").map(str::to_string))
            .collect()
    }

    fn push(&self, line: String) {
        self.0.lock().unwrap().push(line);
    }
}

impl ConversionObserver for Recorder {
    fn on_submit(&self, category: ConversionCategory, file_name: &str, _size: u64, fmt: &str) {
        self.push(format!("submit:{category}:{file_name}:{fmt}"));
    }

    fn on_response(&self, _category: ConversionCategory, outcome: &ConversionOutcome) {
        let kind = match outcome {
            ConversionOutcome::Success { .. } => "success".to_string(),
            ConversionOutcome::ServerError { http_status } => format!("server-error {http_status}"),
            ConversionOutcome::TransportError { .. } => "transport-error".to_string(),
        };
        self.push(format!("response:{kind}"));
    }

    fn on_download(&self, _category: ConversionCategory, filename: &str, size: usize) {
        self.push(format!("download:{filename}:{size}"));
    }

    fn on_failure(&self, _category: ConversionCategory, message: &str) {
        self.push(format!("alert:{message}"));
    }
}

struct Harness {
    forms: ConversionForms,
    sink: Arc<DirectorySink>,
    recorder: Arc<Recorder>,
    _out: TempDir,
}

fn harness(base_url: &str) -> Harness {
    harness_with(ClientConfig::builder().base_url(base_url))
}

fn harness_with(builder: media_convert_client::ClientConfigBuilder) -> Harness {
    init_tracing();
    let out = TempDir::new().unwrap();
    let sink = Arc::new(DirectorySink::new(out.path()));
    let recorder = Arc::new(Recorder::default());
    let config = builder.observer(recorder.clone()).build().unwrap();
    let forms = ConversionForms::new(config, sink.clone()).unwrap();
    Harness {
        forms,
        sink,
        recorder,
        _out: out,
    }
}

fn wav() -> SelectedFile {
    SelectedFile::new("song.wav", "audio/wav", Bytes::from_static(b"RIFF-fake-wave-data"))
}

fn png() -> SelectedFile {
    SelectedFile::new("photo.png", "image/png", Bytes::from_static(b"\x89PNG-fake"))
}

fn sized(name: &str, media_type: &str, size: u64) -> SelectedFile {
    SelectedFile::new(name, media_type, vec![b'x'; size as usize])
}

/// An address with nothing listening on it.
async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

// ── Success path ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn image_conversion_uses_header_filename() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/convert")
        .match_header(
            "content-type",
            Matcher::Regex("^multipart/form-data; boundary=".to_string()),
        )
        .with_status(200)
        .with_header("content-disposition", r#"attachment; filename="out.png""#)
        .with_body("PNGDATA")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Image);
    form.select(Some(png()));
    let done = form.submit("png").await.unwrap();

    mock.assert_async().await;
    assert_eq!(done.filename, "out.png");
    assert_eq!(done.size, 7);

    let saved = h.sink.saved_paths();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("out.png"));
    assert_eq!(std::fs::read(&saved[0]).unwrap(), b"PNGDATA");

    assert_eq!(
        h.recorder.events(),
        vec![
            "submit:image:photo.png:png".to_string(),
            "response:success".to_string(),
            "download:out.png:7".to_string(),
        ]
    );
    assert!(!form.is_submitting());
}

#[tokio::test]
async fn missing_header_synthesises_name_from_format() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/audio/convert")
        .with_status(200)
        .with_body("ID3")
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));
    let done = form.submit("mp3").await.unwrap();

    assert_eq!(done.filename, "converted.mp3");
    assert!(h.sink.saved_paths()[0].ends_with("converted.mp3"));
}

#[tokio::test]
async fn unquoted_header_falls_back_with_format_as_given() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/audio/convert")
        .with_status(200)
        .with_header("content-disposition", "attachment; filename=converted.mp3")
        .with_body("ID3")
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));
    let done = form.submit("MP3").await.unwrap();

    assert_eq!(done.filename, "converted.MP3");
}

#[tokio::test]
async fn request_carries_file_and_format_parts() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/video/convert")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex(r#"name="file"; filename="clip.mov""#.to_string()),
            Matcher::Regex(r#"(?i)content-type: video/quicktime"#.to_string()),
            Matcher::Regex("MOOVDATA".to_string()),
            Matcher::Regex(r#"name="format"\r\n\r\nwebm\r\n"#.to_string()),
        ]))
        .with_status(200)
        .with_body("WEBM")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Video);
    form.select(Some(SelectedFile::new(
        "clip.mov",
        "video/quicktime",
        Bytes::from_static(b"MOOVDATA"),
    )));
    form.submit("webm").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn each_category_posts_to_its_endpoint() {
    let mut server = Server::new_async().await;
    let cases = [
        (ConversionCategory::Image, "/api/convert", png(), "jpg"),
        (ConversionCategory::Audio, "/api/audio/convert", wav(), "wav"),
        (
            ConversionCategory::Video,
            "/api/video/convert",
            SelectedFile::new("a.mp4", "video/mp4", Bytes::from_static(b"ftyp")),
            "mkv",
        ),
        (
            ConversionCategory::Document,
            "/api/document/convert",
            SelectedFile::new("a.docx", "application/octet-stream", Bytes::from_static(b"PK")),
            "pdf",
        ),
    ];

    let mut mocks = Vec::new();
    for (_, path, _, _) in &cases {
        mocks.push(
            server
                .mock("POST", *path)
                .with_status(200)
                .with_body("ok")
                .expect(1)
                .create_async()
                .await,
        );
    }

    let h = harness(&server.url());
    for (category, _, file, fmt) in cases {
        let form = h.forms.form(category);
        form.select(Some(file));
        form.submit(fmt).await.unwrap();
    }

    for mock in mocks {
        mock.assert_async().await;
    }
    assert_eq!(h.sink.saved_paths().len(), 4);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_ignored() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/document/convert")
        .with_status(200)
        .with_body("%PDF")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&format!("{}/", server.url()));
    let form = h.forms.form(ConversionCategory::Document);
    form.select(Some(SelectedFile::new(
        "a.odt",
        "application/vnd.oasis.opendocument.text",
        Bytes::from_static(b"PK"),
    )));
    form.submit("pdf").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn repeated_downloads_do_not_overwrite() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/convert")
        .with_status(200)
        .with_header("content-disposition", r#"attachment; filename="out.png""#)
        .with_body("v")
        .expect(2)
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Image);
    form.select(Some(png()));
    form.submit("png").await.unwrap();
    form.submit("png").await.unwrap();

    let saved = h.sink.saved_paths();
    assert!(saved[0].ends_with("out.png"));
    assert!(saved[1].ends_with("out (1).png"));
}

// ── Local rejections ─────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let h = harness(&server.url());
    for category in ConversionCategory::ALL {
        let err = h
            .forms
            .form(category)
            .submit(category.default_format())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConvertError::Validation(ValidationError::MissingFile)
        ));
    }

    mock.assert_async().await;
    assert_eq!(
        h.recorder.alerts(),
        vec![
            "Please upload an image file.".to_string(),
            "Please upload an audio file.".to_string(),
            "Please upload a video file.".to_string(),
            "Please upload a document file.".to_string(),
        ]
    );
}

#[tokio::test]
async fn oversized_file_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/audio/convert")
        .expect(0)
        .create_async()
        .await;

    let h = harness(&server.url());
    let limit = ConversionCategory::Audio.max_size().unwrap();
    let form = h.forms.form(ConversionCategory::Audio);
    form.select(Some(sized("big.wav", "audio/wav", limit + 1)));

    let err = form.submit("mp3").await.unwrap_err();
    assert!(matches!(
        err,
        ConvertError::Validation(ValidationError::FileTooLarge { .. })
    ));
    mock.assert_async().await;
    assert_eq!(
        h.recorder.alerts(),
        vec!["File size exceeds the limit of 50 MB.".to_string()]
    );
    assert!(h.sink.saved_paths().is_empty());
}

#[tokio::test]
async fn file_at_ceiling_is_sent() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/document/convert")
        .with_status(200)
        .with_body("%PDF")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url());
    let limit = ConversionCategory::Document.max_size().unwrap();
    let form = h.forms.form(ConversionCategory::Document);
    form.select(Some(sized("exact.docx", "application/octet-stream", limit)));

    form.submit("pdf").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn unoffered_format_sends_nothing_unless_check_disabled() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/audio/convert")
        .match_body(Matcher::Regex(r#"name="format"\r\n\r\nflac\r\n"#.to_string()))
        .with_status(200)
        .with_body("fLaC")
        .expect(1)
        .create_async()
        .await;

    let strict = harness(&server.url());
    let form = strict.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));
    assert!(matches!(
        form.submit("flac").await.unwrap_err(),
        ConvertError::UnsupportedFormat { .. }
    ));

    let lenient = harness_with(
        ClientConfig::builder()
            .base_url(server.url())
            .enforce_offered_formats(false),
    );
    let form = lenient.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));
    let done = form.submit("flac").await.unwrap();
    assert_eq!(done.filename, "converted.flac");

    mock.assert_async().await;
}

// ── Remote failures ──────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_downloads_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/video/convert")
        .with_status(500)
        .with_body("ffmpeg exploded")
        .expect(1)
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Video);
    form.select(Some(SelectedFile::new("a.mp4", "video/mp4", Bytes::from_static(b"ftyp"))));

    let err = form.submit("avi").await.unwrap_err();
    mock.assert_async().await;
    assert!(matches!(err, ConvertError::ServerError { status: 500 }));
    assert!(!err.is_local());
    assert!(h.sink.saved_paths().is_empty());
    assert_eq!(
        h.recorder.events(),
        vec![
            "submit:video:a.mp4:avi".to_string(),
            "response:server-error 500".to_string(),
            "alert:Error converting the video. Server responded with an error.".to_string(),
        ]
    );
    assert_eq!(h.forms.url_store().active_count(), 1);
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let h = harness(&closed_port_url().await);
    let form = h.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));

    let err = form.submit("mp3").await.unwrap_err();
    assert!(matches!(err, ConvertError::TransportError { .. }));
    assert_eq!(
        h.recorder.alerts(),
        vec!["An error occurred while converting the audio.".to_string()]
    );
    assert!(h.sink.saved_paths().is_empty());
}

#[tokio::test]
async fn configured_timeout_is_transport_error() {
    // Accepts the connection and never answers.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hold = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(10)).await;
        drop(socket);
    });

    let h = harness_with(
        ClientConfig::builder()
            .base_url(format!("http://{addr}"))
            .request_timeout_secs(1),
    );
    let form = h.forms.form(ConversionCategory::Image);
    form.select(Some(png()));

    let err = form.submit("webp").await.unwrap_err();
    match err {
        ConvertError::TransportError { cause } => assert!(cause.contains("timed out"), "{cause}"),
        other => panic!("expected transport error, got {other:?}"),
    }
    hold.abort();
}

// ── Concurrency ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_submit_while_pending_is_rejected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (release, released) = tokio::sync::oneshot::channel::<()>();
    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let _ = released.await;
        drop(socket);
    });

    let h = harness(&format!("http://{addr}"));
    let form = h.forms.form(ConversionCategory::Audio);
    form.select(Some(wav()));

    let first = form.submit("mp3");
    let second = async {
        while !form.is_submitting() {
            tokio::task::yield_now().await;
        }
        let rejected = form.submit("wav").await;
        let _ = release.send(());
        rejected
    };
    let (first, second) = tokio::join!(first, second);

    assert!(matches!(
        second.unwrap_err(),
        ConvertError::SubmissionInFlight {
            category: ConversionCategory::Audio
        }
    ));
    // The held connection is closed without a response.
    assert!(matches!(first.unwrap_err(), ConvertError::TransportError { .. }));
    assert!(!form.is_submitting());
    assert_eq!(
        h.recorder.alerts()[0],
        "The audio conversion is still running. Please wait for it to finish."
    );
}

// ── Preview & transient URLs ─────────────────────────────────────────────────

#[tokio::test]
async fn previews_follow_category_rules() {
    let h = harness(&closed_port_url().await);

    let state = h.forms.form(ConversionCategory::Image).select(Some(png()));
    assert_eq!(state.element, Some(PreviewElement::Image));
    assert!(state
        .source
        .as_deref()
        .unwrap()
        .starts_with("data:image/png;base64,"));

    let state = h.forms.form(ConversionCategory::Audio).select(Some(wav()));
    assert_eq!(state.element, Some(PreviewElement::Audio));
    let audio_url = state.source.unwrap();
    let stored = h.forms.url_store().resolve(&audio_url).unwrap();
    assert_eq!(stored.media_type, "audio/wav");

    let state = h.forms.form(ConversionCategory::Document).select(Some(SelectedFile::new(
        "notes.docx",
        "application/octet-stream",
        Bytes::from_static(b"PK"),
    )));
    assert!(state.shows_no_preview());

    let state = h.forms.form(ConversionCategory::Document).select(Some(SelectedFile::new(
        "REPORT.PDF",
        "application/pdf",
        Bytes::from_static(b"%PDF"),
    )));
    assert_eq!(state.element, Some(PreviewElement::Frame));

    // audio + document each hold one URL; the image preview holds none.
    assert_eq!(h.forms.url_store().active_count(), 2);
}

#[tokio::test]
async fn reselecting_releases_previous_preview_url() {
    let h = harness(&closed_port_url().await);
    let form = h.forms.form(ConversionCategory::Video);

    let mut previous = None;
    for i in 0..5 {
        let state = form.select(Some(SelectedFile::new(
            format!("clip{i}.mp4"),
            "video/mp4",
            Bytes::from_static(b"ftyp"),
        )));
        let url = state.source.unwrap();
        if let Some(old) = previous.replace(url) {
            assert!(h.forms.url_store().resolve(&old).is_none());
        }
        assert_eq!(h.forms.url_store().active_count(), 1);
    }

    form.select(None);
    assert_eq!(h.forms.url_store().active_count(), 0);
}

#[tokio::test]
async fn download_url_is_released_after_save() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/convert")
        .with_status(200)
        .with_body("JPEG")
        .create_async()
        .await;

    let h = harness(&server.url());
    let form = h.forms.form(ConversionCategory::Image);
    form.select(Some(png()));
    form.submit("jpeg").await.unwrap();

    // Image previews use a data URL, so only the download could have left one.
    assert_eq!(h.forms.url_store().active_count(), 0);
    assert!(h.sink.saved_paths()[0].ends_with("converted.jpeg"));
}

/// Records the media type each download URL resolves to while it is saved.
#[derive(Default)]
struct MediaTypeSink {
    store: Mutex<Option<ObjectUrlStore>>,
    seen: Mutex<Vec<(String, Option<String>)>>,
}

impl DownloadSink for MediaTypeSink {
    fn save(&self, d: &Download<'_>) -> std::io::Result<()> {
        let media_type = self
            .store
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|s| s.resolve(d.url))
            .map(|obj| obj.media_type);
        self.seen
            .lock()
            .unwrap()
            .push((d.filename.to_string(), media_type));
        Ok(())
    }
}

#[tokio::test]
async fn download_is_registered_with_target_media_type() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/video/convert")
        .with_status(200)
        .with_body("MKV")
        .create_async()
        .await;

    let sink = Arc::new(MediaTypeSink::default());
    let config = ClientConfig::builder().base_url(server.url()).build().unwrap();
    let forms = ConversionForms::new(config, sink.clone()).unwrap();
    *sink.store.lock().unwrap() = Some(forms.url_store().clone());

    let form = forms.form(ConversionCategory::Video);
    form.select(Some(SelectedFile::new("a.mp4", "video/mp4", Bytes::from_static(b"ftyp"))));
    form.submit("MKV").await.unwrap();

    assert_eq!(
        *sink.seen.lock().unwrap(),
        vec![(
            "converted.MKV".to_string(),
            Some("video/x-matroska".to_string())
        )]
    );
}
