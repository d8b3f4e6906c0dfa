use std::f64::consts::PI;

use brainwave_daemon::api::{
    handle_analyze, MSG_FREQUENCY_ANALYSIS_FAILED, MSG_LOAD_FAILED, MSG_MISSING_HEADER,
    MSG_NOISE_REMOVAL_FAILED,
};
use brainwave_daemon::{analyze, DaemonConfig, UploadedFile};
use eeg_types::AnalysisError;
use pipeline::SampleLoader;

fn sine_bytes(freq: f64, rate: u32, secs: usize, amplitude: f64) -> Vec<u8> {
    (0..rate as usize * secs)
        .map(|i| (amplitude * (2.0 * PI * freq * i as f64 / rate as f64).sin()) as i16)
        .flat_map(|v| v.to_le_bytes())
        .collect()
}

fn header(interval_us: u32) -> Vec<u8> {
    format!(
        "Brain Vision Data Exchange Header File Version 1.0\n\
         [Common Infos]\n\
         DataFile=rec.eeg\n\
         NumberOfChannels=1\n\
         SamplingInterval={}\n",
        interval_us
    )
    .into_bytes()
}

#[test]
fn test_alpha_recording() {
    let bytes = sine_bytes(10.0, 512, 4, 1000.0);
    let report = analyze(&bytes, "", 512).unwrap();

    assert_eq!(report.sampling_rate, 512);
    assert_eq!(report.dominant_band, "Alpha");
    assert_eq!(report.quality.artifacts_removed, 0);
    assert_eq!(report.band_powers.len(), 5);
    assert!(report.band_powers.iter().all(|(_, p)| p.power >= 0.0));
}

#[test]
fn test_header_sets_sampling_rate() {
    let bytes = sine_bytes(6.0, 250, 4, 1000.0);
    let text = String::from_utf8(header(4000)).unwrap();
    let report = analyze(&bytes, &text, 512).unwrap();
    assert_eq!(report.sampling_rate, 250);
    assert_eq!(report.dominant_band, "Theta");
}

#[test]
fn test_tiny_inputs() {
    assert_eq!(analyze(&[9], "", 512).unwrap_err(), AnalysisError::EmptySpectrum);
    assert_eq!(analyze(&[], "", 512).unwrap_err(), AnalysisError::EmptySpectrum);

    // Five bytes decode to two samples; their only bins sit at 0 Hz and
    // Nyquist, outside every band.
    let bytes = [1, 0, 2, 0, 9];
    assert_eq!(SampleLoader::new().decode(&bytes).unwrap(), vec![1.0, 2.0]);
    let report = analyze(&bytes, "", 512).unwrap();
    assert_eq!(report.sampling_rate, 512);
    assert_eq!(report.dominant_band, "Delta");
    assert_eq!(report.band_powers.len(), 5);
    assert_eq!(report.band_powers.total_power(), 0.0);
}

#[test]
fn test_constant_recording_is_degenerate() {
    let bytes: Vec<u8> = std::iter::repeat(100i16.to_le_bytes()).take(2048).flatten().collect();
    let err = analyze(&bytes, "", 512).unwrap_err();
    assert!(matches!(err, AnalysisError::DegenerateSignal { .. }));
}

#[test]
fn test_upload_round_trip() {
    let staging = tempfile::tempdir().unwrap();
    let config = DaemonConfig {
        staging_dir: Some(staging.path().to_path_buf()),
        ..DaemonConfig::default()
    };
    let files = vec![
        UploadedFile::new("session 1.vhdr", header(1953)),
        UploadedFile::new("session 1.eeg", sine_bytes(10.0, 512, 4, 1000.0)),
    ];

    let response = handle_analyze(&config, &files, None);
    assert!(response.success, "{:?}", response.error);
    assert_eq!(response.dominant_band, Some("Alpha"));
    assert_eq!(response.filename.as_deref(), Some("brain_wave_art_session_1.png"));
    assert_eq!(response.subject_label.as_deref(), Some("Brain Wave Art"));
    assert!(response.caption.as_deref().unwrap().contains("Alpha: "));
    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);

    let json = serde_json::to_string(&response).unwrap();
    let delta = json.find("\"Delta\"").unwrap();
    let gamma = json.find("\"Gamma\"").unwrap();
    assert!(delta < gamma);
    assert!(json.contains("\"range\":\"8-13 Hz\""));
}

#[test]
fn test_upload_failures_use_fixed_messages() {
    let staging = tempfile::tempdir().unwrap();
    let config = DaemonConfig {
        staging_dir: Some(staging.path().to_path_buf()),
        max_upload_bytes: 1024,
        ..DaemonConfig::default()
    };

    let only_data = vec![UploadedFile::new("rec.eeg", vec![0; 8])];
    let response = handle_analyze(&config, &only_data, None);
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some(MSG_MISSING_HEADER));

    let oversized = vec![
        UploadedFile::new("rec.eeg", vec![0; 2048]),
        UploadedFile::new("rec.vhdr", header(2000)),
    ];
    let response = handle_analyze(&config, &oversized, None);
    assert_eq!(response.error.as_deref(), Some(MSG_LOAD_FAILED));

    let flat = vec![
        UploadedFile::new("rec.eeg", vec![0; 1000]),
        UploadedFile::new("rec.vhdr", header(2000)),
    ];
    let response = handle_analyze(&config, &flat, None);
    assert_eq!(response.error.as_deref(), Some(MSG_NOISE_REMOVAL_FAILED));

    let empty = vec![
        UploadedFile::new("rec.eeg", Vec::new()),
        UploadedFile::new("rec.vhdr", header(2000)),
    ];
    let response = handle_analyze(&config, &empty, None);
    assert_eq!(response.error.as_deref(), Some(MSG_FREQUENCY_ANALYSIS_FAILED));
    assert!(response.band_powers.is_none());

    assert_eq!(std::fs::read_dir(staging.path()).unwrap().count(), 0);
}
