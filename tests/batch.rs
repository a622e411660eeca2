use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{DynamicImage, Rgb, RgbImage};
use tempfile::TempDir;
use webp_converter_lib::{
    AppState, BatchConfig, BatchProcessor, ConversionOptions, ConverterError, ProgressType,
    ValidationError, cancel_conversion, convert_images, is_converting,
};

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
    }))
}

fn write_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    gradient(32, 24).save(&path).unwrap();
    path
}

fn write_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn is_webp(path: &Path) -> bool {
    let bytes = fs::read(path).unwrap();
    bytes.len() > 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP"
}

fn processor(workers: usize) -> BatchProcessor {
    BatchProcessor::new(BatchConfig::default().with_workers(workers))
}

#[tokio::test]
async fn one_corrupt_file_does_not_affect_the_others() {
    let dir = TempDir::new().unwrap();
    let paths = vec![
        write_image(dir.path(), "a.jpg"),
        write_image(dir.path(), "b.png"),
        write_bytes(dir.path(), "c.jpg", b"not an image at all"),
        write_image(dir.path(), "d.bmp"),
        write_image(dir.path(), "e.png"),
    ];

    let report = processor(2)
        .run(paths.clone(), &ConversionOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.results.len(), 5);

    let corrupt = report.result_for(&paths[2]).unwrap();
    assert!(corrupt.reason().unwrap().starts_with("decoding image"));
    assert!(!dir.path().join("c.webp").exists());

    for name in ["a.webp", "b.webp", "d.webp", "e.webp"] {
        assert!(is_webp(&dir.path().join(name)), "{name} is not a webp file");
    }
    assert_eq!(report.summary(), "Complete! 4/5 files converted successfully");
}

#[tokio::test]
async fn every_path_gets_exactly_one_result() {
    let dir = TempDir::new().unwrap();
    let mut paths: Vec<PathBuf> = (0..6)
        .map(|i| write_image(dir.path(), &format!("img{i}.png")))
        .collect();
    paths.push(dir.path().join("missing.png"));
    paths.push(write_bytes(dir.path(), "notes.txt", b"hello"));

    let report = processor(3)
        .run(paths.clone(), &ConversionOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.total, report.succeeded + report.failed());
    for path in &paths {
        let matching = report.results.iter().filter(|r| &r.input_path == path).count();
        assert_eq!(matching, 1, "{} reported {matching} times", path.display());
    }
    assert!(report.result_for(dir.path().join("missing.png")).unwrap().reason().unwrap().starts_with("opening file"));
    assert!(report.result_for(dir.path().join("notes.txt")).unwrap().reason().unwrap().contains("unsupported format"));
}

#[tokio::test]
async fn rerunning_a_batch_produces_identical_output() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "photo.png");
    let output = dir.path().join("photo.webp");
    let options = ConversionOptions::new(75, None);

    processor(1).run(vec![input.clone()], &options, |_| {}).await.unwrap();
    let first = fs::read(&output).unwrap();
    processor(1).run(vec![input], &options, |_| {}).await.unwrap();
    let second = fs::read(&output).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn output_directory_receives_all_outputs() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let paths = vec![write_image(source.path(), "one.jpg"), write_image(source.path(), "two.bmp")];
    let options = ConversionOptions::new(80, Some(target.path().to_path_buf()));

    let report = processor(2).run(paths, &options, |_| {}).await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert!(is_webp(&target.path().join("one.webp")));
    assert!(is_webp(&target.path().join("two.webp")));
    assert!(!source.path().join("one.webp").exists());
}

#[tokio::test]
async fn missing_output_directory_is_rejected_up_front() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "x.png");
    let options = ConversionOptions::new(80, Some(dir.path().join("nope")));

    let err = processor(1).run(vec![input], &options, |_| {}).await.unwrap_err();

    assert!(matches!(err, ConverterError::Validation(ValidationError::Path(_))));
    assert!(!dir.path().join("x.webp").exists());
}

#[tokio::test]
async fn quality_bounds_are_inclusive() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "q.png");

    for quality in [1, 100] {
        let report = processor(1)
            .run(vec![input.clone()], &ConversionOptions::new(quality, None), |_| {})
            .await
            .unwrap();
        assert_eq!(report.succeeded, 1, "quality {quality} failed");
    }
}

#[tokio::test]
async fn out_of_range_quality_touches_no_files() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "q.png");

    for quality in [0, 101] {
        let mut events = 0;
        let err = processor(1)
            .run(vec![input.clone()], &ConversionOptions::new(quality, None), |_| events += 1)
            .await
            .unwrap_err();
        assert!(matches!(err, ConverterError::Validation(ValidationError::Settings(_))));
        assert_eq!(events, 0);
    }
    assert!(!dir.path().join("q.webp").exists());
}

#[tokio::test]
async fn empty_worklist_is_rejected() {
    let err = processor(1)
        .run(Vec::<PathBuf>::new(), &ConversionOptions::default(), |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ConverterError::Validation(ValidationError::EmptyWorklist)));
}

#[tokio::test]
async fn repeated_inputs_are_each_converted() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "dup.png");

    let report = processor(2)
        .run(vec![input.clone(), input.clone()], &ConversionOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 2);
    assert!(report.results.iter().all(|r| r.input_path == input));
    assert!(is_webp(&dir.path().join("dup.webp")));
}

#[tokio::test]
async fn inputs_sharing_an_output_both_succeed() {
    let dir = TempDir::new().unwrap();
    let paths = vec![write_image(dir.path(), "same.png"), write_image(dir.path(), "same.jpg")];

    let report = processor(2)
        .run(paths, &ConversionOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.succeeded, 2);
    assert!(is_webp(&dir.path().join("same.webp")));
}

#[tokio::test]
async fn slow_item_times_out_without_affecting_siblings() {
    let dir = TempDir::new().unwrap();
    let slow = dir.path().join("slow.png");
    DynamicImage::ImageRgb8(RgbImage::from_fn(4000, 4000, |x, y| {
        let n = x.wrapping_mul(2_654_435_761) ^ y.wrapping_mul(40_503);
        Rgb([n as u8, (n >> 8) as u8, (n >> 16) as u8])
    }))
    .save(&slow)
    .unwrap();
    let fast: Vec<PathBuf> = (0..3)
        .map(|i| {
            let path = dir.path().join(format!("fast{i}.png"));
            gradient(8, 8).save(&path).unwrap();
            path
        })
        .collect();

    let mut paths = vec![slow.clone()];
    paths.extend(fast.iter().cloned());
    let config = BatchConfig::default()
        .with_workers(4)
        .with_timeout(Duration::from_millis(200));

    let report = BatchProcessor::new(config)
        .run(paths, &ConversionOptions::default(), |_| {})
        .await
        .unwrap();

    assert_eq!(report.total, 4);
    assert_eq!(report.succeeded, 3);
    let reason = report.result_for(&slow).unwrap().reason().unwrap();
    assert!(reason.starts_with("timed out"), "{reason}");
    for path in &fast {
        assert!(report.result_for(path).unwrap().is_success());
    }
}

#[tokio::test]
async fn progress_counts_up_to_the_total() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..4)
        .map(|i| write_image(dir.path(), &format!("p{i}.png")))
        .collect();

    let mut events = Vec::new();
    processor(2)
        .run(paths, &ConversionOptions::default(), |event| events.push(event))
        .await
        .unwrap();

    assert_eq!(events.first().unwrap().progress_type, ProgressType::Start);
    assert_eq!(events.last().unwrap().progress_type, ProgressType::Complete);
    let completed: Vec<usize> = events[1..events.len() - 1]
        .iter()
        .map(|e| e.completed_tasks)
        .collect();
    assert_eq!(completed, vec![1, 2, 3, 4]);
    assert!(events.iter().all(|e| e.total_tasks == 4));
}

#[tokio::test]
async fn app_state_tracks_and_cancels_batches() {
    let dir = TempDir::new().unwrap();
    let paths: Vec<PathBuf> = (0..3)
        .map(|i| write_image(dir.path(), &format!("s{i}.png")))
        .collect();
    let state = AppState::new(BatchConfig::default().with_workers(1));

    assert!(!cancel_conversion(&state));

    let watcher = state.clone();
    let report = convert_images(&state, paths, ConversionOptions::default(), move |event| {
        if event.progress_type == ProgressType::Start {
            assert!(is_converting(&watcher));
            assert!(cancel_conversion(&watcher));
        }
    })
    .await
    .unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 0);
    assert!(report.failures().all(|r| r.reason().unwrap().starts_with("cancelled")));
    assert!(!is_converting(&state));
}
