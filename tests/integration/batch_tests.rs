//! End-to-end batch tests.
//!
//! These tests run the batch service against a recording mock translator and
//! verify:
//! - Tiled batches send one call per sheet and recover every image exactly
//! - Single-image calls pad to a square canvas and restore the original size
//! - Archive entries, names and order
//! - Any failure aborts the batch
//! - Calls are spaced by the minimum interval

use std::time::Duration;

use sheetpack::batch::{BatchOptions, BatchService, InputImage, TilingMode};
use sheetpack::error::{BatchError, ImageError, PackError, ServiceError};
use sheetpack::sheet::SheetStyle;
use sheetpack::translate::{AspectRatio, ImageSize};

use super::test_utils::{
    decode_png, gradient_image, jpeg_bytes, png_bytes, read_zip, MockBehavior,
    RecordingTranslator,
};

/// 200x200 sheets with two 98px columns.
fn small_options(tiling: TilingMode) -> BatchOptions {
    BatchOptions {
        image_size: ImageSize::OneK,
        sheet_width: 200,
        sheet_height: 200,
        columns: 2,
        column_gap: 4,
        tiling,
        style: SheetStyle::default(),
        min_interval: Duration::from_millis(1),
    }
}

fn four_pages() -> Vec<InputImage> {
    [(60, 50), (80, 120), (40, 40), (90, 70)]
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| {
            let image = gradient_image(w, h, i as u8);
            InputImage::new(format!("page{}.png", i + 1), png_bytes(&image))
        })
        .collect()
}

// =============================================================================
// Tiled Path
// =============================================================================

#[tokio::test]
async fn test_tiled_batch_uses_one_call_per_sheet() {
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let output = service.run(four_pages()).await.unwrap();

    assert_eq!(output.sheet_count, 1);
    assert_eq!(output.translate_calls, 1);

    let calls = translator.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].dimensions, (200, 200));
    assert_eq!(calls[0].size, ImageSize::OneK);
    assert_eq!(calls[0].aspect_ratio, Some(AspectRatio::SQUARE));
}

#[tokio::test]
async fn test_tiled_echo_recovers_every_image_exactly() {
    let inputs = four_pages();
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator, small_options(TilingMode::Always));

    let output = service.run(inputs.clone()).await.unwrap();
    let archive = read_zip(&output.archive);

    assert_eq!(
        archive.names(),
        vec![
            "page1.png",
            "page1-(translate).png",
            "page2.png",
            "page2-(translate).png",
            "page3.png",
            "page3-(translate).png",
            "page4.png",
            "page4-(translate).png",
        ]
    );
    assert_eq!(output.entry_names, archive.names());

    for input in &inputs {
        let original = archive.entry(&input.name).unwrap();
        assert_eq!(original.data, input.bytes.to_vec(), "original stored verbatim");

        let translated_name = input.name.replace(".png", "-(translate).png");
        let translated = decode_png(&archive.entry(&translated_name).unwrap().data);
        assert_eq!(translated, decode_png(&input.bytes), "{}", input.name);
    }
}

#[tokio::test]
async fn test_tiled_results_follow_the_service() {
    let inputs = four_pages();
    let translator = RecordingTranslator::new(MockBehavior::Invert);
    let service = BatchService::new(translator, small_options(TilingMode::Auto));

    let output = service.run(inputs.clone()).await.unwrap();
    let archive = read_zip(&output.archive);

    for input in &inputs {
        let mut expected = decode_png(&input.bytes);
        image::imageops::invert(&mut expected);

        let translated_name = input.name.replace(".png", "-(translate).png");
        let translated = decode_png(&archive.entry(&translated_name).unwrap().data);
        assert_eq!(translated, expected, "{}", input.name);
    }
}

#[tokio::test]
async fn test_tiled_results_keep_original_size() {
    // 300px wide is scaled down to the 98px column, then back up
    let inputs = vec![
        InputImage::new("wide.png", png_bytes(&gradient_image(300, 100, 1))),
        InputImage::new("small.png", png_bytes(&gradient_image(30, 20, 2))),
    ];
    let translator = RecordingTranslator::new(MockBehavior::HalfSize);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let output = service.run(inputs).await.unwrap();
    let archive = read_zip(&output.archive);

    let wide = decode_png(&archive.entry("wide-(translate).png").unwrap().data);
    assert_eq!(wide.dimensions(), (300, 100));
    let small = decode_png(&archive.entry("small-(translate).png").unwrap().data);
    assert_eq!(small.dimensions(), (30, 20));
    assert_eq!(translator.call_count().await, 1);
}

#[tokio::test]
async fn test_tiled_batch_spills_onto_more_sheets() {
    // Each 98x150 image fills a column, so two fit per sheet
    let inputs: Vec<InputImage> = (0..5)
        .map(|i| InputImage::new(format!("tall{i}.png"), png_bytes(&gradient_image(98, 150, i))))
        .collect();
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let output = service.run(inputs).await.unwrap();

    assert_eq!(output.sheet_count, 3);
    assert_eq!(translator.call_count().await, 3);
    assert_eq!(read_zip(&output.archive).entries.len(), 10);
}

// =============================================================================
// Single Path
// =============================================================================

#[tokio::test]
async fn test_single_path_pads_to_square_canvas() {
    let inputs = four_pages();
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Never));

    let output = service.run(inputs.clone()).await.unwrap();

    assert_eq!(output.sheet_count, 0);
    assert_eq!(output.translate_calls, 4);

    let calls = translator.calls().await;
    assert_eq!(calls.len(), 4);
    for call in &calls {
        assert_eq!(call.dimensions, (1024, 1024));
        assert_eq!(call.aspect_ratio, Some(AspectRatio::SQUARE));
    }

    let archive = read_zip(&output.archive);
    for input in &inputs {
        let translated_name = input.name.replace(".png", "-(translate).png");
        let translated = decode_png(&archive.entry(&translated_name).unwrap().data);
        assert_eq!(translated, decode_png(&input.bytes));
    }
}

#[tokio::test]
async fn test_auto_mode_sends_lone_image_alone() {
    let inputs = vec![InputImage::new(
        "only.png",
        png_bytes(&gradient_image(64, 48, 0)),
    )];
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let output = service.run(inputs).await.unwrap();

    assert_eq!(output.sheet_count, 0);
    assert_eq!(translator.calls().await[0].dimensions, (1024, 1024));
}

#[tokio::test]
async fn test_always_mode_tiles_lone_image() {
    let inputs = vec![InputImage::new(
        "only.png",
        png_bytes(&gradient_image(64, 48, 0)),
    )];
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Always));

    let output = service.run(inputs).await.unwrap();

    assert_eq!(output.sheet_count, 1);
    assert_eq!(translator.calls().await[0].dimensions, (200, 200));
}

// =============================================================================
// Naming
// =============================================================================

#[tokio::test]
async fn test_jpeg_input_kept_and_translation_is_png() {
    let jpeg = jpeg_bytes(50, 40);
    let inputs = vec![
        InputImage::new("photo.jpg", jpeg.clone()),
        InputImage::new("page.png", png_bytes(&gradient_image(30, 30, 3))),
    ];
    let service = BatchService::new(
        RecordingTranslator::new(MockBehavior::Echo),
        small_options(TilingMode::Auto),
    );

    let output = service.run(inputs).await.unwrap();
    let archive = read_zip(&output.archive);

    assert_eq!(archive.entry("photo.jpg").unwrap().data, jpeg);
    let translated = decode_png(&archive.entry("photo-(translate).png").unwrap().data);
    assert_eq!(translated.dimensions(), (50, 40));
}

#[tokio::test]
async fn test_colliding_names_are_made_unique() {
    let png = png_bytes(&gradient_image(20, 20, 0));
    let inputs = vec![
        InputImage::new("scan.png", png.clone()),
        InputImage::new("scan.png", png.clone()),
        InputImage::new("scan.jpg", png),
    ];
    let service = BatchService::new(
        RecordingTranslator::new(MockBehavior::Echo),
        small_options(TilingMode::Auto),
    );

    let output = service.run(inputs).await.unwrap();

    assert_eq!(
        output.entry_names,
        vec![
            "scan.png",
            "scan-(translate).png",
            "scan-1.png",
            "scan-(translate)-1.png",
            "scan.jpg",
            "scan-(translate)-2.png",
        ]
    );
    assert_eq!(read_zip(&output.archive).names(), output.entry_names);
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn test_empty_batch() {
    let service = BatchService::new(
        RecordingTranslator::new(MockBehavior::Echo),
        small_options(TilingMode::Auto),
    );

    assert!(matches!(service.run(Vec::new()).await, Err(BatchError::EmptyBatch)));
}

#[tokio::test]
async fn test_service_failure_aborts_batch() {
    let translator = RecordingTranslator::new(MockBehavior::FailOn(1));
    let service = BatchService::new(translator, small_options(TilingMode::Never));

    let result = service.run(four_pages()).await;

    match result {
        Err(BatchError::Service(ServiceError::Status { status, .. })) => assert_eq!(status, 503),
        other => panic!("Expected service error, got {:?}", other.map(|o| o.entry_names)),
    }
}

#[tokio::test]
async fn test_undecodable_answer_aborts_batch() {
    let service = BatchService::new(
        RecordingTranslator::new(MockBehavior::Garbage),
        small_options(TilingMode::Auto),
    );

    let result = service.run(four_pages()).await;
    assert!(matches!(
        result,
        Err(BatchError::Image(ImageError::Decode { .. }))
    ));
}

#[tokio::test]
async fn test_undecodable_input_makes_no_calls() {
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let mut inputs = four_pages();
    inputs.push(InputImage::new("broken.png", b"not an image".to_vec()));

    let result = service.run(inputs).await;

    match result {
        Err(BatchError::Image(ImageError::Decode { name, .. })) => assert_eq!(name, "broken.png"),
        other => panic!("Expected decode error, got {:?}", other.map(|o| o.entry_names)),
    }
    assert_eq!(translator.call_count().await, 0);
}

#[tokio::test]
async fn test_image_taller_than_sheet_is_rejected() {
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let service = BatchService::new(translator.clone(), small_options(TilingMode::Auto));

    let inputs = vec![
        InputImage::new("ok.png", png_bytes(&gradient_image(20, 20, 0))),
        InputImage::new("strip.png", png_bytes(&gradient_image(10, 500, 1))),
    ];

    let result = service.run(inputs).await;
    assert!(matches!(
        result,
        Err(BatchError::Pack(PackError::TileTooLarge { .. }))
    ));
    assert_eq!(translator.call_count().await, 0);
}

// =============================================================================
// Rate Limiting
// =============================================================================

#[tokio::test]
async fn test_calls_are_spaced_by_min_interval() {
    let interval = Duration::from_millis(60);
    let translator = RecordingTranslator::new(MockBehavior::Echo);
    let options = BatchOptions {
        min_interval: interval,
        ..small_options(TilingMode::Never)
    };
    let service = BatchService::new(translator.clone(), options);

    service.run(four_pages()).await.unwrap();

    let mut starts: Vec<_> = translator.calls().await.iter().map(|c| c.at).collect();
    starts.sort();
    assert_eq!(starts.len(), 4);

    // The mock timestamps a moment after the gate, so allow a little slack
    for pair in starts.windows(2) {
        assert!(
            pair[1] - pair[0] >= interval - Duration::from_millis(10),
            "calls only {:?} apart",
            pair[1] - pair[0]
        );
    }
}
