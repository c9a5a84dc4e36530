//! Upload pipeline integration tests.
//!
//! Run with: `cargo test -p tricks-processing --test upload_test`

mod helpers;

use helpers::{crop_json, params, TestMedia, TARGET_KEY};
use image::{GenericImageView, ImageFormat};
use tricks_core::{AppError, CropFailurePolicy};
use tricks_processing::StoredImageName;
use tricks_storage::MediaStore;

fn assert_stored_name(name: &str, label: &str, width: u32, height: u32, extension: &str) {
    let (stem, ext) = name.rsplit_once('.').expect("name has an extension");
    assert_eq!(ext, extension);

    let parsed = StoredImageName::parse_stem(stem).expect("stem follows label-hash-WxH");
    assert_eq!(parsed.label, label);
    assert_eq!(parsed.hash.len(), 8);
    assert!(parsed.hash.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!((parsed.width, parsed.height), (width, height));
}

#[test]
fn test_jpeg_crop_and_resize_scenario() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let file = media.upload_file("phpJ1.tmp", 400, 300, ImageFormat::Jpeg);

    let stored = media
        .uploader
        .upload(
            &file,
            TARGET_KEY,
            &params("kickflip", crop_json(10, 10, 200, 150), "jpg", 100, 75),
        )
        .unwrap()
        .expect("upload stored a file");

    let files = media.stored_files();
    assert_eq!(files.len(), 1);
    assert_stored_name(&files[0], "kickflip", 100, 75, "jpg");
    assert_eq!(files[0], stored.to_string());
    assert_eq!(format!("{}.jpg", stored.stem()), files[0]);

    let decoded = image::open(media.media_dir().join(&files[0])).unwrap();
    assert_eq!(decoded.dimensions(), (100, 75));
}

#[test]
fn test_output_dimensions_match_name_for_various_targets() {
    let cases = [
        ((0, 0, 400, 300), (400, 300)),
        ((10, 10, 200, 150), (100, 75)),
        ((0, 0, 1, 1), (64, 64)),
        ((100, 50, 300, 250), (31, 17)),
        ((399, 299, 1, 1), (1, 1)),
    ];

    for (i, ((x, y, w, h), (tw, th))) in cases.into_iter().enumerate() {
        let media = TestMedia::new(CropFailurePolicy::Cleanup);
        let file = media.upload_file(&format!("php{}.tmp", i), 400, 300, ImageFormat::Png);

        let stored = media
            .uploader
            .upload(&file, TARGET_KEY, &params("grab", crop_json(x, y, w, h), "png", tw, th))
            .unwrap()
            .unwrap();

        let files = media.stored_files();
        assert_eq!(files, vec![stored.to_string()], "case {}", i);
        assert_stored_name(&files[0], "grab", tw, th, "png");

        let decoded = image::open(media.media_dir().join(&files[0])).unwrap();
        assert_eq!(decoded.dimensions(), (tw, th), "case {}", i);
    }
}

#[test]
fn test_identical_uploads_never_collide() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let mut names = Vec::new();

    for i in 0..5 {
        let file = media.upload_file(&format!("php{}.tmp", i), 120, 80, ImageFormat::Jpeg);
        let stored = media
            .uploader
            .upload(
                &file,
                TARGET_KEY,
                &params("ollie", crop_json(0, 0, 120, 80), "jpg", 60, 40),
            )
            .unwrap()
            .unwrap();
        names.push(stored.to_string());
    }

    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 5);
    assert_eq!(media.stored_files().len(), 5);
}

#[test]
fn test_alpha_channel_by_output_format() {
    for (extension, source, expect_alpha) in [
        ("png", ImageFormat::Png, true),
        ("gif", ImageFormat::Gif, true),
        ("jpg", ImageFormat::Jpeg, false),
        ("jpeg", ImageFormat::Jpeg, false),
    ] {
        let media = TestMedia::new(CropFailurePolicy::Cleanup);
        let file = media.upload_file("phpA.tmp", 80, 80, source);

        let stored = media
            .uploader
            .upload(
                &file,
                TARGET_KEY,
                &params("avatar", crop_json(0, 0, 80, 80), extension, 40, 40),
            )
            .unwrap()
            .unwrap();

        let path = media.media_dir().join(stored.to_string());
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color().has_alpha(), expect_alpha, "{}", extension);
        assert_eq!(decoded.dimensions(), (40, 40));
    }
}

#[test]
fn test_png_keeps_transparent_pixels() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let file = media.upload_file("phpT.tmp", 80, 80, ImageFormat::Png);

    // The top-left quarter of the fixture is fully transparent.
    let stored = media
        .uploader
        .upload(
            &file,
            TARGET_KEY,
            &params("avatar", crop_json(0, 0, 16, 16), "png", 16, 16),
        )
        .unwrap()
        .unwrap();

    let decoded = image::open(media.media_dir().join(stored.to_string())).unwrap();
    assert_eq!(decoded.get_pixel(8, 8)[3], 0);
}

#[test]
fn test_out_of_bounds_crop_cleans_up() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let file = media.upload_file("phpX.tmp", 400, 300, ImageFormat::Jpeg);

    let result = media.uploader.upload(
        &file,
        TARGET_KEY,
        &params("kickflip", crop_json(390, 0, 50, 50), "jpg", 100, 75),
    );

    assert!(matches!(result, Err(AppError::InvalidCrop(_))));
    assert!(media.stored_files().is_empty());
}

#[test]
fn test_out_of_bounds_crop_keeps_intermediate_when_configured() {
    let media = TestMedia::new(CropFailurePolicy::Keep);
    let file = media.upload_file("phpX.tmp", 400, 300, ImageFormat::Jpeg);

    let result = media.uploader.upload(
        &file,
        TARGET_KEY,
        &params("kickflip", crop_json(390, 0, 50, 50), "jpg", 100, 75),
    );

    assert!(matches!(result, Err(AppError::InvalidCrop(_))));

    // Only the moved, unprocessed upload remains; no final artifact was written.
    let files = media.stored_files();
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("kickflip-"));
    assert!(files[0].ends_with("-original.jpg"));
}

#[test]
fn test_wrong_decoder_for_extension_fails_and_cleans_up() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let file = media.upload_file("phpP.tmp", 50, 50, ImageFormat::Png);

    // A PNG submitted as `jpg` is decoded with the JPEG codec and rejected.
    let result = media.uploader.upload(
        &file,
        TARGET_KEY,
        &params("mislabeled", crop_json(0, 0, 10, 10), "jpg", 5, 5),
    );

    assert!(matches!(result, Err(AppError::ImageProcessing(_))));
    assert!(media.stored_files().is_empty());
}

#[test]
fn test_stored_image_can_be_located_and_removed_by_stem() {
    let media = TestMedia::new(CropFailurePolicy::Cleanup);
    let file = media.upload_file("phpL.tmp", 60, 60, ImageFormat::Gif);

    let stored = media
        .uploader
        .upload(
            &file,
            TARGET_KEY,
            &params("nosegrab", crop_json(0, 0, 60, 60), "gif", 30, 30),
        )
        .unwrap()
        .unwrap();

    let store = media.uploader.store();
    let path = store
        .locate(TARGET_KEY, &stored.stem(), &["jpg", "jpeg", "png", "gif"])
        .unwrap();
    assert_eq!(path, media.media_dir().join(stored.to_string()));

    store.remove(TARGET_KEY, &stored.to_string()).unwrap();
    assert!(media.stored_files().is_empty());
}
