// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use photobooth::constants::{encoding, file_formats, storage_keys, strip, timing};

#[test]
fn test_strip_holds_four_photos() {
    assert_eq!(strip::PHOTOS_PER_STRIP, 4);
}

#[test]
fn test_sequencer_timing() {
    assert_eq!(timing::COUNTDOWN_START, 3);
    assert_eq!(timing::COUNTDOWN_TICK.as_millis(), 1000);
    assert_eq!(timing::CAPTURE_COOLDOWN.as_millis(), 1200);
    assert_eq!(timing::MANUAL_TRIGGER_GUARD.as_millis(), 1500);
}

#[test]
fn test_storage_keys_are_distinct() {
    assert_ne!(storage_keys::PHOTOS, storage_keys::SOUND);
    for key in [storage_keys::PHOTOS, storage_keys::SOUND] {
        assert!(key.starts_with("photobooth-"), "{key}");
    }
}

#[test]
fn test_export_uses_maximum_quality() {
    assert_eq!(encoding::EXPORT_JPEG_QUALITY, 100);
    assert!(encoding::CAPTURE_JPEG_QUALITY < encoding::EXPORT_JPEG_QUALITY);
}

#[test]
fn test_image_extensions_case_insensitive() {
    assert!(file_formats::is_image_extension("JPG"));
    assert!(file_formats::is_image_extension("png"));
    assert!(!file_formats::is_image_extension("mp4"));
}
