/*!
 * End-to-end tests of shifting files through the controller
 */

use anyhow::Result;
use encoding_rs::WINDOWS_1251;
use std::fs;
use subshift::app_controller::Controller;
use subshift::{NegativeTimePolicy, ShiftError, StorageError};
use crate::common;

/// Test a full positive shift
#[test]
fn test_run_withPositiveDelta_shouldWriteShiftedFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    let outcome = controller.run(&input, "500", false)?.expect("shift should run");

    assert_eq!(outcome.output_path, temp_dir.path().join("shifted").join("movie_+500.srt"));
    assert_eq!(outcome.report.total_lines, 11);
    assert_eq!(outcome.report.shifted_lines, 3);
    assert_eq!(outcome.report.encoding, "UTF-8");

    let output = fs::read_to_string(&outcome.output_path)?;
    assert!(output.starts_with("1\n00:00:01,500 --> 00:00:04,500\nThis is a test subtitle.\n"));
    assert!(output.contains("00:00:10,500 --> 00:00:14,500"));
    assert!(outcome.attachment.filepath.exists());
    Ok(())
}

/// Test a negative shift that crosses zero under each policy
#[test]
fn test_run_withDeltaBelowZero_shouldFollowPolicy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;
    let outcome = controller.run(&input, "-4500", false)?.expect("shift should run");
    let output = fs::read_to_string(&outcome.output_path)?;
    assert!(output.contains("00:00:00,000 --> 00:00:00,000"));
    assert!(output.contains("00:00:00,500 --> 00:00:04,500"));
    assert!(outcome.output_path.ends_with("movie_-4500.srt"));

    let mut config = common::config_in(temp_dir.path());
    config.shift.options.negative_time_policy = NegativeTimePolicy::Reject;
    let controller = Controller::with_config(config)?;
    let error = controller.run(&input, "-4500", true).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<ShiftError>(),
        Some(ShiftError::NegativeTimestamp { .. })
    ));
    Ok(())
}

/// Test that malformed deltas are rejected before any file is written
#[test]
fn test_run_withInvalidDelta_shouldNotTouchFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    for delta in ["abc", "12.5", "+5", "", " 5"] {
        let error = controller.run(&input, delta, false).unwrap_err();
        assert!(
            matches!(error.downcast_ref::<ShiftError>(), Some(ShiftError::InvalidShiftValue(_))),
            "delta {:?} gave {}",
            delta,
            error
        );
    }

    assert!(!temp_dir.path().join("uploads").exists());
    assert!(!temp_dir.path().join("shifted").exists());
    Ok(())
}

/// Test that an existing output is kept unless forced
#[test]
fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    let first = controller.run(&input, "100", false)?.expect("first run writes");
    fs::write(&first.output_path, "stale")?;

    assert!(controller.run(&input, "100", false)?.is_none());
    assert_eq!(fs::read_to_string(&first.output_path)?, "stale");

    let forced = controller.run(&input, "100", true)?.expect("forced run writes");
    assert!(fs::read_to_string(&forced.output_path)?.contains("00:00:01,100 --> 00:00:04,100"));
    Ok(())
}

/// Test that a legacy Cyrillic file comes back in windows-1251
#[test]
fn test_run_withWindows1251File_shouldKeepEncoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let text = "1\n00:01:00,000 --> 00:01:02,500\nСъешь же ещё этих мягких французских булок, да выпей чаю.\n\n\
                2\n00:01:03,000 --> 00:01:05,000\nШирокая электрификация южных губерний даст мощный толчок подъёму сельского хозяйства.\n";
    let (bytes, _, _) = WINDOWS_1251.encode(text);
    let input = common::create_test_file(temp_dir.path(), "russian.srt", &bytes)?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    let outcome = controller.run(&input, "-60000", false)?.expect("shift should run");

    assert_eq!(outcome.report.encoding, "windows-1251");
    let expected = text
        .replace("00:01:00,000 --> 00:01:02,500", "00:00:00,000 --> 00:00:02,500")
        .replace("00:01:03,000 --> 00:01:05,000", "00:00:03,000 --> 00:00:05,000");
    let (expected, _, _) = WINDOWS_1251.encode(&expected);
    assert_eq!(fs::read(&outcome.output_path)?, expected.into_owned());
    Ok(())
}

/// Test that uploads with a wrong extension fail with a storage error
#[test]
fn test_handleUpload_withWrongExtension_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    let error = controller
        .handle_upload("notes.txt", common::SAMPLE_SRT.as_bytes(), "500", false)
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<StorageError>(),
        Some(StorageError::UnsupportedExtension { .. })
    ));

    let error = controller.handle_upload("empty.srt", b"", "500", false).unwrap_err();
    assert!(matches!(error.downcast_ref::<StorageError>(), Some(StorageError::EmptyUpload(_))));
    Ok(())
}

/// Test a missing input file
#[test]
fn test_run_withMissingInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;
    assert!(controller.run(&temp_dir.path().join("missing.srt"), "500", false).is_err());
    Ok(())
}

/// Test that path components of an upload name cannot move the output
#[test]
fn test_handleUpload_withParentDirsInName_shouldStayInShiftedDir() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("a").join("b");
    let controller = Controller::with_config(common::config_in(&root))?;

    let outcome = controller
        .handle_upload("../../evil.srt", common::SAMPLE_SRT.as_bytes(), "500", false)?
        .expect("shift should run");

    assert_eq!(outcome.output_path, root.join("shifted").join("evil_+500.srt"));
    assert!(outcome.output_path.exists());
    assert!(!temp_dir.path().join("evil_+500.srt").exists());
    assert_eq!(outcome.attachment.original_file_name, "evil.srt");
    Ok(())
}

/// Test that a failed shift leaves neither the destination nor a temporary file
#[test]
fn test_run_withRejectedShift_shouldLeaveNoOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;
    let mut config = common::config_in(temp_dir.path());
    config.shift.options.negative_time_policy = NegativeTimePolicy::Reject;
    let controller = Controller::with_config(config)?;

    assert!(controller.run(&input, "-4500", false).is_err());

    let shifted_dir = temp_dir.path().join("shifted");
    assert!(!shifted_dir.join("movie_-4500.srt").exists());
    let leftovers: Vec<_> = fs::read_dir(&shifted_dir)?.collect::<std::io::Result<_>>()?;
    assert!(leftovers.is_empty(), "unexpected files: {:?}", leftovers);
    Ok(())
}

/// Test that rejected uploads create no directories
#[test]
fn test_handleUpload_withRejectedUpload_shouldCreateNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::with_config(common::config_in(temp_dir.path()))?;

    assert!(controller.handle_upload("notes.txt", b"1\n", "500", false).is_err());
    assert!(controller.handle_upload("movie.srt", b"", "500", false).is_err());

    assert!(!temp_dir.path().join("shifted").exists());
    assert!(!temp_dir.path().join("uploads").exists());
    Ok(())
}
