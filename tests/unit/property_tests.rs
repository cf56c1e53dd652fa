/*!
 * Property tests for timestamp arithmetic and the document pass
 */

use proptest::prelude::*;
use subshift::{is_time_line, ShiftValue, SubtitleShifter, Timestamp};

const MAX_TOTAL_MS: i64 = 100 * 3_600_000 - 1;

fn timestamp_text() -> impl Strategy<Value = String> {
    "[0-9]{2}:[0-9]{2}:[0-9]{2},[0-9]{3}"
}

/// Lines without any newline, mixing time lines and free text
fn document_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (timestamp_text(), timestamp_text()).prop_map(|(start, end)| format!("{} --> {}", start, end)),
        "[^\r\n]{0,40}",
        "[0-9]{1,4}",
    ]
}

proptest! {
    #[test]
    fn prop_format_parse_roundTrip(text in timestamp_text()) {
        let timestamp = Timestamp::parse(&text).unwrap();
        prop_assert_eq!(timestamp.format(), text);
    }

    #[test]
    fn prop_shift_byZero_isIdentity(total in 0..MAX_TOTAL_MS) {
        let timestamp = Timestamp::from_milliseconds(total);
        // Canonical values, so the text is unchanged as well as the total
        prop_assert_eq!(timestamp.shift(0), timestamp);
        prop_assert_eq!(timestamp.shift(0).format(), timestamp.format());
    }

    #[test]
    fn prop_shift_byZero_normalizesParsedText(text in timestamp_text()) {
        let timestamp = Timestamp::parse(&text).unwrap();
        let shifted = timestamp.shift(0);
        prop_assert_eq!(shifted.format(), Timestamp::from_milliseconds(timestamp.to_milliseconds()).format());
        prop_assert!(shifted.minutes() < 60 && shifted.seconds() < 60 && shifted.millis() < 1000);
    }

    #[test]
    fn prop_shift_isAdditive(total in 0..MAX_TOTAL_MS, a in -MAX_TOTAL_MS..MAX_TOTAL_MS, b in -MAX_TOTAL_MS..MAX_TOTAL_MS) {
        prop_assume!(total + a >= 0 && total + a + b >= 0);
        let timestamp = Timestamp::from_milliseconds(total);
        prop_assert_eq!(timestamp.shift(a).shift(b), timestamp.shift(a + b));
    }

    #[test]
    fn prop_fromMilliseconds_keepsFieldRanges(total in 0..i64::MAX / 2) {
        let timestamp = Timestamp::from_milliseconds(total);
        prop_assert!(timestamp.minutes() < 60);
        prop_assert!(timestamp.seconds() < 60);
        prop_assert!(timestamp.millis() < 1000);
        prop_assert_eq!(timestamp.to_milliseconds(), total);
    }

    #[test]
    fn prop_transform_preservesLinesAndContent(lines in prop::collection::vec(document_line(), 0..30), shift in -5_000i64..5_000) {
        let source = lines.iter().map(|line| format!("{}\n", line)).collect::<String>();
        let delta = ShiftValue::parse(&shift.to_string()).unwrap();

        let output = SubtitleShifter::default().transform(source.as_bytes(), &delta).unwrap();
        let output = String::from_utf8(output).unwrap();
        let output_lines: Vec<&str> = output.lines().collect();

        prop_assert_eq!(output_lines.len(), lines.len());
        for (input, output) in lines.iter().zip(&output_lines) {
            if is_time_line(input) {
                prop_assert!(is_time_line(output) || output.len() > input.len());
            } else {
                prop_assert_eq!(input.as_str(), *output);
            }
        }
    }
}
