mod common;

use chrono::NaiveDate;
use proptest::prelude::*;
use rehab_log_lib::codec::{
    decode_content, decode_line, encode_content, encode_line, encode_segment, export_text,
    UNRESOLVED_CATEGORY,
};
use rehab_log_lib::inputs::ModeInputs;
use rehab_log_lib::{DayGroup, HistoryRow, LogEntry, Side};
use rstest::rstest;

use common::test_catalog;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
}

fn entry(name: &str, category: &str, side: Side, value: &str, sets: i64, unit: &str, notes: &str) -> LogEntry {
    LogEntry {
        id: "fixed".to_string(),
        date: day(),
        exercise_name: name.to_string(),
        category: category.to_string(),
        side,
        sets,
        value: value.to_string(),
        unit: unit.to_string(),
        notes: notes.to_string(),
    }
}

/// Everything but the id, which decoding always regenerates.
fn shape(e: &LogEntry) -> (NaiveDate, &str, &str, Side, i64, &str, &str, &str) {
    (
        e.date,
        &e.exercise_name,
        &e.category,
        e.side,
        e.sets,
        &e.value,
        &e.unit,
        &e.notes,
    )
}

#[test]
fn test_worked_example_encodes_and_decodes() {
    let squat = entry("深蹲", "下肢", Side::NotApplicable, "0kg 10下", 3, "組", "");
    let group = DayGroup {
        date: day(),
        status: "膝蓋輕鬆".to_string(),
        entries: vec![squat.clone()],
    };

    assert_eq!(encode_line(&group), "2026-02-04,\"[膝蓋輕鬆]｜深蹲: 0kg 10下 x3組\"");

    let decoded = decode_content(day(), "[膝蓋輕鬆]｜深蹲: 0kg 10下 x3組", &test_catalog());
    assert_eq!(decoded.status, "膝蓋輕鬆");
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(shape(&decoded.entries[0]), shape(&squat));
    assert!(decoded.dropped.is_empty());
}

#[rstest]
#[case::strength(entry("深蹲", "下肢", Side::NotApplicable, "20kg 12下", 4, "組", "慢"), "深蹲: 20kg 12下 x4組 (慢)")]
#[case::strength_no_weight(entry("深蹲", "下肢", Side::NotApplicable, "12下", 3, "組", ""), "深蹲: 12下 x3組")]
#[case::reps_only_left(entry("側抬腿", "髖部", Side::Left, "15下", 2, "組", ""), "側抬腿【左】: 15下 x2組")]
#[case::reps_only_custom_unit(entry("桌球", "運動", Side::NotApplicable, "2場", 1, "組", ""), "桌球: 2場 x1組")]
#[case::time_only(entry("棒式", "核心", Side::NotApplicable, "30秒", 3, "組", ""), "棒式: 30秒 x3組")]
#[case::cycling(entry("腳踏車", "有氧", Side::NotApplicable, "阻力5", 20, "分鐘", ""), "腳踏車: 阻力5 20分鐘")]
#[case::treadmill(entry("跑步機", "有氧", Side::NotApplicable, "坡度2 速度5.5", 15, "分鐘", "微喘"), "跑步機: 坡度2 速度5.5 15分鐘 (微喘)")]
#[case::relax(entry("放鬆按摩", "放鬆", Side::NotApplicable, "已完成", 0, "次", ""), "放鬆按摩: 已完成")]
fn test_segment_per_mode(#[case] sample: LogEntry, #[case] expected: &str) {
    assert_eq!(encode_segment(&sample), expected);

    let decoded = decode_content(day(), expected, &test_catalog());
    assert_eq!(decoded.status, "");
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(shape(&decoded.entries[0]), shape(&sample));
}

#[test]
fn test_cycling_minutes_never_encode_as_sets() {
    let ride = entry("腳踏車", "有氧", Side::NotApplicable, "阻力3", 20, "分鐘", "");
    let segment = encode_segment(&ride);
    assert!(segment.ends_with(" 20分鐘"));
    assert!(!segment.contains("x20組"));

    let decoded = decode_content(day(), &segment, &test_catalog());
    assert_eq!(decoded.entries[0].unit, "分鐘");
    assert_eq!(decoded.entries[0].sets, 20);
}

#[test]
fn test_status_only_group() {
    let group = DayGroup {
        date: day(),
        status: "休息日".to_string(),
        entries: Vec::new(),
    };
    let content = encode_content(&group.status, &group.entries);
    assert_eq!(content, "[休息日]");

    let decoded = decode_content(day(), &content, &test_catalog());
    assert_eq!(decoded.status, "休息日");
    assert!(decoded.entries.is_empty());
}

#[test]
fn test_status_with_brackets_keeps_inner_text() {
    let decoded = decode_content(day(), "[左膝[微痛]]｜棒式: 30秒 x3組", &test_catalog());
    assert_eq!(decoded.status, "左膝[微痛]");
    assert_eq!(decoded.entries.len(), 1);
}

#[test]
fn test_side_marker_omitted_for_not_applicable() {
    let squat = entry("深蹲", "下肢", Side::NotApplicable, "10下", 3, "組", "");
    assert!(!encode_segment(&squat).contains('【'));

    let decoded = decode_content(day(), "側抬腿: 15下 x2組", &test_catalog());
    assert_eq!(decoded.entries[0].side, Side::NotApplicable);
}

#[test]
fn test_both_sides_marker() {
    let both = entry("側抬腿", "髖部", Side::Both, "15下", 2, "組", "");
    assert_eq!(encode_segment(&both), "側抬腿【雙側】: 15下 x2組");
}

#[test]
fn test_malformed_segment_is_dropped() {
    let decoded = decode_content(day(), "深蹲: 10下 x3組｜這段沒有冒號", &test_catalog());
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.entries[0].exercise_name, "深蹲");
    assert_eq!(decoded.dropped, vec!["這段沒有冒號".to_string()]);
}

#[test]
fn test_unknown_side_label_is_dropped() {
    let decoded = decode_content(day(), "側抬腿【上】: 15下 x2組", &test_catalog());
    assert!(decoded.entries.is_empty());
    assert_eq!(decoded.dropped.len(), 1);
}

#[test]
fn test_unknown_exercise_gets_unresolved_category() {
    let decoded = decode_content(day(), "划船機: 10下 x3組", &test_catalog());
    assert_eq!(decoded.entries.len(), 1);
    assert_eq!(decoded.entries[0].category, UNRESOLVED_CATEGORY);
}

#[test]
fn test_empty_segments_are_ignored() {
    let decoded = decode_content(day(), "｜ 深蹲: 10下 x3組 ｜｜", &test_catalog());
    assert_eq!(decoded.entries.len(), 1);
    assert!(decoded.dropped.is_empty());
    assert!(decode_content(day(), "", &test_catalog()).entries.is_empty());
}

#[test]
fn test_decoded_entries_get_fresh_ids() {
    let decoded = decode_content(day(), "深蹲: 10下 x3組｜深蹲: 10下 x3組", &test_catalog());
    assert_eq!(decoded.entries.len(), 2);
    assert_ne!(decoded.entries[0].id, decoded.entries[1].id);
}

#[test]
fn test_quotes_are_doubled_and_restored() {
    let quoted = entry("深蹲", "下肢", Side::NotApplicable, "10下", 3, "組", "說\"好\"");
    let group = DayGroup {
        date: day(),
        status: String::new(),
        entries: vec![quoted.clone()],
    };
    let line = encode_line(&group);
    assert_eq!(line, "2026-02-04,\"深蹲: 10下 x3組 (說\"\"好\"\")\"");

    let decoded = decode_line(&line, &test_catalog()).unwrap();
    assert_eq!(shape(&decoded.entries[0]), shape(&quoted));
}

#[test]
fn test_decode_line_rejects_lines_without_date() {
    assert!(decode_line("not a date,\"深蹲: 10下 x3組\"", &test_catalog()).is_none());
    assert!(decode_line("no comma at all", &test_catalog()).is_none());
}

#[test]
fn test_export_text_joins_lines_in_order() {
    let later = DayGroup {
        date: NaiveDate::from_ymd_opt(2026, 2, 5).unwrap(),
        status: "好".to_string(),
        entries: Vec::new(),
    };
    let earlier = DayGroup {
        date: day(),
        status: String::new(),
        entries: vec![entry("棒式", "核心", Side::NotApplicable, "30秒", 3, "組", "")],
    };
    assert_eq!(
        export_text(&[later, earlier]),
        "2026-02-05,\"[好]\"\n2026-02-04,\"棒式: 30秒 x3組\""
    );
}

#[test]
fn test_history_row_date_cell_with_extra_text() {
    let row = HistoryRow {
        date: "2026-02-04T00:00:00.000Z".to_string(),
        content: String::new(),
    };
    assert_eq!(row.day(), Some(day()));
    assert_eq!(HistoryRow::new(day(), String::new()).date, "2026-02-04");

    let bad = HistoryRow {
        date: "yesterday".to_string(),
        content: String::new(),
    };
    assert_eq!(bad.day(), None);
}

fn arb_entry() -> impl Strategy<Value = LogEntry> {
    (0usize..6, 1u32..300, 1u32..10, 0usize..3, "[a-z0-9]{0,8}").prop_map(
        |(mode, quantity, count, side, notes)| {
            let catalog = test_catalog();
            let (id, inputs) = match mode {
                0 => (
                    "squat",
                    ModeInputs::Strength {
                        weight: (quantity % 2 == 0).then(|| format!("{}.5", quantity / 4)),
                        reps: quantity,
                        sets: count,
                    },
                ),
                1 => ("side_leg", ModeInputs::RepsOnly { reps: quantity, sets: count }),
                2 => ("plank", ModeInputs::TimeOnly { seconds: quantity, sets: count }),
                3 => (
                    "bike",
                    ModeInputs::Cycling {
                        resistance: count.to_string(),
                        minutes: quantity,
                    },
                ),
                4 => (
                    "treadmill",
                    ModeInputs::Treadmill {
                        slope: count.to_string(),
                        speed: format!("{}.{}", quantity / 10, quantity % 10),
                        minutes: quantity,
                    },
                ),
                _ => ("massage", ModeInputs::Relax),
            };
            let def = catalog.find_by_id(id).unwrap();
            let formatted = inputs.format(def).unwrap();
            let side = if def.is_unilateral {
                [Side::Left, Side::Right, Side::Both][side]
            } else {
                Side::NotApplicable
            };
            LogEntry {
                id: "generated".to_string(),
                date: day(),
                exercise_name: def.name.clone(),
                category: def.category.clone(),
                side,
                sets: formatted.sets,
                value: formatted.value,
                unit: formatted.unit,
                notes,
            }
        },
    )
}

proptest! {
    #[test]
    fn prop_day_round_trip(
        entries in prop::collection::vec(arb_entry(), 0..6),
        status in "[a-z\u{4e00}-\u{4e20}]{0,6}",
    ) {
        let content = encode_content(&status, &entries);
        let decoded = decode_content(day(), &content, &test_catalog());

        prop_assert_eq!(&decoded.status, &status);
        prop_assert!(decoded.dropped.is_empty());
        prop_assert_eq!(decoded.entries.len(), entries.len());
        for (got, want) in decoded.entries.iter().zip(&entries) {
            prop_assert_eq!(shape(got), shape(want));
        }
    }
}
