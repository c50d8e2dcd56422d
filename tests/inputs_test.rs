mod common;

use chrono::NaiveDate;
use rehab_log_lib::inputs::{FormattedValue, GRAMMARS, RELAX_VALUE};
use rehab_log_lib::{ExerciseMode, InputError, InputOverrides, LogEntry, ModeInputs, Side};
use rstest::rstest;
use strum::IntoEnumIterator;

use common::test_catalog;

fn stored(value: &str, sets: i64, unit: &str) -> LogEntry {
    LogEntry {
        id: "e1".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
        exercise_name: String::new(),
        category: String::new(),
        side: Side::NotApplicable,
        sets,
        value: value.to_string(),
        unit: unit.to_string(),
        notes: String::new(),
    }
}

#[test]
fn test_every_mode_has_a_grammar_row() {
    for mode in ExerciseMode::iter() {
        assert_eq!(
            GRAMMARS.iter().filter(|g| g.mode == mode).count(),
            1,
            "mode {mode} needs exactly one grammar row"
        );
    }
}

#[rstest]
#[case("squat", ModeInputs::Strength { weight: None, reps: 10, sets: 3 })]
#[case("side_leg", ModeInputs::RepsOnly { reps: 10, sets: 3 })]
#[case("plank", ModeInputs::TimeOnly { seconds: 30, sets: 3 })]
#[case("bike", ModeInputs::Cycling { resistance: String::new(), minutes: 15 })]
#[case("treadmill", ModeInputs::Treadmill { slope: String::new(), speed: String::new(), minutes: 15 })]
#[case("massage", ModeInputs::Relax)]
#[case("pingpong", ModeInputs::RepsOnly { reps: 2, sets: 3 })]
fn test_seed_values(#[case] id: &str, #[case] expected: ModeInputs) {
    let catalog = test_catalog();
    let def = catalog.find_by_id(id).unwrap();
    assert_eq!(ModeInputs::seed(def), expected);
}

#[rstest]
#[case("squat", ModeInputs::Strength { weight: Some("20".into()), reps: 12, sets: 4 }, "20kg 12下", 4, "組")]
#[case("squat", ModeInputs::Strength { weight: None, reps: 12, sets: 4 }, "12下", 4, "組")]
#[case("pingpong", ModeInputs::RepsOnly { reps: 2, sets: 1 }, "2場", 1, "組")]
#[case("plank", ModeInputs::TimeOnly { seconds: 45, sets: 2 }, "45秒", 2, "組")]
#[case("bike", ModeInputs::Cycling { resistance: "5".into(), minutes: 20 }, "阻力5", 20, "分鐘")]
#[case("treadmill", ModeInputs::Treadmill { slope: "2".into(), speed: "5.5".into(), minutes: 15 }, "坡度2 速度5.5", 15, "分鐘")]
#[case("massage", ModeInputs::Relax, RELAX_VALUE, 0, "次")]
fn test_format_per_mode(
    #[case] id: &str,
    #[case] inputs: ModeInputs,
    #[case] value: &str,
    #[case] sets: i64,
    #[case] unit: &str,
) {
    let catalog = test_catalog();
    let def = catalog.find_by_id(id).unwrap();
    assert_eq!(
        inputs.format(def).unwrap(),
        FormattedValue {
            value: value.to_string(),
            sets,
            unit: unit.to_string(),
        }
    );
}

#[test]
fn test_format_rejects_bad_input() {
    let catalog = test_catalog();
    let squat = catalog.find_by_id("squat").unwrap();
    let bike = catalog.find_by_id("bike").unwrap();

    let heavy = ModeInputs::Strength {
        weight: Some("heavy".into()),
        reps: 10,
        sets: 3,
    };
    assert_eq!(
        heavy.format(squat),
        Err(InputError::InvalidInput {
            field: "weight",
            value: "heavy".into()
        })
    );

    let no_sets = ModeInputs::Strength {
        weight: None,
        reps: 10,
        sets: 0,
    };
    assert!(matches!(
        no_sets.format(squat),
        Err(InputError::InvalidInput { field: "sets", .. })
    ));

    let blank = ModeInputs::seed(bike);
    assert!(matches!(
        blank.format(bike),
        Err(InputError::InvalidInput {
            field: "resistance",
            ..
        })
    ));

    assert_eq!(
        ModeInputs::Relax.format(squat),
        Err(InputError::ModeMismatch {
            expected: ExerciseMode::Strength,
            found: ExerciseMode::Relax
        })
    );
}

#[test]
fn test_apply_ignores_fields_of_other_modes() {
    let catalog = test_catalog();
    let mut inputs = ModeInputs::seed(catalog.find_by_id("plank").unwrap());
    inputs.apply(&InputOverrides {
        weight: Some("50".into()),
        seconds: Some(60),
        minutes: Some(40),
        ..Default::default()
    });
    assert_eq!(inputs, ModeInputs::TimeOnly { seconds: 60, sets: 3 });
}

#[test]
fn test_apply_blank_weight_clears_it() {
    let mut inputs = ModeInputs::Strength {
        weight: Some("20".into()),
        reps: 10,
        sets: 3,
    };
    inputs.apply(&InputOverrides {
        weight: Some("  ".into()),
        ..Default::default()
    });
    assert_eq!(
        inputs,
        ModeInputs::Strength {
            weight: None,
            reps: 10,
            sets: 3
        }
    );
}

#[rstest]
#[case("squat", stored("20kg 12下", 4, "組"), ModeInputs::Strength { weight: Some("20".into()), reps: 12, sets: 4 })]
#[case("squat", stored("0kg 10下", 3, "組"), ModeInputs::Strength { weight: Some("0".into()), reps: 10, sets: 3 })]
#[case("squat", stored("12下", 3, "組"), ModeInputs::Strength { weight: None, reps: 12, sets: 3 })]
#[case("pingpong", stored("2場", 1, "組"), ModeInputs::RepsOnly { reps: 2, sets: 1 })]
#[case("plank", stored("45秒", 2, "組"), ModeInputs::TimeOnly { seconds: 45, sets: 2 })]
#[case("bike", stored("阻力5", 20, "分鐘"), ModeInputs::Cycling { resistance: "5".into(), minutes: 20 })]
#[case("treadmill", stored("坡度2 速度5.5", 15, "分鐘"), ModeInputs::Treadmill { slope: "2".into(), speed: "5.5".into(), minutes: 15 })]
#[case("massage", stored("已完成", 0, "次"), ModeInputs::Relax)]
fn test_from_entry_parses_stored_values(
    #[case] id: &str,
    #[case] entry: LogEntry,
    #[case] expected: ModeInputs,
) {
    let catalog = test_catalog();
    let def = catalog.find_by_id(id).unwrap();
    assert_eq!(ModeInputs::from_entry(def, &entry), expected);
}

#[rstest]
#[case("squat", stored("輕鬆做", 3, "組"), ModeInputs::Strength { weight: None, reps: 0, sets: 3 })]
#[case("plank", stored("1分鐘", 2, "組"), ModeInputs::TimeOnly { seconds: 1, sets: 2 })]
#[case("bike", stored("中等", 20, "分鐘"), ModeInputs::Cycling { resistance: "中等".into(), minutes: 20 })]
#[case("treadmill", stored("快走", 30, "分鐘"), ModeInputs::Treadmill { slope: "快走".into(), speed: String::new(), minutes: 30 })]
fn test_from_entry_falls_back_on_unexpected_shapes(
    #[case] id: &str,
    #[case] entry: LogEntry,
    #[case] expected: ModeInputs,
) {
    let catalog = test_catalog();
    let def = catalog.find_by_id(id).unwrap();
    assert_eq!(ModeInputs::from_entry(def, &entry), expected);
}

#[test]
fn test_format_then_parse_recovers_inputs() {
    let catalog = test_catalog();
    let def = catalog.find_by_id("treadmill").unwrap();
    let inputs = ModeInputs::Treadmill {
        slope: "3.5".into(),
        speed: "6".into(),
        minutes: 25,
    };
    let formatted = inputs.format(def).unwrap();
    let entry = stored(&formatted.value, formatted.sets, &formatted.unit);
    assert_eq!(ModeInputs::from_entry(def, &entry), inputs);
}
