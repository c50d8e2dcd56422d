#![allow(dead_code)]
use anyhow::Result;
use rehab_log_lib::{AppService, Catalog, Config, ExerciseDefinition, ExerciseMode};

fn def(
    id: &str,
    name: &str,
    category: &str,
    is_unilateral: bool,
    mode: ExerciseMode,
) -> ExerciseDefinition {
    ExerciseDefinition {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        is_unilateral,
        mode,
        default_unit: None,
        default_quantity: None,
    }
}

/// One exercise per mode, plus a reps exercise with its own unit and default.
pub fn test_catalog() -> Catalog {
    let mut table_tennis = def("pingpong", "桌球", "運動", false, ExerciseMode::RepsOnly);
    table_tennis.default_unit = Some("場".to_string());
    table_tennis.default_quantity = Some(2);

    Catalog::new(vec![
        def("squat", "深蹲", "下肢", false, ExerciseMode::Strength),
        def("side_leg", "側抬腿", "髖部", true, ExerciseMode::RepsOnly),
        def("plank", "棒式", "核心", false, ExerciseMode::TimeOnly),
        def("bike", "腳踏車", "有氧", false, ExerciseMode::Cycling),
        def("treadmill", "跑步機", "有氧", false, ExerciseMode::Treadmill),
        def("massage", "放鬆按摩", "放鬆", false, ExerciseMode::Relax),
        table_tennis,
    ])
}

// Helper function to create a test service with in-memory database
pub fn create_test_service() -> Result<AppService> {
    let conn = rusqlite::Connection::open_in_memory()?;
    let mut service = AppService::with_connection(
        Config::default(),
        conn,
        ":memory:".into(),
        "test_config.toml".into(),
    )?;
    service.set_catalog(test_catalog())?;
    Ok(service)
}
