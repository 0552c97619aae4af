//! End-to-end tests: dataset assembly, training, package round trip, prediction

use gml_common::dataset::{DataSource, DatasetBuilder};
use gml_common::features::{encode, FEATURE_NAMES};
use gml_common::genre::CategoryInferencer;
use gml_common::history::HistoryIndex;
use gml_common::identity::ExactNormalizer;
use gml_common::package::TrainedPackage;
use gml_common::records::{load_award_records, load_chart_records, AwardRecord, ChartRecord};
use gml_common::training::{train, TrainingParams};
use gml_common::{Error, Predictor};
use tempfile::TempDir;

fn award(year: i32, category: &str, song: Option<&str>, artist: &str, winner: bool) -> AwardRecord {
    AwardRecord {
        year,
        category: category.to_string(),
        song_title: song.map(str::to_string),
        artist_name: artist.to_string(),
        is_nominated: true,
        is_winner: winner,
    }
}

fn awards() -> Vec<AwardRecord> {
    vec![
        award(2020, "Record of the Year", Some("Bad Guy"), "Billie Eilish", true),
        award(2021, "Best Pop Solo Performance", Some("Watermelon Sugar"), "Harry Styles", true),
        award(2021, "Best Rap Song", Some("Savage"), "Megan Thee Stallion Featuring Beyonce", true),
        award(2022, "Best R&B Performance", Some("Leave The Door Open"), "Silk Sonic", true),
        award(2022, "Song of the Year", Some("Happier Than Ever"), "Billie Eilish", false),
        award(2023, "Best Pop Solo Performance", Some("As It Was"), "Harry Styles", false),
        award(2023, "Best Rock Song", Some("Broken Horses"), "Brandi Carlile", true),
        award(2023, "Best Country Song", Some("You Should Probably Leave"), "Chris Stapleton", true),
        award(2023, "Best New Artist", None, "Samara Joy", true),
        award(2024, "Record of the Year", Some("What Was I Made For?"), "Billie Eilish", false),
    ]
}

fn chart(song: &str, artist: &str, peak: u32, weeks: u32, rank: u32) -> ChartRecord {
    ChartRecord {
        song_title: song.to_string(),
        artist_name: artist.to_string(),
        peak_position: peak,
        weeks_on_chart: weeks,
        current_rank: Some(rank),
    }
}

fn charts() -> Vec<ChartRecord> {
    vec![
        chart("Birds Of A Feather", "Billie Eilish", 2, 30, 3),
        chart("Some Deep Cut", "Unknown Newcomer", 85, 1, 99),
        chart("Espresso", "Sabrina Carpenter", 3, 22, 5),
    ]
}

#[test]
fn test_train_save_load_and_rank() {
    let inferencer = CategoryInferencer::default();
    let dataset = DatasetBuilder::new(&ExactNormalizer, &inferencer)
        .build(&awards(), &charts())
        .unwrap();
    assert_eq!(dataset.count_by_source(DataSource::AwardHistorical), 9);
    assert_eq!(dataset.count_by_source(DataSource::ChartCurrent), 3);

    let trained = train(&dataset.training, &TrainingParams::default()).unwrap();
    let package = TrainedPackage::new(trained);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.json");
    package.save(&path).unwrap();
    let loaded = TrainedPackage::load(&path).unwrap();

    assert_eq!(loaded.model, package.model);
    assert_eq!(loaded.category_mapping, package.category_mapping);
    assert_eq!(loaded.feature_names, FEATURE_NAMES.to_vec());

    // Scores survive the round trip bit for bit
    let (before, mapping) = package.clone().into_scorer().unwrap();
    let (after, _) = loaded.clone().into_scorer().unwrap();
    for entry in &dataset.current {
        let vector = encode(entry, &mapping).unwrap();
        assert_eq!(
            before.score(&vector).probability.to_bits(),
            after.score(&vector).probability.to_bits()
        );
    }

    let predictor =
        Predictor::from_package(loaded, Box::new(ExactNormalizer), inferencer).unwrap();
    let index = HistoryIndex::build(&awards(), &ExactNormalizer);
    let predictions = predictor.predict_current(&charts(), &index).unwrap();

    assert_eq!(predictions.len(), 3);
    assert!(predictions
        .windows(2)
        .all(|w| w[0].probability >= w[1].probability));
    assert_eq!(predictions[2].song_title, "Some Deep Cut");
    assert!(predictions
        .iter()
        .all(|p| p.explanation.len() == 4 && (0.0..=1.0).contains(&p.probability)));

    let billie = predictions
        .iter()
        .find(|p| p.artist_name == "Billie Eilish")
        .unwrap();
    assert_eq!(billie.explanation[2], "Grammy winner (1 win) - proven track record");
}

#[test]
fn test_reordered_feature_names_are_refused() {
    let inferencer = CategoryInferencer::default();
    let dataset = DatasetBuilder::new(&ExactNormalizer, &inferencer)
        .build(&awards(), &charts())
        .unwrap();
    let mut package = TrainedPackage::new(train(&dataset.training, &TrainingParams::default()).unwrap());
    package.feature_names.swap(0, 1);

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.json");
    package.save(&path).unwrap();

    assert!(matches!(
        TrainedPackage::load(&path),
        Err(Error::VersionMismatch { .. })
    ));
    assert!(matches!(
        package.into_scorer(),
        Err(Error::VersionMismatch { .. })
    ));
}

#[test]
fn test_incompatible_major_version_is_refused() {
    let inferencer = CategoryInferencer::default();
    let dataset = DatasetBuilder::new(&ExactNormalizer, &inferencer)
        .build(&awards(), &charts())
        .unwrap();
    let mut package = TrainedPackage::new(train(&dataset.training, &TrainingParams::default()).unwrap());

    package.version = "1.3".to_string();
    assert!(package.verify().is_ok());

    package.version = "2.0".to_string();
    assert!(matches!(
        package.verify(),
        Err(Error::VersionMismatch { .. })
    ));
}

#[test]
fn test_short_or_zero_scales_are_refused() {
    let inferencer = CategoryInferencer::default();
    let dataset = DatasetBuilder::new(&ExactNormalizer, &inferencer)
        .build(&awards(), &charts())
        .unwrap();
    let package = TrainedPackage::new(train(&dataset.training, &TrainingParams::default()).unwrap());
    let original = serde_json::to_value(&package).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.json");

    let mut short = original.clone();
    short["model"]["feature_scales"].as_array_mut().unwrap().pop();
    std::fs::write(&path, serde_json::to_string(&short).unwrap()).unwrap();
    assert!(matches!(
        TrainedPackage::load(&path),
        Err(Error::VersionMismatch { .. })
    ));

    let mut short_means = original.clone();
    short_means["model"]["feature_means"].as_array_mut().unwrap().truncate(1);
    std::fs::write(&path, serde_json::to_string(&short_means).unwrap()).unwrap();
    assert!(matches!(
        TrainedPackage::load(&path),
        Err(Error::VersionMismatch { .. })
    ));

    let mut zero = original;
    zero["model"]["feature_scales"][2] = serde_json::json!(0.0);
    std::fs::write(&path, serde_json::to_string(&zero).unwrap()).unwrap();
    assert!(matches!(
        TrainedPackage::load(&path),
        Err(Error::VersionMismatch { .. })
    ));
}

#[test]
fn test_missing_package_file_is_missing_data() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        TrainedPackage::load(&temp_dir.path().join("nope.json")),
        Err(Error::MissingData(_))
    ));
}

#[test]
fn test_load_records_from_json_files() {
    let temp_dir = TempDir::new().unwrap();
    let awards_path = temp_dir.path().join("awards.json");
    let charts_path = temp_dir.path().join("charts.json");
    std::fs::write(&awards_path, serde_json::to_string(&awards()).unwrap()).unwrap();
    std::fs::write(&charts_path, serde_json::to_string(&charts()).unwrap()).unwrap();

    assert_eq!(load_award_records(&awards_path).unwrap(), awards());
    assert_eq!(load_chart_records(&charts_path).unwrap(), charts());

    std::fs::write(&charts_path, "[]").unwrap();
    assert!(matches!(
        load_chart_records(&charts_path),
        Err(Error::MissingData(_))
    ));
}
