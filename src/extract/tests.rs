use std::fs;

use super::*;

fn image_xml(name: &str, voltage: &str, dose: &str) -> String {
    format!(
        "<MicroscopeImage><name>{name}</name><uniqueID>{name}-id</uniqueID>\
         <microscopeData><gun><AccelerationVoltage>{voltage}</AccelerationVoltage></gun></microscopeData>\
         <CustomData><KeyValueOfstringanyType><Key>Detectors[EF-CCD].DoseOnCamera</Key>\
         <Value>{dose}</Value></KeyValueOfstringanyType></CustomData></MicroscopeImage>"
    )
}

fn dataset(root: &Path) {
    let data = root.join("GridSquare_1/Data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("movie_1.xml"), image_xml("m1", "300000", "40")).unwrap();
    fs::write(data.join("movie_2.xml"), image_xml("m2", "300000", "50")).unwrap();
    fs::write(data.join("frames.tiff"), b"II*\0").unwrap();
}

fn record(json: &[u8]) -> FlatRecord {
    serde_json::from_slice(json).unwrap()
}

#[test]
fn test_read_metadata_from_data_folders() {
    let dir = tempfile::tempdir().unwrap();
    dataset(dir.path());

    let json = read_metadata(&ExtractOptions::new(dir.path())).unwrap();
    let merged = record(&json);

    assert_eq!(merged[crate::merge::NUMBER_OF_MOVIES], "2");
    assert_eq!(
        merged["MicroscopeImage.microscopeData.gun.AccelerationVoltage"],
        "300000"
    );
    let number = |key: &str| crate::field::parse_number(&merged[key]).unwrap();
    assert_eq!(number("Detectors[EF-CCD].DoseOnCamera_min"), 40.0);
    assert_eq!(number("Detectors[EF-CCD].DoseOnCamera_max"), 50.0);
    assert_eq!(number(crate::merge::DOSE_AVERAGE), 45.0);
}

#[test]
fn test_missing_and_file_roots() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent");
    assert!(matches!(
        read_metadata(&ExtractOptions::new(&absent)),
        Err(ExtractError::MissingRoot(_))
    ));

    let file = dir.path().join("file.xml");
    fs::write(&file, "<A>1</A>").unwrap();
    assert!(matches!(
        read_metadata(&ExtractOptions::new(&file)),
        Err(ExtractError::NotADirectory(_))
    ));
}

#[test]
fn test_empty_dataset_extracts_nothing() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("Data")).unwrap();

    assert!(matches!(
        read_metadata(&ExtractOptions::new(dir.path())),
        Err(ExtractError::NothingExtracted)
    ));
}

#[test]
fn test_optional_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("grid_01");
    dataset(&root);
    let out = dir.path().join("out");
    fs::create_dir_all(&out).unwrap();

    let mut options = ExtractOptions::new(&root);
    options.create_zip = true;
    options.write_full_metadata = true;
    options.output_dir = out.clone();

    let json = read_metadata(&options).unwrap();

    assert!(out.join(crate::archive::DEFAULT_ARCHIVE_NAME).is_file());
    assert_eq!(fs::read(out.join("grid_01_full.json")).unwrap(), json);
}

#[test]
fn test_mirror_folder_is_searched() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("session_7");
    fs::create_dir_all(&root).unwrap();
    let mirror = dir.path().join("mirror");
    dataset(&mirror.join("session_7"));

    let mut options = ExtractOptions::new(&root);
    options.mirror_folder = Some(mirror.clone());
    let merged = record(&read_metadata(&options).unwrap());
    assert_eq!(merged[crate::merge::NUMBER_OF_MOVIES], "2");

    options.mirror_folder = Some(dir.path().join("no_mirror"));
    assert!(matches!(
        read_metadata(&options),
        Err(ExtractError::Mirror { .. })
    ));
}

#[test]
fn test_invalid_folder_filter() {
    let dir = tempfile::tempdir().unwrap();
    let mut options = ExtractOptions::new(dir.path());
    options.folder_filter = Some("[".to_string());

    assert!(matches!(
        read_metadata(&options),
        Err(ExtractError::Discovery(_))
    ));
}

#[test]
fn test_dataset_name_is_last_component() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("grid_01");
    fs::create_dir_all(&root).unwrap();

    assert_eq!(dataset_name(&root.join(".")).as_deref(), Some("grid_01"));
}
