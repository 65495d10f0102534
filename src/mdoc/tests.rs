use super::*;
use crate::field::parse_number;

const SERIALEM_TILT_SERIES: &str = "PixelSpacing = 1.35
Voltage = 300
ImageFile = ts_01.mrc
ImageSize = 4096 4096
DataMode = 1

[T = SerialEM: Digitized on EMBL Krios                  05-Mar-24  10:14:02    ]

[T =     Tilt axis angle = 84.9, binning = 1  spot = 8  camera = 0]

[ZValue = 0]
TiltAngle = -10
StagePosition = 12.5 -3.25
Magnification = 105000
MagIndex = 31
ExposureDose = 3.1
FilterSlitAndLoss = 20 0
DateTime = 05-Mar-24  10:15:00

[ZValue = 1]
TiltAngle = 20
StagePosition = 13.5 -4.25
Magnification = 105000
MagIndex = 31
ExposureDose = 3.1
FilterSlitAndLoss = 20 0
DateTime = 05-Mar-24  10:16:30
";

fn number(record: &FlatRecord, key: &str) -> f64 {
    parse_number(&record[key]).unwrap_or_else(|| panic!("{key} is not numeric"))
}

#[test]
fn test_tilt_series_ranges_and_increment() {
    let record = parse_mdoc_str(SERIALEM_TILT_SERIES);

    assert_eq!(number(&record, "TiltAngle_min"), -10.0);
    assert_eq!(number(&record, "TiltAngle_max"), 20.0);
    assert_eq!(number(&record, "NumberOfTilts"), 2.0);
    assert_eq!(number(&record, "Tilt_increment"), 15.0);
    assert!(!record.contains_key("TiltAngle"));
}

#[test]
fn test_stage_position_tracked_per_axis() {
    let record = parse_mdoc_str(SERIALEM_TILT_SERIES);

    assert_eq!(number(&record, "StagePosition_x_min"), 12.5);
    assert_eq!(number(&record, "StagePosition_x_max"), 13.5);
    assert_eq!(number(&record, "StagePosition_y_min"), -4.25);
    assert_eq!(number(&record, "StagePosition_y_max"), -3.25);
    assert!(!record.contains_key("StagePosition"));
}

#[test]
fn test_unchanged_fields_stay_scalar() {
    let record = parse_mdoc_str(SERIALEM_TILT_SERIES);

    assert_eq!(record["Magnification"], "105000");
    assert_eq!(record["PixelSpacing"], "1.35");
    assert!(!record.contains_key("Magnification_min"));
}

#[test]
fn test_header_inference() {
    let record = parse_mdoc_str(SERIALEM_TILT_SERIES);

    assert_eq!(record["ImageDimensions_X"], "4096");
    assert_eq!(record["ImageDimensions_Y"], "4096");
    assert_eq!(record["TiltAxisAngle"], "84.9");
    assert_eq!(record["Software"], "SerialEM");
    assert_eq!(record["Imaging"], "Brightfield");
    assert_eq!(record["EnergyFilterUsed"], "true");
    assert_eq!(record["EnergyFilterSlitWidth"], "20");
}

#[test]
fn test_tomo5_tilt_axis_and_software() {
    let content = "[T = Tomography 5.12   TiltAxisAngle = 85.3  Binning = 1]\n";
    let record = parse_mdoc_str(content);

    assert_eq!(record["TiltAxisAngle"], "85.3");
    assert_eq!(record["Software"], "Tomo5");
}

#[test]
fn test_version_overrides_title_software() {
    let content = "[T = SerialEM: Digitized on scope]\nVersion = SerialEM 4.1.0\n";
    let record = parse_mdoc_str(content);

    assert_eq!(record["Software"], "SerialEM 4.1.0");
}

#[test]
fn test_camera_used_resolved_from_index() {
    let content = "Camera0 = K3\nCamera1 = Falcon4\nCameraIndex = 1\n";
    let record = parse_mdoc_str(content);
    assert_eq!(record["CameraUsed"], "Falcon4");

    // Index before the camera list resolves to an empty value.
    let record = parse_mdoc_str("CameraIndex = 0\nCamera0 = K3\n");
    assert_eq!(record["CameraUsed"], "");
}

#[test]
fn test_imaging_modes() {
    let record = parse_mdoc_str("DarkField = 1\nMagIndex = 20\n");
    assert_eq!(record["Imaging"], "Darkfield");

    let record = parse_mdoc_str("MagIndex = 20\nEMmode = 1\n");
    assert_eq!(record["Imaging"], "Brightfield");
    assert_eq!(record["EMMode"], "EFTEM");

    let record = parse_mdoc_str("EMmode = 2\n");
    assert_eq!(record["EMMode"], "STEM");

    let record = parse_mdoc_str("EMmode = 3\n");
    assert_eq!(record["Imaging"], "Diffraction");
    assert!(!record.contains_key("EMMode"));
}

#[test]
fn test_single_section_has_no_increment() {
    let record = parse_mdoc_str("[ZValue = 0]\nTiltAngle = 5\n");

    assert_eq!(record["TiltAngle"], "5");
    assert_eq!(number(&record, "NumberOfTilts"), 1.0);
    assert!(!record.contains_key("Tilt_increment"));
}

#[test]
fn test_non_numeric_divergence_keeps_first_value() {
    let record = parse_mdoc_str("SubFramePath = a.tif\nSubFramePath = b.tif\n");

    assert_eq!(record["SubFramePath"], "a.tif");
    assert!(!record.contains_key("SubFramePath_min"));
}

#[test]
fn test_crlf_and_malformed_lines() {
    let record = parse_mdoc_str("Voltage = 300\r\nno separator here\r\n = orphan\r\nEmpty =\r\n");

    assert_eq!(record["Voltage"], "300");
    assert!(!record.contains_key("Empty"));
    assert!(!record.contains_key(""));
}

#[test]
fn test_parse_file_matches_str_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("series.mdoc");
    std::fs::write(&path, SERIALEM_TILT_SERIES).unwrap();

    let first = parse_mdoc_file(&path).unwrap();
    let second = parse_mdoc_file(&path).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, parse_mdoc_str(SERIALEM_TILT_SERIES));
}

#[test]
fn test_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(parse_mdoc_file(dir.path().join("absent.mdoc")).is_err());
}
