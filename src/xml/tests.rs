use super::*;

const EPU_IMAGE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<MicroscopeImage xmlns="http://schemas.datacontract.org/2004/07/Fei.SharedObjects" xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
  <name>FoilHole_1234_Data_5678</name>
  <uniqueID>0c5e1f2a-9a1b-4c38-8d7e-1f2e3d4c5b6a</uniqueID>
  <microscopeData>
    <acquisition>
      <acquisitionDateTime>2024-03-05T10:15:00.1234567+01:00</acquisitionDateTime>
    </acquisition>
    <optics>
      <SphericalAberration>2.7</SphericalAberration>
      <BeamShift>
        <a:_x xmlns:a="http://schemas.datacontract.org/2004/07/System.Windows">0.0012</a:_x>
        <a:_y xmlns:a="http://schemas.datacontract.org/2004/07/System.Windows">-0.0031</a:_y>
      </BeamShift>
    </optics>
    <stage>
      <Position><X>1.5</X><Y></Y></Position>
    </stage>
  </microscopeData>
  <CustomData xmlns:a="http://schemas.microsoft.com/2003/10/Serialization/Arrays">
    <a:KeyValueOfstringanyType>
      <a:Key>AppliedDefocus</a:Key>
      <a:Value i:type="b:double" xmlns:b="http://www.w3.org/2001/XMLSchema">-1.5E-06</a:Value>
    </a:KeyValueOfstringanyType>
    <a:KeyValueOfstringanyType>
      <a:Key>Detectors[EF-CCD].ExposureDose</a:Key>
      <a:Value i:type="b:double" xmlns:b="http://www.w3.org/2001/XMLSchema">42.1</a:Value>
    </a:KeyValueOfstringanyType>
  </CustomData>
</MicroscopeImage>"#;

#[test]
fn test_flatten_simple_leaf() {
    let record = flatten_bytes(b"<Stage><X>1.5</X><Y></Y><Z/></Stage>").unwrap();

    assert_eq!(record.len(), 1);
    assert_eq!(record["Stage.X"], "1.5");
}

#[test]
fn test_elements_with_children_drop_their_text() {
    let record = flatten_bytes(b"<Root>mixed<Child> inner </Child>tail</Root>").unwrap();

    assert_eq!(record.len(), 1);
    assert_eq!(record["Root.Child"], "inner");
}

#[test]
fn test_escaped_and_cdata_text() {
    let record =
        flatten_bytes(b"<R><A>a &amp; b</A><B><![CDATA[x < y]]></B></R>").unwrap();

    assert_eq!(record["R.A"], "a & b");
    assert_eq!(record["R.B"], "x < y");
}

#[test]
fn test_microscope_image_document() {
    let record = flatten_bytes(EPU_IMAGE.as_bytes()).unwrap();

    assert_eq!(record["MicroscopeImage.Name"], "FoilHole_1234_Data_5678");
    assert_eq!(
        record["MicroscopeImage.UniqueID"],
        "0c5e1f2a-9a1b-4c38-8d7e-1f2e3d4c5b6a"
    );
    assert_eq!(
        record["MicroscopeImage.microscopeData.optics.SphericalAberration"],
        "2.7"
    );
    // Namespace prefixes are dropped from paths.
    assert_eq!(
        record["MicroscopeImage.microscopeData.optics.BeamShift._x"],
        "0.0012"
    );
    assert_eq!(
        record["MicroscopeImage.microscopeData.stage.Position.X"],
        "1.5"
    );
    assert!(!record.contains_key("MicroscopeImage.microscopeData.stage.Position.Y"));

    assert_eq!(record["AppliedDefocus"], "-1.5E-06");
    assert_eq!(record["Detectors[EF-CCD].ExposureDose"], "42.1");
}

#[test]
fn test_custom_data_only_for_microscope_image_root() {
    let doc = b"<Other><CustomData><KeyValueOfstringanyType><Key>K</Key><Value>V</Value></KeyValueOfstringanyType></CustomData></Other>";
    let record = flatten_bytes(doc).unwrap();

    assert!(!record.contains_key("K"));
    assert!(!record.contains_key("MicroscopeImage.Name"));
    assert_eq!(record["Other.CustomData.KeyValueOfstringanyType.Key"], "K");
}

#[test]
fn test_flatten_is_idempotent() {
    let first = flatten_bytes(EPU_IMAGE.as_bytes()).unwrap();
    let second = flatten_bytes(EPU_IMAGE.as_bytes()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_malformed_documents() {
    assert!(flatten_bytes(b"<A><B></A>").is_err());
    assert!(matches!(
        flatten_bytes(b"<A><B>text</B>"),
        Err(XmlError::UnclosedElement(_)) | Err(XmlError::XmlError(_))
    ));
    assert!(matches!(
        flatten_bytes(b"   "),
        Err(XmlError::EmptyDocument)
    ));
}

#[test]
fn test_batch_position_manifest_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("BatchPositionsList.xml");
    std::fs::write(&path, "not even xml").unwrap();

    assert!(flatten_file(&path).unwrap().is_none());
}

#[test]
fn test_flatten_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = flatten_file(dir.path().join("missing.xml"));
    assert!(matches!(result, Err(XmlError::IoError(_))));
}

fn nested(depth: usize) -> String {
    format!("{}x{}", "<a>".repeat(depth), "</a>".repeat(depth))
}

#[test]
fn test_nesting_up_to_limit_is_flattened() {
    let record = flatten_bytes(nested(tree::MAX_DEPTH).as_bytes()).unwrap();

    assert_eq!(record.len(), 1);
    assert_eq!(record.values().next().map(String::as_str), Some("x"));
}

#[test]
fn test_excessive_nesting_is_rejected() {
    let result = flatten_bytes(nested(200_000).as_bytes());

    assert!(matches!(
        result,
        Err(XmlError::TooDeep(limit)) if limit == tree::MAX_DEPTH
    ));
}
