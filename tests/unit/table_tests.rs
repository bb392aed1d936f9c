/*!
 * Tests for record table loading and saving
 */

use anyhow::Result;
use coltrans::table::{RecordFormat, RecordTable};
use serde_json::json;
use crate::common;

/// Load a JSON array file
#[test]
fn test_load_withJsonFile_shouldReadRecordsInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_records(temp_dir.path(), "records.json")?;

    let table = RecordTable::load(&path)?;
    assert_eq!(table.format(), RecordFormat::Json);
    assert_eq!(table.len(), 4);
    assert_eq!(table.text_column("text")?, common::sample_texts());
    assert_eq!(table.rows()[2]["id"], json!(3));

    Ok(())
}

/// Load a JSON Lines file
#[test]
fn test_load_withJsonLinesFile_shouldReadOneRecordPerLine() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "records.jsonl",
        "{\"text\": \"uno\"}\n{\"text\": \"dos\"}\n{\"text\": \"tres\"}\n",
    )?;

    let table = RecordTable::load(&path)?;
    assert_eq!(table.format(), RecordFormat::JsonLines);
    assert_eq!(table.text_column("text")?, vec!["uno", "dos", "tres"]);

    Ok(())
}

/// Unknown extensions and bad content are rejected
#[test]
fn test_load_withUnsupportedOrBrokenFiles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let csv = common::create_test_file(temp_dir.path(), "records.csv", "text\nhello\n")?;
    assert!(RecordTable::load(&csv).is_err());

    let broken = common::create_test_file(temp_dir.path(), "broken.jsonl", "{\"text\": \"a\"}\nnot json\n")?;
    assert!(RecordTable::load(&broken).is_err());

    assert!(RecordTable::load(temp_dir.path().join("missing.json")).is_err());

    Ok(())
}

/// Saving converts to the format of the output path
#[test]
fn test_save_withDifferentExtension_shouldConvertFormat() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_records(temp_dir.path(), "records.json")?;
    let output = temp_dir.path().join("records.jsonl");

    let mut table = RecordTable::load(&input)?;
    table.set_text_column("translated_text", vec!["a".into(), "b".into(), "c".into(), "d".into()])?;
    table.save(&output)?;

    let content = std::fs::read_to_string(&output)?;
    assert_eq!(content.lines().count(), 4);

    let reloaded = RecordTable::load(&output)?;
    assert_eq!(reloaded.text_column("translated_text")?, vec!["a", "b", "c", "d"]);
    assert_eq!(reloaded.text_column("text")?, common::sample_texts());

    Ok(())
}

/// Columns are written by position, other fields untouched
#[test]
fn test_set_column_withStatusValues_shouldKeepOtherFields() -> Result<()> {
    let mut table = RecordTable::from_texts("text", &common::sample_texts());
    table.set_column("status", vec![json!("translated"); 4])?;

    assert!(table.rows().iter().all(|row| row["status"] == json!("translated")));
    assert_eq!(table.text_column("text")?, common::sample_texts());

    Ok(())
}
