//! Tests for output module

use super::*;
use crate::model::{ArtistRow, FromBatch, Row, SongRow, SongplayRow, TimeRow};
use crate::storage::Storage;
use crate::types::SaveMode;
use crate::Error;
use arrow::array::{Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{TimeZone, Utc};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use test_case::test_case;

fn song(id: &str, artist_id: &str, year: Option<i32>) -> SongRow {
    SongRow {
        song_id: id.to_string(),
        title: Some(format!("title {id}")),
        artist_id: artist_id.to_string(),
        year,
        duration: Some(200.0),
    }
}

fn artist(id: &str, name: &str) -> ArtistRow {
    ArtistRow {
        artist_id: id.to_string(),
        name: Some(name.to_string()),
        location: Some("NY".to_string()),
        latitude: Some(40.7),
        longitude: None,
    }
}

fn writer(storage: &Storage, config: WriterConfig) -> PartitionedWriter {
    PartitionedWriter::new(storage.clone(), config)
}

// ============================================================================
// Partition Path Tests
// ============================================================================

#[test_case("2000", "2000" ; "digits")]
#[test_case("ARJIE2Y1187B994AB7", "ARJIE2Y1187B994AB7" ; "artist id")]
#[test_case("a b", "a%20b" ; "space")]
#[test_case("A/1", "A%2F1" ; "slash")]
#[test_case("x=y", "x%3Dy" ; "equals")]
#[test_case("50%", "50%25" ; "percent")]
#[test_case("é", "%C3%A9" ; "multibyte")]
#[test_case("1.5_-", "1.5_-" ; "safe punctuation")]
fn test_escape_value(raw: &str, escaped: &str) {
    assert_eq!(escape_value(raw), escaped);
    assert_eq!(unescape_value(escaped), raw);
}

#[test]
fn test_unescape_malformed_kept() {
    assert_eq!(unescape_value("100%"), "100%");
    assert_eq!(unescape_value("%zz"), "%zz");
    assert_eq!(unescape_value("%+1"), "%+1");
}

#[test]
fn test_partition_path() {
    let path = partition_path(
        &["year", "artist_id"],
        &[None, Some("A 1".to_string())],
    );
    assert_eq!(path, "year=__HIVE_DEFAULT_PARTITION__/artist_id=A%201");
}

#[test]
fn test_parse_partition_values() {
    let values =
        parse_partition_values("year=__HIVE_DEFAULT_PARTITION__/artist_id=A%2F1/part-00000.parquet");
    assert_eq!(
        values,
        vec![
            ("year".to_string(), None),
            ("artist_id".to_string(), Some("A/1".to_string())),
        ]
    );

    assert!(parse_partition_values("part-00000.parquet").is_empty());
}

#[test]
fn test_split_by_partition_sorted_and_stable() {
    let rows = vec![
        song("S1", "B", Some(2001)),
        song("S2", "A", Some(2000)),
        song("S3", "B", Some(2001)),
        song("S4", "A", None),
    ];
    let batch = SongRow::to_batch(&rows).unwrap();

    let parts = split_by_partition(&batch, SongRow::PARTITION_BY).unwrap();
    let paths: Vec<&str> = parts.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "year=2000/artist_id=A",
            "year=2001/artist_id=B",
            "year=__HIVE_DEFAULT_PARTITION__/artist_id=A",
        ]
    );

    let ids = parts[1]
        .1
        .column_by_name("song_id")
        .unwrap()
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    assert_eq!(ids.value(0), "S1");
    assert_eq!(ids.value(1), "S3");
}

#[test]
fn test_split_without_partition_columns() {
    let batch = ArtistRow::to_batch(&[artist("A1", "Art"), artist("A2", "Other")]).unwrap();
    let parts = split_by_partition(&batch, &[]).unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].0, "");
    assert_eq!(parts[0].1.num_rows(), 2);
}

#[test]
fn test_drop_and_restore_columns() {
    let batch = SongRow::to_batch(&[song("S1", "A1", Some(2000))]).unwrap();
    let data = drop_columns(&batch, SongRow::PARTITION_BY).unwrap();
    assert_eq!(data.num_columns(), 3);
    assert!(data.column_by_name("year").is_none());

    let values = parse_partition_values("year=2000/artist_id=A1/part-00000.parquet");
    let schema = SongRow::schema();
    let restored = restore_columns(&data, &values, Some(schema.as_ref())).unwrap();
    let year = restored
        .column_by_name("year")
        .unwrap()
        .as_any()
        .downcast_ref::<Int32Array>()
        .unwrap();
    assert_eq!(year.value(0), 2000);

    let rows = SongRow::from_batch(&restored).unwrap();
    assert_eq!(rows, vec![song("S1", "A1", Some(2000))]);
}

#[test]
fn test_restore_untyped_and_null() {
    let schema = Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(Int32Array::from(vec![1, 2]))]).unwrap();

    let values = vec![("dt".to_string(), Some("2018-11".to_string())), ("k".to_string(), None)];
    let restored = restore_columns(&batch, &values, None).unwrap();

    let dt = restored.column_by_name("dt").unwrap();
    assert_eq!(dt.data_type(), &DataType::Utf8);
    assert_eq!(restored.column_by_name("k").unwrap().null_count(), 2);
}

#[test]
fn test_restore_bad_value_fails() {
    let batch = drop_columns(
        &SongRow::to_batch(&[song("S1", "A1", Some(2000))]).unwrap(),
        &["year"],
    )
    .unwrap();
    let values = vec![("year".to_string(), Some("twenty".to_string()))];
    let schema = SongRow::schema();
    assert!(restore_columns(&batch, &values, Some(schema.as_ref())).is_err());
}

// ============================================================================
// Parquet Encoding Tests
// ============================================================================

#[test]
fn test_encode_batch_readable() {
    let batch = ArtistRow::to_batch(&[artist("A1", "Art")]).unwrap();
    let bytes = encode_batch(&batch, &ParquetWriterConfig::default()).unwrap();

    let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)
        .unwrap()
        .build()
        .unwrap();
    let batches: Vec<RecordBatch> = reader.collect::<std::result::Result<_, _>>().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(
        ArtistRow::from_batch(&batches[0]).unwrap(),
        vec![artist("A1", "Art")]
    );
}

#[test]
fn test_parquet_writer_counts_rows() {
    let batch = ArtistRow::to_batch(&[artist("A1", "Art"), artist("A2", "B")]).unwrap();
    let settings = crate::config::ParquetSettings {
        row_group_size: 1,
        ..Default::default()
    };
    let config = ParquetWriterConfig::from(&settings);

    let mut writer = ParquetWriter::new(batch.schema(), &config).unwrap();
    writer.write(&batch).unwrap();
    writer.write(&batch).unwrap();
    assert_eq!(writer.rows_written(), 4);

    let bytes = writer.finish().unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
    assert_eq!(builder.metadata().file_metadata().num_rows(), 4);
    assert_eq!(builder.metadata().num_row_groups(), 4);
}

#[test]
fn test_config_from_settings() {
    let settings = crate::config::ParquetSettings {
        compression: crate::types::CompressionCodec::Uncompressed,
        row_group_size: 10,
        ..Default::default()
    };
    let config = ParquetWriterConfig::from(&settings);
    let rows: Vec<ArtistRow> = (0..25).map(|i| artist(&format!("A{i}"), "Art")).collect();
    let bytes = encode_batch(&ArtistRow::to_batch(&rows).unwrap(), &config).unwrap();

    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
    let metadata = builder.metadata();
    assert_eq!(metadata.num_row_groups(), 3);
    assert_eq!(
        metadata.row_group(0).column(0).compression(),
        parquet::basic::Compression::UNCOMPRESSED
    );
}

// ============================================================================
// Partitioned Writer Tests
// ============================================================================

#[tokio::test]
async fn test_write_songs_layout() {
    let storage = Storage::in_memory();
    let rows = vec![
        song("S1", "A1", Some(2000)),
        song("S2", "A1", Some(2000)),
        song("S3", "A2", Some(1999)),
    ];

    let stats = writer(&storage, WriterConfig::default())
        .write_rows(&rows)
        .await
        .unwrap();
    assert_eq!(
        stats,
        TableWriteStats {
            table: "songs".to_string(),
            rows: 3,
            partitions: 2,
            files: 2,
        }
    );

    assert_eq!(
        storage.list("songs").await.unwrap(),
        vec![
            "songs/_SUCCESS",
            "songs/year=1999/artist_id=A2/part-00000.parquet",
            "songs/year=2000/artist_id=A1/part-00000.parquet",
        ]
    );

    // Partition columns are not stored inside the files
    let bytes = storage
        .get("songs/year=2000/artist_id=A1/part-00000.parquet")
        .await
        .unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    assert_eq!(names, vec!["song_id", "title", "duration"]);
}

#[tokio::test]
async fn test_roundtrip_restores_partition_columns() {
    let storage = Storage::in_memory();
    let rows = vec![
        song("S1", "A/1", Some(2000)),
        song("S2", "A 2", None),
        song("S3", "A3", Some(1999)),
    ];
    writer(&storage, WriterConfig::default())
        .write_rows(&rows)
        .await
        .unwrap();

    let listed = storage.list("songs").await.unwrap();
    assert!(listed.contains(&"songs/year=2000/artist_id=A%2F1/part-00000.parquet".to_string()));
    assert!(listed.contains(
        &"songs/year=__HIVE_DEFAULT_PARTITION__/artist_id=A%202/part-00000.parquet".to_string()
    ));

    let mut read: Vec<SongRow> = TableReader::new(storage).read_rows().await.unwrap();
    read.sort_by(|a, b| a.song_id.cmp(&b.song_id));
    assert_eq!(read, rows);
}

#[tokio::test]
async fn test_keep_partition_columns() {
    let storage = Storage::in_memory();
    let config = WriterConfig {
        keep_partition_columns: true,
        ..WriterConfig::default()
    };
    writer(&storage, config)
        .write_rows(&[song("S1", "A1", Some(2000))])
        .await
        .unwrap();

    let bytes = storage
        .get("songs/year=2000/artist_id=A1/part-00000.parquet")
        .await
        .unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes).unwrap();
    assert_eq!(builder.schema().fields().len(), 5);

    let read: Vec<SongRow> = TableReader::new(storage).read_rows().await.unwrap();
    assert_eq!(read, vec![song("S1", "A1", Some(2000))]);
}

#[tokio::test]
async fn test_max_rows_per_file() {
    let storage = Storage::in_memory();
    let config = WriterConfig {
        max_rows_per_file: 2,
        ..WriterConfig::default()
    };
    let rows: Vec<ArtistRow> = (0..5).map(|i| artist(&format!("A{i}"), "Art")).collect();

    let stats = writer(&storage, config).write_rows(&rows).await.unwrap();
    assert_eq!(stats.files, 3);
    assert_eq!(stats.partitions, 1);
    assert_eq!(
        storage.list("artists").await.unwrap(),
        vec![
            "artists/_SUCCESS",
            "artists/part-00000.parquet",
            "artists/part-00001.parquet",
            "artists/part-00002.parquet",
        ]
    );

    let read: Vec<ArtistRow> = TableReader::new(storage).read_rows().await.unwrap();
    assert_eq!(read, rows);
}

#[tokio::test]
async fn test_time_partitions_by_year_month() {
    let storage = Storage::in_memory();
    let rows = vec![
        TimeRow::new(Utc.with_ymd_and_hms(2018, 11, 2, 1, 25, 34).unwrap()),
        TimeRow::new(Utc.with_ymd_and_hms(2018, 12, 31, 23, 0, 0).unwrap()),
        TimeRow::new(Utc.with_ymd_and_hms(2018, 11, 30, 0, 0, 0).unwrap()),
    ];
    let stats = writer(&storage, WriterConfig::default())
        .write_rows(&rows)
        .await
        .unwrap();
    assert_eq!(stats.partitions, 2);

    let files = storage.list("time").await.unwrap();
    assert_eq!(
        files,
        vec![
            "time/_SUCCESS",
            "time/year=2018/month=11/part-00000.parquet",
            "time/year=2018/month=12/part-00000.parquet",
        ]
    );
}

#[tokio::test]
async fn test_empty_table_writes_marker_only() {
    let storage = Storage::in_memory();
    let stats = writer(&storage, WriterConfig::default())
        .write_rows::<SongplayRow>(&[])
        .await
        .unwrap();
    assert_eq!((stats.rows, stats.partitions, stats.files), (0, 0, 0));
    assert_eq!(
        storage.list("songplays").await.unwrap(),
        vec!["songplays/_SUCCESS"]
    );

    let summary = TableReader::new(storage).summarize("songplays").await.unwrap();
    assert!(summary.materialized);
    assert_eq!(summary.rows, 0);
}

#[tokio::test]
async fn test_unknown_partition_column() {
    let storage = Storage::in_memory();
    let batch = ArtistRow::to_batch(&[artist("A1", "Art")]).unwrap();

    let err = writer(&storage, WriterConfig::default())
        .write_table("artists", &batch, &["country"])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Write { ref table, .. } if table == "artists"));
    assert!(err.to_string().contains("country"));
    assert!(storage.list("artists").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_if_exists_conflict() {
    let storage = Storage::in_memory();
    let config = WriterConfig {
        save_mode: SaveMode::ErrorIfExists,
        ..WriterConfig::default()
    };
    let rows = vec![artist("A1", "Art")];

    writer(&storage, config.clone()).write_rows(&rows).await.unwrap();
    let err = writer(&storage, config).write_rows(&rows).await.unwrap_err();
    assert!(matches!(err, Error::Write { .. }));
    assert!(err.to_string().contains("partition conflict"));
}

#[tokio::test]
async fn test_overwrite_removes_stale_files() {
    let storage = Storage::in_memory();
    let w = writer(&storage, WriterConfig::default());

    w.write_rows(&[song("S1", "A1", Some(1990))]).await.unwrap();
    w.write_rows(&[song("S2", "A2", Some(2000))]).await.unwrap();

    assert_eq!(
        storage.list("songs").await.unwrap(),
        vec![
            "songs/_SUCCESS",
            "songs/year=2000/artist_id=A2/part-00000.parquet",
        ]
    );
}

#[tokio::test]
async fn test_rewrite_is_byte_identical() {
    let rows = vec![song("S1", "A1", Some(2000)), song("S2", "A2", None)];

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let storage = Storage::in_memory();
        writer(&storage, WriterConfig::default())
            .write_rows(&rows)
            .await
            .unwrap();
        let mut files = Vec::new();
        for path in storage.list("").await.unwrap() {
            let bytes = storage.get(&path).await.unwrap();
            files.push((path, bytes));
        }
        outputs.push(files);
    }
    assert_eq!(outputs[0], outputs[1]);
}

// ============================================================================
// Table Reader Tests
// ============================================================================

#[tokio::test]
async fn test_read_requires_marker() {
    let storage = Storage::in_memory();
    let batch = ArtistRow::to_batch(&[artist("A1", "Art")]).unwrap();
    let bytes = encode_batch(&batch, &ParquetWriterConfig::default()).unwrap();
    storage
        .put("artists/part-00000.parquet", bytes)
        .await
        .unwrap();

    let err = TableReader::new(storage)
        .read_rows::<ArtistRow>()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Join { ref table, .. } if table == "artists"));
    assert_eq!(err.kind(), "JoinError");
}

#[tokio::test]
async fn test_read_schema_mismatch_is_join_error() {
    let storage = Storage::in_memory();
    // A songs table whose files lack `artist_id`
    let schema = Arc::new(Schema::new(vec![Field::new("song_id", DataType::Utf8, false)]));
    let batch =
        RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(vec!["S1"]))]).unwrap();
    writer(&storage, WriterConfig::default())
        .write_table("songs", &batch, &[])
        .await
        .unwrap();

    let err = TableReader::new(storage)
        .read_rows::<SongRow>()
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Join { .. }));
    assert!(err.to_string().contains("missing column"));
}

#[tokio::test]
async fn test_summarize() {
    let storage = Storage::in_memory();
    let rows = vec![
        song("S1", "A1", Some(2000)),
        song("S2", "A1", Some(2000)),
        song("S3", "A2", Some(2001)),
    ];
    writer(&storage, WriterConfig::default())
        .write_rows(&rows)
        .await
        .unwrap();

    let reader = TableReader::new(storage).with_concurrency(2);
    assert_eq!(
        reader.summarize("songs").await.unwrap(),
        TableSummary {
            table: "songs".to_string(),
            materialized: true,
            rows: 3,
            partitions: 2,
            files: 2,
        }
    );

    let missing = reader.summarize("users").await.unwrap();
    assert!(!missing.materialized);
    assert_eq!(missing.files, 0);
}

#[tokio::test]
async fn test_summarize_corrupt_footer() {
    let storage = Storage::in_memory();
    storage
        .put("songs/year=2000/part-00000.parquet", bytes::Bytes::from_static(b"not parquet"))
        .await
        .unwrap();
    storage
        .put(&format!("songs/{SUCCESS_MARKER}"), bytes::Bytes::new())
        .await
        .unwrap();

    let err = TableReader::new(storage).summarize("songs").await.unwrap_err();
    assert!(matches!(err, Error::Join { .. }));
    assert!(err.to_string().contains("unreadable footer"));
}

#[tokio::test]
async fn test_roundtrip_keeps_row_order() {
    let storage = Storage::in_memory();
    let rows = vec![song("S2", "A1", Some(2000)), song("S1", "A1", Some(2000))];
    writer(&storage, WriterConfig::default())
        .write_rows(&rows)
        .await
        .unwrap();

    // Rows keep extraction order inside a partition
    let read: Vec<SongRow> = TableReader::new(storage).read_rows().await.unwrap();
    let ids: Vec<&str> = read.iter().map(|s| s.song_id.as_str()).collect();
    assert_eq!(ids, vec!["S2", "S1"]);
}
