//! ナレッジストア・キャッシュテスト
//!
//! JSONファイルストアの読み込みとキャッシュの動作を検証

use agri_ai_common::{CropType, DiseaseRecord, FetchError, KnowledgeStore};
use agri_ai_rust::error::AgriAiError;
use agri_ai_rust::knowledge::{CachedStore, JsonFileStore};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

const SAMPLE_KB: &str = r#"[
  {"cropType": "maize", "diseaseName": "Northern Leaf Blight", "symptoms": ["yellow leaves", "brown spots"], "treatment": "Apply fungicide"},
  {"cropType": "maize", "diseaseName": "Maize Streak Virus", "symptoms": ["yellow streaks along veins"], "treatment": "Control leafhoppers"},
  {"cropType": "beans", "diseaseName": "Bean Rust", "symptoms": ["rusty brown pustules"], "treatment": "Apply mancozeb"}
]"#;

fn write_kb(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("knowledge.json");
    std::fs::write(&path, content).expect("ナレッジベース書き込み失敗");
    path
}

/// 取得回数を数えるストア
struct CountingStore {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingStore {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

impl KnowledgeStore for CountingStore {
    fn fetch_disease_records(&self, crop_type: CropType) -> Result<Vec<DiseaseRecord>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Unavailable("offline".into()));
        }
        Ok(vec![DiseaseRecord::new(crop_type, "Test Disease", &["spots"], "Treat")])
    }
}

/// 存在しないファイルを開いた場合
#[test]
fn test_open_missing_knowledge_file() {
    let result = JsonFileStore::open(Path::new("/nonexistent/knowledge/12345.json"));
    assert!(matches!(result, Err(AgriAiError::KnowledgeBaseNotFound(_))));
}

/// 作物区分ごとの取得
#[test]
fn test_fetch_records_by_crop() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = JsonFileStore::open(&write_kb(dir.path(), SAMPLE_KB)).expect("オープン失敗");

    let maize = store.fetch_disease_records(CropType::Maize).expect("取得失敗");
    assert_eq!(maize.len(), 2);
    assert_eq!(maize[0].disease_name, "Northern Leaf Blight");
    assert_eq!(maize[1].disease_name, "Maize Streak Virus");

    let beans = store.fetch_disease_records(CropType::Beans).expect("取得失敗");
    assert_eq!(beans.len(), 1);

    // レコードのない区分は空
    let rice = store.fetch_disease_records(CropType::Rice).expect("取得失敗");
    assert!(rice.is_empty());
}

/// 未知の作物区分のレコードは other に入り、他の区分は読める
#[test]
fn test_unknown_crop_record_does_not_break_store() {
    let dir = tempdir().expect("Failed to create temp dir");
    let content = r#"[
  {"cropType": "wheat", "diseaseName": "Stem Rust", "symptoms": ["red pustules on stems"], "treatment": "Apply fungicide"},
  {"cropType": "maize", "diseaseName": "Northern Leaf Blight", "symptoms": ["yellow leaves", "brown spots"], "treatment": "Apply fungicide"}
]"#;
    let store = JsonFileStore::open(&write_kb(dir.path(), content)).expect("オープン失敗");

    let maize = store.fetch_disease_records(CropType::Maize).expect("取得失敗");
    assert_eq!(maize.len(), 1);

    let other = store.fetch_disease_records(CropType::Other).expect("取得失敗");
    assert_eq!(other.len(), 1);
    assert_eq!(other[0].disease_name, "Stem Rust");
}

/// 不正なJSONは InvalidData
#[test]
fn test_invalid_json_is_invalid_data() {
    let dir = tempdir().expect("Failed to create temp dir");
    let store = JsonFileStore::open(&write_kb(dir.path(), "{ not json")).expect("オープン失敗");

    let result = store.fetch_disease_records(CropType::Maize);
    assert!(matches!(result, Err(FetchError::InvalidData(_))));
}

/// オープン後にファイルが消えた場合は Unavailable
#[test]
fn test_removed_file_is_unavailable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_kb(dir.path(), SAMPLE_KB);
    let store = JsonFileStore::open(&path).expect("オープン失敗");

    std::fs::remove_file(&path).expect("削除失敗");

    let result = store.fetch_disease_records(CropType::Maize);
    assert!(matches!(result, Err(FetchError::Unavailable(_))));
}

/// 同じ区分の2回目はキャッシュヒット
#[test]
fn test_cache_hit() {
    let cached = CachedStore::new(CountingStore::new(false));

    let first = cached.fetch_disease_records(CropType::Maize).expect("取得失敗");
    let second = cached.fetch_disease_records(CropType::Maize).expect("取得失敗");

    assert_eq!(first, second);
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 1);

    let stats = cached.stats();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.cached_crops, 1);
}

/// 区分が違えば別エントリ
#[test]
fn test_cache_keyed_by_crop() {
    let cached = CachedStore::new(CountingStore::new(false));

    cached.fetch_disease_records(CropType::Maize).expect("取得失敗");
    cached.fetch_disease_records(CropType::Beans).expect("取得失敗");

    assert_eq!(cached.len(), 2);
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
    assert!(cached.get(CropType::Beans).is_some());
    assert!(cached.get(CropType::Rice).is_none());
}

/// 読み込み失敗はキャッシュしない
#[test]
fn test_failure_not_cached() {
    let cached = CachedStore::new(CountingStore::new(true));

    assert!(cached.fetch_disease_records(CropType::Maize).is_err());
    assert!(cached.fetch_disease_records(CropType::Maize).is_err());

    assert!(cached.is_empty());
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);
}

/// 破棄後は再取得される
#[test]
fn test_invalidate() {
    let cached = CachedStore::new(CountingStore::new(false));

    cached.fetch_disease_records(CropType::Maize).expect("取得失敗");
    assert!(cached.invalidate(CropType::Maize));
    assert!(!cached.invalidate(CropType::Maize));

    cached.fetch_disease_records(CropType::Maize).expect("取得失敗");
    assert_eq!(cached.inner().calls.load(Ordering::SeqCst), 2);

    cached.fetch_disease_records(CropType::Cotton).expect("取得失敗");
    cached.invalidate_all();
    assert!(cached.is_empty());
}

/// ファイル更新はキャッシュ破棄まで反映されない
#[test]
fn test_cached_file_store_serves_stale_until_invalidated() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = write_kb(dir.path(), SAMPLE_KB);
    let cached = CachedStore::new(JsonFileStore::open(&path).expect("オープン失敗"));

    assert_eq!(cached.fetch_disease_records(CropType::Maize).expect("取得失敗").len(), 2);

    std::fs::write(&path, "[]").expect("書き込み失敗");
    assert_eq!(cached.fetch_disease_records(CropType::Maize).expect("取得失敗").len(), 2);

    cached.invalidate(CropType::Maize);
    assert!(cached.fetch_disease_records(CropType::Maize).expect("取得失敗").is_empty());
}
