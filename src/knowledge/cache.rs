//! ナレッジ読み込みキャッシュモジュール
//!
//! 作物区分をキーにして取得済みの病害レコードを保持し、
//! 同じ区分の再読み込みをスキップする。
//!
//! - 読み込み失敗はキャッシュしない（次回の取得で再試行される）
//! - 内容の鮮度は呼び出し側が `invalidate` / `invalidate_all` で管理する

use agri_ai_common::{CropType, DiseaseRecord, FetchError, KnowledgeStore};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// キャッシュ付きナレッジストア
#[derive(Debug)]
pub struct CachedStore<S> {
    inner: S,
    /// 作物区分 → 取得済みレコード
    entries: RwLock<HashMap<CropType, Vec<DiseaseRecord>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// キャッシュの統計情報
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// キャッシュ済みの作物区分数
    pub cached_crops: usize,
    pub hits: usize,
    pub misses: usize,
}

impl<S: KnowledgeStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// キャッシュをルックアップ
    pub fn get(&self, crop_type: CropType) -> Option<Vec<DiseaseRecord>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(&crop_type).cloned()
    }

    /// 作物区分のキャッシュを破棄（破棄した場合 true）
    pub fn invalidate(&self, crop_type: CropType) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(&crop_type).is_some()
    }

    /// 全キャッシュを破棄
    pub fn invalidate_all(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.clear();
    }

    /// キャッシュ済みの作物区分数
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            cached_crops: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<S: KnowledgeStore> KnowledgeStore for CachedStore<S> {
    fn fetch_disease_records(
        &self,
        crop_type: CropType,
    ) -> Result<Vec<DiseaseRecord>, FetchError> {
        if let Some(records) = self.get(crop_type) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(crop = %crop_type, "knowledge cache hit");
            return Ok(records);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let records = self.inner.fetch_disease_records(crop_type)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(crop_type, records.clone());
        Ok(records)
    }
}
