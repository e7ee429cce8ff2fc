//! テキスト類似度モジュール
//!
//! 症状テキスト照合に使う3種類の類似度（すべて大文字小文字を区別しない）:
//! 1. 文字頻度ベクトルのコサイン類似度
//! 2. 単語の一致率
//! 3. バイグラムの一致率
//!
//! いずれも0.0〜1.0を返し、空文字列が含まれる場合は0.0。

use std::collections::HashSet;

/// 文字頻度類似度の重み
pub const CHAR_WEIGHT: f64 = 0.3;
/// 単語一致率の重み
pub const KEYWORD_WEIGHT: f64 = 0.5;
/// バイグラム一致率の重み
pub const BIGRAM_WEIGHT: f64 = 0.2;

const ALPHABET_LEN: usize = 26;

/// 英小文字の出現頻度ベクトル（合計1に正規化、英字以外は無視）
pub fn char_frequency_vector(text: &str) -> [f64; ALPHABET_LEN] {
    let mut vector = [0.0; ALPHABET_LEN];

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() {
            vector[(c as u8 - b'a') as usize] += 1.0;
        }
    }

    let sum: f64 = vector.iter().sum();
    if sum > 0.0 {
        for v in vector.iter_mut() {
            *v /= sum;
        }
    }

    vector
}

/// コサイン類似度（どちらかがゼロベクトルなら0.0）
fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// 文字頻度のコサイン類似度
pub fn char_frequency_similarity(a: &str, b: &str) -> f64 {
    cosine(&char_frequency_vector(a), &char_frequency_vector(b))
}

/// 単語一致率
///
/// `query` の単語のうち `candidate` にも含まれるものを出現ごとに数え、
/// 長い方の単語数で割る。
pub fn keyword_similarity(query: &str, candidate: &str) -> f64 {
    let query_lower = query.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    let query_words: Vec<&str> = query_lower.split_whitespace().collect();
    let candidate_words: Vec<&str> = candidate_lower.split_whitespace().collect();

    overlap_ratio(&query_words, &candidate_words)
}

/// 連続2文字の一覧
pub fn bigrams(text: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = text.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

/// バイグラム一致率
pub fn bigram_similarity(query: &str, candidate: &str) -> f64 {
    let query_bigrams = bigrams(&query.to_lowercase());
    let candidate_bigrams = bigrams(&candidate.to_lowercase());

    overlap_ratio(&query_bigrams, &candidate_bigrams)
}

/// `query` の要素のうち `candidate` に含まれる数 / 長い方の要素数
fn overlap_ratio<T: Eq + std::hash::Hash>(query: &[T], candidate: &[T]) -> f64 {
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    let lookup: HashSet<&T> = candidate.iter().collect();
    let common = query.iter().filter(|item| lookup.contains(item)).count();

    common as f64 / query.len().max(candidate.len()) as f64
}

/// 3種類の類似度の加重和
pub fn text_similarity(query: &str, candidate: &str) -> f64 {
    let char_sim = char_frequency_similarity(query, candidate);
    let keyword_sim = keyword_similarity(query, candidate);
    let bigram_sim = bigram_similarity(query, candidate);

    char_sim * CHAR_WEIGHT + keyword_sim * KEYWORD_WEIGHT + bigram_sim * BIGRAM_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_char_frequency_vector_normalized() {
        let vector = char_frequency_vector("Aab!");
        assert!(approx(vector[0], 2.0 / 3.0));
        assert!(approx(vector[1], 1.0 / 3.0));
        assert!(approx(vector.iter().sum::<f64>(), 1.0));
    }

    #[test]
    fn test_char_frequency_vector_no_letters() {
        let vector = char_frequency_vector("123 ?!");
        assert!(vector.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_char_similarity_identical() {
        for text in ["leaves", "Wilting", "yellowleavesbrownspots"] {
            assert!(approx(char_frequency_similarity(text, text), 1.0), "{}", text);
        }
    }

    #[test]
    fn test_char_similarity_case_insensitive() {
        assert!(approx(char_frequency_similarity("LEAF", "leaf"), 1.0));
    }

    #[test]
    fn test_char_similarity_disjoint_letters() {
        assert!(approx(char_frequency_similarity("aaa", "bbb"), 0.0));
    }

    #[test]
    fn test_keyword_similarity() {
        // 3語中2語が一致
        let sim = keyword_similarity("yellow leaves wilting", "Yellow Leaves");
        assert!(approx(sim, 2.0 / 3.0));
    }

    #[test]
    fn test_keyword_similarity_counts_query_repeats() {
        let sim = keyword_similarity("spots spots", "spots");
        assert!(approx(sim, 1.0));
    }

    #[test]
    fn test_bigram_similarity() {
        // "abc" -> ab, bc / "abd" -> ab, bd
        assert!(approx(bigram_similarity("abc", "abd"), 0.5));
        assert!(approx(bigram_similarity("ABC", "abc"), 1.0));
    }

    #[test]
    fn test_bigram_single_char() {
        assert!(approx(bigram_similarity("a", "abc"), 0.0));
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        for other in ["", "yellow leaves", "   "] {
            assert_eq!(char_frequency_similarity("", other), 0.0);
            assert_eq!(keyword_similarity("", other), 0.0);
            assert_eq!(bigram_similarity("", other), 0.0);
            assert_eq!(text_similarity("", other), 0.0);
            assert_eq!(text_similarity(other, ""), 0.0);
        }
    }

    #[test]
    fn test_text_similarity_identical_is_one() {
        let sim = text_similarity("yellow leaves brown spots", "yellow leaves brown spots");
        assert!(approx(sim, 1.0));
    }

    #[test]
    fn test_text_similarity_bounded() {
        let pairs = [
            ("yellow leaves with brown spots spreading fast", "yellow leaves brown spots"),
            ("white powder on leaves", "rusty pustules yellow halo"),
            ("zzz", "aaa"),
        ];
        for (a, b) in pairs {
            let sim = text_similarity(a, b);
            assert!((0.0..=1.0).contains(&sim), "{} vs {} -> {}", a, b, sim);
        }
    }
}
