// src/services/search.rs

//! Fuzzy keyword search over stored papers.
//!
//! Candidates are first narrowed by a substring filter in the store, then
//! kept only if every keyword's stem appears among the stems of the title.
//! Results are ordered by curatorial preference, not textual relevance.
//!
//! > Example: `["exploit"]` matches "Exploiting Kernel Races" since both
//! > stem to `exploit`, while `["race"]` drops "Execution Traces" even though
//! > the substring filter let it through.

use std::cmp::Ordering;
use std::collections::HashSet;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::models::PaperRecord;
use crate::storage::{PaperFilter, PaperStore};

/// Keyword search engine.
pub struct FuzzySearch {
    stemmer: Stemmer,
}

impl FuzzySearch {
    /// Create a search engine using the English Snowball stemmer.
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    /// Papers matching all `keywords`, ranked.
    ///
    /// `search_abstract` moves the substring prefilter from titles to
    /// abstracts; stem matching always runs on titles. An empty keyword list
    /// returns every stored paper.
    pub fn search(
        &self,
        store: &dyn PaperStore,
        keywords: &[String],
        search_abstract: bool,
    ) -> Result<Vec<PaperRecord>> {
        let filter = if search_abstract {
            PaperFilter::abstract_contains(keywords)
        } else {
            PaperFilter::title_contains(keywords)
        };
        let candidates = store.query(&filter)?;
        log::debug!("{} candidates after substring filter", candidates.len());

        let stemmed_keywords: Vec<Vec<String>> =
            keywords.iter().map(|k| self.stems(k)).collect();

        let mut papers: Vec<PaperRecord> = candidates
            .into_iter()
            .filter(|paper| self.title_matches(&paper.title, &stemmed_keywords))
            .collect();

        rank(&mut papers);
        Ok(papers)
    }

    /// Whether the stemmed title covers every stemmed keyword.
    fn title_matches(&self, title: &str, stemmed_keywords: &[Vec<String>]) -> bool {
        let title_stems: HashSet<String> = self.stems(title).into_iter().collect();
        stemmed_keywords
            .iter()
            .flatten()
            .all(|stem| title_stems.contains(stem))
    }

    /// Lowercase, split into Unicode words and stem each word.
    fn stems(&self, text: &str) -> Vec<String> {
        let normalized = text.to_lowercase();

        normalized
            .unicode_words()
            .map(|word| self.stemmer.stem(word).into_owned())
            .collect()
    }
}

impl Default for FuzzySearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort by year (newest first), then by conference priority.
///
/// Papers tied on both keep their relative order.
pub fn rank(papers: &mut [PaperRecord]) {
    papers.sort_by(compare_rank);
}

fn compare_rank(a: &PaperRecord, b: &PaperRecord) -> Ordering {
    b.year
        .cmp(&a.year)
        .then_with(|| a.conference.rank().cmp(&b.conference.rank()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Conference;
    use crate::storage::SqliteStore;

    fn paper(conference: Conference, year: i32, title: &str) -> PaperRecord {
        PaperRecord {
            conference,
            year,
            title: title.to_string(),
            authors: vec!["Alice".to_string()],
            abstract_text: String::new(),
        }
    }

    fn store_with(papers: &[PaperRecord]) -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        for paper in papers {
            store.save(paper).unwrap();
        }
        store
    }

    fn keywords(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_stem_match() {
        let store = store_with(&[
            paper(Conference::Ndss, 2020, "Exploiting Kernel Races"),
            paper(Conference::Ndss, 2020, "Kernel Design"),
        ]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["exploit"]), false)
            .unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Exploiting Kernel Races");
    }

    #[test]
    fn test_substring_without_word_match_is_rejected() {
        // "race" is a substring of "Traces" but not a stemmed word of it.
        let store = store_with(&[paper(Conference::Ccs, 2019, "Execution Traces")]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["race"]), false)
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_keywords_are_conjunctive() {
        let store = store_with(&[
            paper(Conference::Usenix, 2021, "Linux Kernel Fuzzing"),
            paper(Conference::Usenix, 2021, "Linux Desktop Security"),
        ]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["linux", "kernel"]), false)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Linux Kernel Fuzzing");
    }

    #[test]
    fn test_year_dominates_ranking() {
        let store = store_with(&[
            paper(Conference::Ndss, 2020, "Kernel A"),
            paper(Conference::Ccs, 2021, "Kernel B"),
        ]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["kernel"]), false)
            .unwrap();
        assert_eq!(hits[0].conference, Conference::Ccs);
        assert_eq!(hits[1].conference, Conference::Ndss);
    }

    #[test]
    fn test_conference_priority_breaks_year_ties() {
        let store = store_with(&[
            paper(Conference::Ccs, 2020, "Kernel A"),
            paper(Conference::Usenix, 2020, "Kernel B"),
            paper(Conference::Ndss, 2020, "Kernel C"),
            paper(Conference::SecurityPrivacy, 2020, "Kernel D"),
        ]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["kernel"]), false)
            .unwrap();
        let order: Vec<Conference> = hits.iter().map(|p| p.conference).collect();
        assert_eq!(
            order,
            vec![
                Conference::Ndss,
                Conference::SecurityPrivacy,
                Conference::Usenix,
                Conference::Ccs
            ]
        );
    }

    #[test]
    fn test_empty_keywords_list_everything() {
        let store = store_with(&[
            paper(Conference::Ccs, 2019, "Old"),
            paper(Conference::Ndss, 2022, "New"),
            paper(Conference::Usenix, 2022, "Also New"),
        ]);

        let hits = FuzzySearch::new().search(&store, &[], false).unwrap();
        let titles: Vec<&str> = hits.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Also New", "Old"]);
    }

    #[test]
    fn test_abstract_prefilter_still_matches_titles() {
        let mut in_both = paper(Conference::Ndss, 2021, "Kernel Hardening");
        in_both.abstract_text = "We harden the kernel.".to_string();
        let mut abstract_only = paper(Conference::Ndss, 2021, "Memory Safety");
        abstract_only.abstract_text = "A kernel allocator.".to_string();
        let store = store_with(&[in_both, abstract_only]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["kernel"]), true)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Kernel Hardening");
    }

    #[test]
    fn test_multi_word_keyword() {
        let store = store_with(&[paper(
            Conference::SecurityPrivacy,
            2023,
            "Finding Use-After-Free Bugs",
        )]);

        let hits = FuzzySearch::new()
            .search(&store, &keywords(&["use-after-free"]), false)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }
}
