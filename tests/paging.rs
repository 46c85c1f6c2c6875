//! Paginated list controller tests
//!
//! Driven by `ScriptedCatalog`, which answers from a per-query script.

use hondana::catalog::MangaQuery;
use hondana::filter::{FilterSelection, MatchMode};
use hondana::paging::{AuthorList, LoadOutcome, MangaList, SkipReason};
use hondana::Error;
use std::sync::Arc;
use std::time::Duration;

mod common;
use common::{author, init_tracing, manga_batch, Reply, ScriptedCatalog, PAGE_SIZE};

fn best_list(catalog: &Arc<ScriptedCatalog>) -> MangaList {
    init_tracing();
    MangaList::for_manga(catalog.clone(), PAGE_SIZE)
}

#[cfg(test)]
mod accumulation_tests {
    use super::*;

    #[tokio::test]
    async fn test_pages_accumulate_and_force_reload_replaces() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Items(manga_batch(6, 5)));
        let list = best_list(&catalog);

        let first = list.load_next_page_if_needed(None).await.unwrap();
        assert_eq!(first, LoadOutcome::Replaced { page: 1, count: 5 });

        let last = list.snapshot().items.last().cloned().unwrap();
        let second = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(second, LoadOutcome::Appended { page: 2, count: 5 });

        let snapshot = list.snapshot();
        assert_eq!(snapshot.items.len(), 10);
        assert_eq!(snapshot.page, 2);
        let ids: Vec<i64> = snapshot.items.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());

        let reload = list.load_page(1, true).await.unwrap();
        assert_eq!(reload, LoadOutcome::Replaced { page: 1, count: 5 });
        assert_eq!(list.snapshot().items.len(), 5);
        assert_eq!(list.snapshot().page, 1);
    }

    #[tokio::test]
    async fn test_empty_page_ends_pagination() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Items(manga_batch(6, 5)));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let last = list.snapshot().items.last().cloned().unwrap();
        list.load_next_page_if_needed(Some(&last)).await.unwrap();

        // Page 3 is unscripted, so empty
        let last = list.snapshot().items.last().cloned().unwrap();
        let end = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(end, LoadOutcome::ReachedEnd { page: 3 });
        assert!(list.is_last_page());
        assert_eq!(list.snapshot().items.len(), 10);
        assert_eq!(catalog.request_count(), 3);

        let again = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(again, LoadOutcome::Skipped(SkipReason::LastPage));
        let direct = list.load_page(4, false).await.unwrap();
        assert_eq!(direct, LoadOutcome::Skipped(SkipReason::LastPage));
        assert_eq!(catalog.request_count(), 3);
    }

    #[tokio::test]
    async fn test_short_page_is_not_the_end() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 2)));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();

        assert!(!list.is_last_page());
    }

    #[tokio::test]
    async fn test_empty_first_page_clears_items() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let list = best_list(&catalog);

        let outcome = list.load_next_page_if_needed(None).await.unwrap();

        assert_eq!(outcome, LoadOutcome::ReachedEnd { page: 1 });
        assert!(list.snapshot().items.is_empty());
        assert!(list.is_last_page());
    }

    #[tokio::test]
    async fn test_only_last_item_triggers_next_page() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let middle = list.snapshot().items[2].clone();

        let outcome = list.load_next_page_if_needed(Some(&middle)).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Skipped(SkipReason::NotAtEnd));
        assert_eq!(catalog.request_count(), 1);
    }

    #[tokio::test]
    async fn test_page_number_comes_from_response() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::ItemsAsPage(manga_batch(6, 5), 3));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let last = list.snapshot().items.last().cloned().unwrap();
        let outcome = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { page: 3, count: 5 });

        let last = list.snapshot().items.last().cloned().unwrap();
        list.load_next_page_if_needed(Some(&last)).await.unwrap();

        let requested: Vec<u32> = catalog.requests().into_iter().map(|(_, page)| page).collect();
        assert_eq!(requested, vec![1, 2, 4]);
    }
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;

    #[tokio::test]
    async fn test_second_load_is_skipped_while_in_flight() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .delay(&MangaQuery::Best, Duration::from_millis(50));
        let list = best_list(&catalog);

        let (first, second) = tokio::join!(
            list.load_next_page_if_needed(None),
            list.load_next_page_if_needed(None)
        );

        assert_eq!(first.unwrap(), LoadOutcome::Replaced { page: 1, count: 5 });
        assert_eq!(second.unwrap(), LoadOutcome::Skipped(SkipReason::InFlight));
        assert_eq!(catalog.request_count(), 1);
    }

    #[tokio::test]
    async fn test_response_for_abandoned_context_is_dropped() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let action = MangaQuery::Genre("Action".to_string());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&action, 1, Reply::Items(manga_batch(100, 3)))
            .delay(&MangaQuery::Best, Duration::from_millis(200));
        let list = best_list(&catalog);

        let (stale, fresh) = tokio::join!(list.load_next_page_if_needed(None), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            list.filter_genre("Action").await
        });

        let stale = stale.unwrap();
        assert!(
            matches!(stale, LoadOutcome::Cancelled | LoadOutcome::Discarded),
            "unexpected outcome {:?}",
            stale
        );
        assert_eq!(fresh.unwrap(), LoadOutcome::Replaced { page: 1, count: 3 });

        let snapshot = list.snapshot();
        assert_eq!(snapshot.query, action);
        let ids: Vec<i64> = snapshot.items.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![100, 101, 102]);
        assert!(!snapshot.loading);
    }

    #[tokio::test]
    async fn test_forced_reload_supersedes_pending_load() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .delay(&MangaQuery::Best, Duration::from_millis(100));
        let list = best_list(&catalog);

        let (pending, refreshed) = tokio::join!(list.load_page(1, false), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            list.refresh().await
        });

        assert!(matches!(
            pending.unwrap(),
            LoadOutcome::Cancelled | LoadOutcome::Discarded
        ));
        assert_eq!(refreshed.unwrap(), LoadOutcome::Replaced { page: 1, count: 5 });
        assert_eq!(list.snapshot().items.len(), 5);
    }

    #[tokio::test]
    async fn test_dropped_load_clears_loading() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .delay(&MangaQuery::Best, Duration::from_millis(100));
        let list = best_list(&catalog);
        let mut updates = list.subscribe();

        let timed_out =
            tokio::time::timeout(Duration::from_millis(10), list.load_page(1, false)).await;
        assert!(timed_out.is_err());

        assert!(!list.is_loading());
        assert!(!updates.borrow_and_update().loading);

        // The aborted request never lands in the list
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(list.snapshot().items.is_empty());

        let retry = list.load_page(1, false).await.unwrap();
        assert_eq!(retry, LoadOutcome::Replaced { page: 1, count: 5 });
        assert_eq!(catalog.request_count(), 2);
    }

    #[tokio::test]
    async fn test_load_losing_a_select_is_rolled_back() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Items(manga_batch(6, 5)));
        let list = best_list(&catalog);
        list.load_next_page_if_needed(None).await.unwrap();

        catalog.delay(&MangaQuery::Best, Duration::from_millis(100));
        let last = list.snapshot().items.last().cloned().unwrap();
        tokio::select! {
            _ = list.load_next_page_if_needed(Some(&last)) => panic!("load should lose the race"),
            _ = tokio::time::sleep(Duration::from_millis(10)) => {}
        }

        let snapshot = list.snapshot();
        assert!(!snapshot.loading);
        assert_eq!(snapshot.items.len(), 5);
        assert_eq!(snapshot.page, 1);

        let next = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(next, LoadOutcome::Appended { page: 2, count: 5 });
    }

    #[tokio::test]
    async fn test_cancel_leaves_list_untouched() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Items(manga_batch(6, 5)));
        let list = best_list(&catalog);
        list.load_next_page_if_needed(None).await.unwrap();

        catalog.delay(&MangaQuery::Best, Duration::from_millis(200));
        let last = list.snapshot().items.last().cloned().unwrap();
        let (outcome, _) = tokio::join!(list.load_next_page_if_needed(Some(&last)), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            list.cancel();
        });

        assert_eq!(outcome.unwrap(), LoadOutcome::Cancelled);
        let snapshot = list.snapshot();
        assert_eq!(snapshot.items.len(), 5);
        assert_eq!(snapshot.page, 1);
        assert!(!snapshot.loading);
        assert!(!snapshot.last_page);
    }
}

#[cfg(test)]
mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn test_undecodable_page_stops_pagination() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Undecodable);
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let last = list.snapshot().items.last().cloned().unwrap();
        let outcome = list.load_next_page_if_needed(Some(&last)).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Undecodable);
        assert!(list.is_last_page());
        assert!(!list.is_loading());
        assert_eq!(list.snapshot().items.len(), 5);
    }

    #[tokio::test]
    async fn test_cancellation_error_is_a_no_op() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Cancelled);
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let before = list.snapshot();
        let last = before.items.last().cloned().unwrap();
        let outcome = list.load_next_page_if_needed(Some(&last)).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Cancelled);
        assert_eq!(list.snapshot(), before);
    }

    #[tokio::test]
    async fn test_transport_error_is_returned() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&MangaQuery::Best, 2, Reply::Unavailable);
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let last = list.snapshot().items.last().cloned().unwrap();
        let result = list.load_next_page_if_needed(Some(&last)).await;

        assert!(matches!(result, Err(Error::Source { .. })));
        let snapshot = list.snapshot();
        assert!(!snapshot.loading);
        assert!(!snapshot.last_page);
        assert_eq!(snapshot.items.len(), 5);
        assert_eq!(snapshot.page, 1);

        // The same page can be retried
        let retry = list.load_next_page_if_needed(Some(&last)).await;
        assert!(retry.is_err());
        assert_eq!(catalog.request_count(), 3);
    }
}

#[cfg(test)]
mod context_tests {
    use super::*;

    #[tokio::test]
    async fn test_switching_context_resets_list() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let title = MangaQuery::TitleContains("dragon".to_string());
        catalog
            .script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)))
            .script(&title, 1, Reply::Items(manga_batch(50, 2)));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        let outcome = list.search_title("  dragon ", MatchMode::Contains).await.unwrap();

        assert_eq!(outcome, LoadOutcome::Replaced { page: 1, count: 2 });
        let snapshot = list.snapshot();
        assert_eq!(snapshot.query, title);
        assert_eq!(snapshot.items.len(), 2);
    }

    #[tokio::test]
    async fn test_switching_context_clears_last_page() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let seinen = MangaQuery::Genre("Seinen".to_string());
        catalog.script(&seinen, 1, Reply::Items(manga_batch(1, 5)));
        let list = best_list(&catalog);

        list.load_next_page_if_needed(None).await.unwrap();
        assert!(list.is_last_page());

        list.filter_genre("Seinen").await.unwrap();

        assert!(!list.is_last_page());
        assert_eq!(list.snapshot().items.len(), 5);
    }

    #[tokio::test]
    async fn test_title_search_modes() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let list = best_list(&catalog);

        list.search_title("Ber", MatchMode::BeginsWith).await.unwrap();
        assert_eq!(
            list.snapshot().query,
            MangaQuery::TitleBeginsWith("Ber".to_string())
        );

        list.search_title("   ", MatchMode::Contains).await.unwrap();
        assert_eq!(list.snapshot().query, MangaQuery::Best);
    }

    #[tokio::test]
    async fn test_apply_filters_uses_composed_search() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let list = best_list(&catalog);

        let mut filters = FilterSelection::default();
        filters.genre = Some("Action".to_string());
        filters.themes.insert("Samurai".to_string());
        list.apply_filters(&filters).await.unwrap();

        match list.snapshot().query {
            MangaQuery::Custom(payload) => {
                assert_eq!(payload.search_genres, Some(vec!["Action".to_string()]));
                assert_eq!(payload.search_themes, Some(vec!["Samurai".to_string()]));
            }
            other => panic!("expected custom search, got {:?}", other),
        }

        filters.reset();
        list.apply_filters(&filters).await.unwrap();
        assert_eq!(list.snapshot().query, MangaQuery::Best);
    }

    #[tokio::test]
    async fn test_author_filter() {
        let catalog = Arc::new(ScriptedCatalog::new());
        let by_author = MangaQuery::Author("a-inoue".to_string());
        catalog.script(&by_author, 1, Reply::Items(manga_batch(7, 1)));
        let list = best_list(&catalog);

        let outcome = list.filter_author("a-inoue").await.unwrap();

        assert_eq!(outcome, LoadOutcome::Replaced { page: 1, count: 1 });
        assert_eq!(catalog.requests(), vec![(format!("{:?}", by_author), 1)]);
    }

    #[tokio::test]
    async fn test_snapshots_are_published() {
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog.script(&MangaQuery::Best, 1, Reply::Items(manga_batch(1, 5)));
        let list = best_list(&catalog);
        let mut updates = list.subscribe();

        list.load_next_page_if_needed(None).await.unwrap();

        assert!(updates.has_changed().unwrap());
        let published = updates.borrow_and_update().clone();
        assert_eq!(published, list.snapshot());
        assert_eq!(published.items.len(), 5);
        assert!(!published.loading);

        list.set_query(MangaQuery::Genre("Drama".to_string()));
        assert!(updates.has_changed().unwrap());
        assert!(updates.borrow_and_update().items.is_empty());
    }
}

#[cfg(test)]
mod author_list_tests {
    use super::*;

    #[tokio::test]
    async fn test_author_listing_pages() {
        init_tracing();
        let catalog = Arc::new(ScriptedCatalog::new());
        catalog
            .script_authors(1, vec![author("a-1", "Kentaro", Some("Miura")), author("a-2", "ONE", None)])
            .script_authors(2, vec![author("a-3", "Naoki", Some("Urasawa"))]);
        let list = AuthorList::for_authors(catalog.clone(), PAGE_SIZE);

        list.load_next_page_if_needed(None).await.unwrap();
        let last = list.snapshot().items.last().cloned().unwrap();
        let outcome = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Appended { page: 2, count: 1 });

        let last = list.snapshot().items.last().cloned().unwrap();
        let end = list.load_next_page_if_needed(Some(&last)).await.unwrap();
        assert_eq!(end, LoadOutcome::ReachedEnd { page: 3 });

        let names: Vec<String> = list.snapshot().items.iter().map(|a| a.full_name()).collect();
        assert_eq!(names, vec!["Kentaro Miura", "ONE", "Naoki Urasawa"]);
    }
}
