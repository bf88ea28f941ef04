//! Concurrent expansion of crawl units into notice records.
//!
//! Fan-out is bounded at both levels — across groups and across links
//! within a group — via `buffered` streams, which also preserve order: the
//! position of every result always corresponds to the position of its
//! link. A failed link becomes an inline [`NoticeResult::Failed`] record
//! instead of voiding its group.

use futures::stream::{self, StreamExt as _};
use serde::Serialize;

use penalty_map_cache::KeyValueStore;
use penalty_map_models::{FetchFailure, GroupKey, NoticeResult};
use penalty_map_scraper::detail;

use crate::RunContext;
use crate::group::Group;

/// One crawled unit: its identity and one result per detail link, in link
/// order.
#[derive(Debug, Clone, Serialize)]
pub struct CrawledGroup {
    /// Identity of the unit.
    pub key: GroupKey,
    /// Per-link outcomes, index-aligned with the group's links.
    pub notices: Vec<NoticeResult>,
}

/// Expands every group into notice records.
///
/// Concurrent across groups (up to `ctx.concurrent_groups`) and across
/// links within each group (up to `ctx.concurrent_fetches`); result order
/// matches input order at both levels.
pub async fn crawl_groups(
    ctx: &RunContext,
    client: &reqwest::Client,
    cache: &dyn KeyValueStore,
    groups: Vec<Group>,
) -> Vec<CrawledGroup> {
    stream::iter(groups.into_iter().map(|group| async move {
        let notices = crawl_group(ctx, client, cache, &group.links).await;
        CrawledGroup {
            key: group.key,
            notices,
        }
    }))
    .buffered(ctx.concurrent_groups.max(1))
    .collect()
    .await
}

/// Fetches every link of one group, downgrading per-link failures to
/// inline placeholder records.
async fn crawl_group(
    ctx: &RunContext,
    client: &reqwest::Client,
    cache: &dyn KeyValueStore,
    links: &[String],
) -> Vec<NoticeResult> {
    stream::iter(links.iter().map(|link| async move {
        match detail::fetch_notice(client, cache, link).await {
            Ok(record) => NoticeResult::Notice(record),
            Err(e) => {
                log::warn!("Failed to expand notice link {link}: {e}");
                NoticeResult::Failed(FetchFailure {
                    link: link.clone(),
                    error: e.to_string(),
                })
            }
        }
    }))
    .buffered(ctx.concurrent_fetches.max(1))
    .collect()
    .await
}

#[cfg(test)]
mod tests {
    use penalty_map_cache::MemoryStore;
    use penalty_map_models::ListEntry;

    use super::*;
    use crate::group::group_entries;

    fn test_ctx() -> RunContext {
        RunContext {
            output_path: "out.json".into(),
            api_key: "test".into(),
            state_dir: ".".into(),
            limit: None,
            flush_crawl_cache: false,
            concurrent_groups: 2,
            concurrent_fetches: 2,
        }
    }

    fn detail_page(number: &str) -> String {
        format!(
            r#"<table class="table-data-pd">
                <tr><td>Penalty notice number</td><td>{number}</td></tr>
                <tr><td colspan="2">Party served</td></tr>
                <tr><td>Address</td><td>10 SMITH ST, SYDNEY NSW 2000</td></tr>
            </table>"#
        )
    }

    #[tokio::test]
    async fn preserves_link_order_within_and_across_groups() {
        let cache = MemoryStore::new();
        for (link, number) in [
            ("https://example.com/1", "111"),
            ("https://example.com/2", "222"),
            ("https://example.com/3", "333"),
        ] {
            cache.put(link, &detail_page(number)).await.unwrap();
        }

        let entries = vec![
            ListEntry {
                name: "Foo".into(),
                locality: "Bar".into(),
                link: "https://example.com/1".into(),
            },
            ListEntry {
                name: "Foo".into(),
                locality: "Bar".into(),
                link: "https://example.com/2".into(),
            },
            ListEntry {
                name: "Baz".into(),
                locality: "Qux".into(),
                link: "https://example.com/3".into(),
            },
        ];
        let groups = group_entries(&entries);

        let ctx = test_ctx();
        let client = reqwest::Client::new();
        let crawled = crawl_groups(&ctx, &client, &cache, groups).await;

        assert_eq!(crawled.len(), 2);
        assert_eq!(crawled[0].key.id(), "Foo::Bar");
        let numbers: Vec<_> = crawled[0]
            .notices
            .iter()
            .map(|n| n.record().unwrap().notice_number.clone())
            .collect();
        assert_eq!(numbers, vec!["111", "222"]);
        assert_eq!(
            crawled[1].notices[0].record().unwrap().notice_number,
            "333"
        );
    }

    #[tokio::test]
    async fn failed_link_becomes_placeholder_at_its_position() {
        let cache = MemoryStore::new();
        cache
            .put("https://example.com/1", &detail_page("111"))
            .await
            .unwrap();
        cache
            .put("https://example.com/3", &detail_page("333"))
            .await
            .unwrap();

        // The middle link is uncached and not a fetchable URL, so its fetch
        // fails without touching the network.
        let entries = vec![
            ListEntry {
                name: "Foo".into(),
                locality: "Bar".into(),
                link: "https://example.com/1".into(),
            },
            ListEntry {
                name: "Foo".into(),
                locality: "Bar".into(),
                link: "not a url".into(),
            },
            ListEntry {
                name: "Foo".into(),
                locality: "Bar".into(),
                link: "https://example.com/3".into(),
            },
        ];
        let groups = group_entries(&entries);

        let ctx = test_ctx();
        let client = reqwest::Client::new();
        let crawled = crawl_groups(&ctx, &client, &cache, groups).await;

        assert_eq!(crawled.len(), 1);
        let notices = &crawled[0].notices;
        assert_eq!(notices.len(), 3);
        assert!(notices[0].record().is_some());
        assert!(matches!(
            &notices[1],
            NoticeResult::Failed(f) if f.link == "not a url"
        ));
        assert_eq!(notices[2].record().unwrap().notice_number, "333");
    }

    #[tokio::test]
    async fn linkless_group_crawls_to_an_empty_sequence() {
        let cache = MemoryStore::new();
        let entries = vec![ListEntry {
            name: "Foo".into(),
            locality: "Bar".into(),
            link: String::new(),
        }];
        let groups = group_entries(&entries);

        let ctx = test_ctx();
        let client = reqwest::Client::new();
        let crawled = crawl_groups(&ctx, &client, &cache, groups).await;

        assert_eq!(crawled.len(), 1);
        assert!(crawled[0].notices.is_empty());
    }
}
