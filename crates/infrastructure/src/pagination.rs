use clearance_application::Page;

const DEFAULT_PAGE_LIMIT: usize = 50;
const MAX_PAGE_LIMIT: usize = 500;

/// Builds one id-ordered page from an already-filtered item set.
///
/// The cursor is the sort key of the last item of the previous page; items
/// up to and including it are skipped.
pub(crate) fn page_after<T>(
    mut items: Vec<T>,
    cursor: Option<&str>,
    limit: usize,
    sort_key: impl Fn(&T) -> String,
) -> Page<T> {
    items.sort_by_key(|item| sort_key(item));

    let start = cursor.map_or(0, |cursor| {
        items.partition_point(|item| sort_key(item).as_str() <= cursor)
    });
    let limit = if limit == 0 {
        DEFAULT_PAGE_LIMIT
    } else {
        limit.min(MAX_PAGE_LIMIT)
    };
    let end = start.saturating_add(limit).min(items.len());
    let has_more = end < items.len();

    let page: Vec<T> = items.drain(start..end).collect();
    let next_cursor = if has_more {
        page.last().map(&sort_key)
    } else {
        None
    };

    Page {
        items: page,
        has_more,
        next_cursor,
    }
}
